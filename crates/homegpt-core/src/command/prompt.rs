//! Prompt text for planning and self-validation

use crate::types::Device;

/// Instruction for the yes/no judge
pub const VALIDATION_INSTRUCTION: &str = "Respond only with Yes or No if the response makes sense \
based on the original system prompt, user input and the assistant's response.\n\
Do not hallucinate.\n\
Response example: Yes";

/// Closing question for the yes/no judge
pub const VALIDATION_QUESTION: &str = "Does the response make sense? Answer with yes or no.";

fn device_list(devices: &[Device]) -> String {
    devices
        .iter()
        .map(|d| d.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Default system prompt for tool-calling commands
pub fn system_prompt(devices: &[Device], tool_count: usize) -> String {
    format!(
        "You are a helpful smart home assistant with access to {} tools for:\n\
         - Controlling smart home devices: {}\n\
         - Searching the web and fetching page content, when such tools are available\n\
         - Getting system status information\n\n\
         Use the tools as needed to help the user.\n\
         When controlling devices, be specific about the action (On/Off/Set) and include \
         values for Set actions.\n\
         For web searches, be concise but thorough in your queries.",
        tool_count,
        device_list(devices)
    )
}

/// Body of the validation request
pub fn validation_content(command: &str, system_prompt: &str, response: &str) -> String {
    format!(
        "User Request:\n{}\n\nSystem Prompt:\n{}\n\nResponse:\n{}",
        command, system_prompt, response
    )
}

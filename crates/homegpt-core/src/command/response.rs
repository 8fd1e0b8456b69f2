//! Command request and response values

use serde::{Deserialize, Serialize};

use crate::trace::TraceEvent;
use crate::types::{CancellationToken, Device, DeviceAction};

/// One natural-language command from the user
#[derive(Debug, Clone)]
pub struct CommandRequest {
    /// The user's text
    pub command: String,
    /// Devices the command may address
    pub devices: Vec<Device>,
    /// Overrides the default system prompt
    pub system_prompt: Option<String>,
    /// Cancels the whole command, across attempts
    pub cancel: CancellationToken,
}

impl CommandRequest {
    /// Create a request
    pub fn new(command: impl Into<String>, devices: Vec<Device>) -> Self {
        Self {
            command: command.into(),
            devices,
            system_prompt: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Use a specific system prompt
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Bind to a cancellation token
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Result of a command, always produced
///
/// `error` being set does not imply `actions` is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    /// Final natural-language reply
    pub chat_response: String,
    /// Side effects for the device collaborator, in request order
    pub actions: Vec<DeviceAction>,
    /// Human-readable failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Trace events of every attempt, concatenated
    pub trace: Vec<TraceEvent>,
    /// Attempts made
    pub attempts: usize,
    /// Approved by self-validation
    pub validated: bool,
}

impl CommandResponse {
    /// Check for a failure
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

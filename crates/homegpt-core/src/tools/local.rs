//! In-process tool provider for device control
//!
//! Exposes a small fixed tool set. Calls never fail on transport grounds;
//! argument problems come back as descriptive strings.

use serde_json::json;

use crate::command::ExecutionContext;
use crate::types::{arg_number, arg_text, DeviceAction, Tool, ToolArguments};

/// Name of the device control tool
pub const EXECUTE_DEVICE_ACTION: &str = "ExecuteDeviceAction";

/// Name of the status tool
pub const GET_MCP_STATUS: &str = "GetMcpStatus";

/// Device action kinds understood by the local provider
#[derive(Debug, Clone, PartialEq)]
enum ActionKind {
    On,
    Off,
    Set(f32),
    Speak(String),
}

impl ActionKind {
    fn parse(action: &str, value: Option<f32>, text: Option<&str>) -> Option<Self> {
        match action.to_lowercase().as_str() {
            "on" => Some(ActionKind::On),
            "off" => Some(ActionKind::Off),
            "set" | "setvalue" => value.map(ActionKind::Set),
            "speak" => text.map(|t| ActionKind::Speak(t.to_string())),
            _ => None,
        }
    }

    fn confirmation(&self, device: &str) -> String {
        match self {
            ActionKind::On => format!("{} turned on successfully", device),
            ActionKind::Off => format!("{} turned off successfully", device),
            ActionKind::Set(value) => format!("{} set to {}", device, value),
            ActionKind::Speak(text) => format!("{} speaking: {}", device, text),
        }
    }
}

/// The in-process provider
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalToolProvider;

impl LocalToolProvider {
    /// Create the local provider
    pub fn new() -> Self {
        Self
    }

    /// Tools offered for the devices of this execution
    pub fn list_tools(&self, ctx: &ExecutionContext) -> Vec<Tool> {
        vec![
            Tool::new(
                EXECUTE_DEVICE_ACTION,
                format!(
                    "Controls smart home devices. Available devices: {}. Actions: 'On', 'Off', \
                     'Set' with value for temperature, 'Speak' with text.",
                    ctx.device_names()
                ),
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "deviceName": {
                        "type": "string",
                        "description": "Name of the device to control (e.g., 'TV', 'A/C', 'Kitchen lights')"
                    },
                    "action": {
                        "type": "string",
                        "description": "Action to perform: 'On', 'Off', 'Set' or 'Speak'"
                    },
                    "value": {
                        "type": "number",
                        "description": "Numeric value for 'Set' actions (e.g., temperature: 23)"
                    },
                    "text": {
                        "type": "string",
                        "description": "Text message for 'Speak' actions"
                    }
                },
                "required": ["deviceName", "action"]
            })),
            Tool::new(
                GET_MCP_STATUS,
                "Gets the status of MCP tools and available devices",
            )
            .with_schema(json!({ "type": "object", "properties": {} })),
        ]
    }

    /// Call a local tool
    pub fn invoke(&self, ctx: &ExecutionContext, name: &str, arguments: &ToolArguments) -> String {
        match name {
            EXECUTE_DEVICE_ACTION => self.execute_device_action(ctx, arguments),
            GET_MCP_STATUS => self.status(ctx),
            _ => format!("Unknown local tool: {}", name),
        }
    }

    fn execute_device_action(&self, ctx: &ExecutionContext, arguments: &ToolArguments) -> String {
        let Some(device) = arg_text(arguments, "deviceName") else {
            return "Device name is required".to_string();
        };
        let Some(action) = arg_text(arguments, "action") else {
            return "Action is required".to_string();
        };
        let value = arg_number(arguments, "value").map(|v| v as f32);
        let text = arg_text(arguments, "text");

        let Some(kind) = ActionKind::parse(&action, value, text.as_deref()) else {
            return format!("Unknown action {} for {}", action, device);
        };

        let confirmation = kind.confirmation(&device);
        ctx.queue_action(DeviceAction {
            device,
            action,
            value,
            text,
        });
        confirmation
    }

    fn status(&self, ctx: &ExecutionContext) -> String {
        let status = json!({
            "AvailableDevices": ctx.devices().iter().map(|d| json!({ "Name": d.name })).collect::<Vec<_>>(),
            "ExecutedActions": ctx.action_count(),
            "LocalTools": self
                .list_tools(ctx)
                .into_iter()
                .map(|t| json!({ "Name": t.name, "Description": t.description }))
                .collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&status)
            .unwrap_or_else(|e| format!("Error getting MCP status: {}", e))
    }
}

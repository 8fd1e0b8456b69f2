//! Device and side-effect records

use serde::{Deserialize, Serialize};

/// A controllable device known to the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    #[serde(alias = "name")]
    pub name: String,
    #[serde(default, alias = "isOn", alias = "is_on")]
    pub is_on: bool,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "value")]
    pub value: Option<f32>,
}

impl Device {
    /// Create a device that is switched off
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_on: false,
            value: None,
        }
    }
}

/// A requested real-world action, queued for the device collaborator
///
/// The core never applies these itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeviceAction {
    #[serde(default, alias = "device")]
    pub device: String,
    #[serde(alias = "action")]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "value")]
    pub value: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "text")]
    pub text: Option<String>,
}

impl DeviceAction {
    /// Create an action without value or text
    pub fn new(device: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            action: action.into(),
            value: None,
            text: None,
        }
    }

    /// Set the numeric value
    pub fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    /// Set the text payload
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serialization_uses_pascal_case() {
        let action = DeviceAction::new("A/C", "Set").with_value(18.0);
        let json = serde_json::to_string(&action).unwrap();
        assert!(json.contains("\"Device\":\"A/C\""));
        assert!(json.contains("\"Value\":18.0"));
        assert!(!json.contains("Text"));
    }

    #[test]
    fn test_action_accepts_lowercase_keys() {
        let action: DeviceAction =
            serde_json::from_str(r#"{"device": "TV", "action": "On"}"#).unwrap();
        assert_eq!(action, DeviceAction::new("TV", "On"));
    }

    #[test]
    fn test_speak_without_device() {
        let action: DeviceAction =
            serde_json::from_str(r#"{"Action": "Speak", "Text": "Dinner is ready"}"#).unwrap();
        assert_eq!(action.device, "");
        assert_eq!(action.text.as_deref(), Some("Dinner is ready"));
    }
}

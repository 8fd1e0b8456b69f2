//! Core types shared across the orchestration layers
//!
//! This module contains the planner conversation, tool and device types.

mod message;
mod tool;
mod device;
mod cancellation;

pub use message::{ChatMessage, ContentPart, MessageRole, MessageContent};
pub use tool::{Tool, ToolArguments, ToolCall, ToolDescriptor, ToolSource, arg_number, arg_text};
pub use device::{Device, DeviceAction};
pub use cancellation::CancellationToken;

//! Trace event types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed vocabulary of trace event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraceKind {
    SystemPrompt,
    UserPrompt,
    ModelResponse,
    ToolCall,
    ToolAvailable,
    ToolResponse,
    ActionQueued,
    Error,
    Info,
}

impl std::fmt::Display for TraceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TraceKind::SystemPrompt => "SystemPrompt",
            TraceKind::UserPrompt => "UserPrompt",
            TraceKind::ModelResponse => "ModelResponse",
            TraceKind::ToolCall => "ToolCall",
            TraceKind::ToolAvailable => "ToolAvailable",
            TraceKind::ToolResponse => "ToolResponse",
            TraceKind::ActionQueued => "ActionQueued",
            TraceKind::Error => "Error",
            TraceKind::Info => "Info",
        };
        write!(f, "{}", name)
    }
}

/// One notable step of a command execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// When the step completed
    pub timestamp: DateTime<Utc>,
    /// Event kind
    pub kind: TraceKind,
    /// Short human-readable summary
    pub summary: String,
    /// Optional longer payload, often a serialized request or response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl TraceEvent {
    /// Create an event stamped with the current time
    pub fn new(kind: TraceKind, summary: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            summary: summary.into(),
            details: None,
        }
    }

    /// Attach details
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Check the event kind
    pub fn is(&self, kind: TraceKind) -> bool {
        self.kind == kind
    }
}

//! Per-command trace log
//!
//! Every notable step of one command execution (prompts, planner turns,
//! tool availability, tool calls and responses, queued actions, errors)
//! is appended here. The log is exclusively owned by one execution and is
//! returned to the caller inside the command response.

mod event;
mod log;

pub use event::{TraceEvent, TraceKind};
pub use log::{TraceLog, count_kind};

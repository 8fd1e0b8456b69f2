//! Per-command execution state

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};

use crate::trace::{TraceEvent, TraceKind, TraceLog};
use crate::types::{CancellationToken, Device, DeviceAction, ToolSource};

/// State owned by exactly one command attempt
///
/// Holds the trace log, the queued side effects, and the tool routing
/// table produced by enumeration. A fresh context is created for every
/// attempt; nothing here is shared between overlapping commands.
#[derive(Debug)]
pub struct ExecutionContext {
    devices: Vec<Device>,
    trace: TraceLog,
    actions: Mutex<Vec<DeviceAction>>,
    routes: RwLock<HashMap<String, ToolSource>>,
    cancel: CancellationToken,
}

impl ExecutionContext {
    /// Create a context for the given devices
    pub fn new(devices: Vec<Device>) -> Self {
        Self::with_cancel(devices, CancellationToken::new())
    }

    /// Create a context bound to a cancellation token
    pub fn with_cancel(devices: Vec<Device>, cancel: CancellationToken) -> Self {
        Self {
            devices,
            trace: TraceLog::new(),
            actions: Mutex::new(Vec::new()),
            routes: RwLock::new(HashMap::new()),
            cancel,
        }
    }

    /// Devices the command may address
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    /// Comma separated device names
    pub fn device_names(&self) -> String {
        self.devices
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Trace log of this attempt
    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// Cancellation token of the command
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Check if the command was cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Queue a side effect and record it in the trace
    pub fn queue_action(&self, action: DeviceAction) {
        let details = serde_json::to_string(&action).unwrap_or_default();
        self.trace.push(
            TraceEvent::new(
                TraceKind::ActionQueued,
                format!("{} -> {}", action.action, action.device),
            )
            .with_details(details),
        );
        self.actions.lock().push(action);
    }

    /// Number of queued side effects
    pub fn action_count(&self) -> usize {
        self.actions.lock().len()
    }

    /// Copy of the queued side effects
    pub fn actions(&self) -> Vec<DeviceAction> {
        self.actions.lock().clone()
    }

    /// Replace the routing table
    pub fn set_routes(&self, routes: HashMap<String, ToolSource>) {
        *self.routes.write() = routes;
    }

    /// Look up the owner of a tool
    pub fn route(&self, tool_name: &str) -> Option<ToolSource> {
        self.routes.read().get(tool_name).cloned()
    }

    /// Consume the context into its trace and side effects
    pub fn into_parts(self) -> (Vec<TraceEvent>, Vec<DeviceAction>) {
        (self.trace.drain(), self.actions.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_action_records_trace() {
        let ctx = ExecutionContext::new(vec![Device::new("TV"), Device::new("A/C")]);
        ctx.queue_action(DeviceAction::new("TV", "On"));

        assert_eq!(ctx.device_names(), "TV, A/C");
        assert_eq!(ctx.action_count(), 1);
        assert_eq!(ctx.trace().count(TraceKind::ActionQueued), 1);
        assert_eq!(ctx.trace().snapshot()[0].summary, "On -> TV");

        let (trace, actions) = ctx.into_parts();
        assert_eq!(trace.len(), 1);
        assert_eq!(actions, vec![DeviceAction::new("TV", "On")]);
    }

    #[test]
    fn test_routes() {
        let ctx = ExecutionContext::new(vec![]);
        assert!(ctx.route("search").is_none());

        let mut routes = HashMap::new();
        routes.insert("search".to_string(), ToolSource::remote("duckduckgo"));
        ctx.set_routes(routes);

        assert_eq!(ctx.route("search"), Some(ToolSource::remote("duckduckgo")));
    }
}

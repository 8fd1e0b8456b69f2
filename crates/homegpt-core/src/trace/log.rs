//! Append-only trace log

use parking_lot::Mutex;

use super::event::{TraceEvent, TraceKind};

/// Ordered record of the trace events of one command execution
///
/// Events are appended in the order their causing operations complete.
/// A log belongs to exactly one execution context.
#[derive(Debug, Default)]
pub struct TraceLog {
    events: Mutex<Vec<TraceEvent>>,
}

impl TraceLog {
    /// Create an empty trace log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }

    /// Append an event without details
    pub fn record(&self, kind: TraceKind, summary: impl Into<String>) {
        self.push(TraceEvent::new(kind, summary));
    }

    /// Append an event with details
    pub fn record_with(&self, kind: TraceKind, summary: impl Into<String>, details: impl Into<String>) {
        self.push(TraceEvent::new(kind, summary).with_details(details));
    }

    /// Append an `Info` event
    pub fn info(&self, summary: impl Into<String>) {
        self.record(TraceKind::Info, summary);
    }

    /// Append an `Error` event with details
    pub fn error(&self, summary: impl Into<String>, details: impl Into<String>) {
        self.record_with(TraceKind::Error, summary, details);
    }

    /// Copy of all events, oldest first
    pub fn snapshot(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    /// Take all events, leaving the log empty
    pub fn drain(&self) -> Vec<TraceEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Number of events of one kind
    pub fn count(&self, kind: TraceKind) -> usize {
        count_kind(&self.events.lock(), kind)
    }
}

/// Count events of one kind in a trace sequence
pub fn count_kind(events: &[TraceEvent], kind: TraceKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_order_is_preserved() {
        let log = TraceLog::new();
        log.record(TraceKind::SystemPrompt, "System prompt sent");
        log.record_with(TraceKind::UserPrompt, "User command", "Turn on the TV");
        log.error("Failed to load tools from duckduckgo", "connection refused");

        let events = log.snapshot();
        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![TraceKind::SystemPrompt, TraceKind::UserPrompt, TraceKind::Error]
        );
        assert_eq!(events[1].details.as_deref(), Some("Turn on the TV"));
        assert!(events[0].timestamp <= events[2].timestamp);
    }

    #[test]
    fn test_drain_empties_log() {
        let log = TraceLog::new();
        log.info("Attempt 1/3");
        log.info("Attempt 2/3");

        assert_eq!(log.count(TraceKind::Info), 2);
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
        assert_eq!(count_kind(&drained, TraceKind::Info), 2);
    }
}

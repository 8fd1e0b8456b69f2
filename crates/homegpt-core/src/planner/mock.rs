//! Mock planner for testing
//!
//! Deterministic, scripted turns without network dependencies.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

use super::error::{PlannerError, PlannerResult};
use super::traits::{Planner, PlannerRequest, PlannerTurn};
use crate::types::{CancellationToken, ToolCall};

/// One scripted step
#[derive(Debug, Clone)]
pub enum MockStep {
    /// Return this turn
    Turn(PlannerTurn),
    /// Fail the round-trip with this message
    Fail(String),
}

impl MockStep {
    /// A final answer
    pub fn answer(text: impl Into<String>) -> Self {
        MockStep::Turn(PlannerTurn::answer(text))
    }

    /// A single tool call
    pub fn call(name: impl Into<String>, input: serde_json::Value) -> Self {
        let name = name.into();
        MockStep::Turn(PlannerTurn::ToolCalls(vec![ToolCall::new(
            format!("call_{}", name),
            name,
            input,
        )]))
    }

    /// Several tool calls in one turn
    pub fn calls(calls: Vec<ToolCall>) -> Self {
        MockStep::Turn(PlannerTurn::ToolCalls(calls))
    }

    /// A failed round-trip
    pub fn fail(message: impl Into<String>) -> Self {
        MockStep::Fail(message.into())
    }
}

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Answer with the last user message
    #[default]
    Echo,
    /// Always answer with the same text
    Fixed(String),
    /// Always fail
    Error(String),
    /// Play scripted steps in order
    Scripted,
}

/// Mock planner for testing
pub struct MockPlanner {
    mode: MockMode,
    script: Mutex<VecDeque<MockStep>>,
    requests: Mutex<Vec<PlannerRequest>>,
    delay: Option<Duration>,
}

impl Default for MockPlanner {
    fn default() -> Self {
        Self::echo()
    }
}

impl MockPlanner {
    fn with_mode(mode: MockMode, script: Vec<MockStep>) -> Self {
        Self {
            mode,
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// Answer with the last user message
    pub fn echo() -> Self {
        Self::with_mode(MockMode::Echo, Vec::new())
    }

    /// Always answer with `text`
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::with_mode(MockMode::Fixed(text.into()), Vec::new())
    }

    /// Always fail with `message`
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_mode(MockMode::Error(message.into()), Vec::new())
    }

    /// Play `steps` in order; fails once the script is exhausted
    pub fn scripted(steps: Vec<MockStep>) -> Self {
        Self::with_mode(MockMode::Scripted, steps)
    }

    /// Wait before every turn
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay = Some(Duration::from_millis(delay_ms));
        self
    }

    /// Number of round-trips so far
    pub fn calls(&self) -> usize {
        self.requests.lock().len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<PlannerRequest> {
        self.requests.lock().clone()
    }

    fn next_turn(&self, request: &PlannerRequest) -> PlannerResult<PlannerTurn> {
        match &self.mode {
            MockMode::Echo => Ok(PlannerTurn::Answer(
                request
                    .last_user_text()
                    .unwrap_or_else(|| "Hello from MockPlanner!".to_string()),
            )),
            MockMode::Fixed(text) => Ok(PlannerTurn::Answer(text.clone())),
            MockMode::Error(message) => Err(PlannerError::api_error("mock", 500, message.clone())),
            MockMode::Scripted => match self.script.lock().pop_front() {
                Some(MockStep::Turn(turn)) => Ok(turn),
                Some(MockStep::Fail(message)) => Err(PlannerError::api_error("mock", 500, message)),
                None => Err(PlannerError::Other("mock script exhausted".to_string())),
            },
        }
    }
}

#[async_trait]
impl Planner for MockPlanner {
    fn name(&self) -> &str {
        "mock"
    }

    async fn plan(
        &self,
        request: PlannerRequest,
        cancel_token: CancellationToken,
    ) -> PlannerResult<PlannerTurn> {
        if cancel_token.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = cancel_token.cancelled() => return Err(PlannerError::Cancelled),
            }
        }

        let turn = self.next_turn(&request);
        self.requests.lock().push(request);
        turn
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use serde_json::json;

    fn request(text: &str) -> PlannerRequest {
        PlannerRequest::new(vec![ChatMessage::system("sys"), ChatMessage::user(text)])
    }

    #[tokio::test]
    async fn test_echo_and_fixed() {
        let echo = MockPlanner::echo();
        let turn = echo.plan(request("Turn on the TV"), CancellationToken::new()).await.unwrap();
        assert_eq!(turn, PlannerTurn::answer("Turn on the TV"));

        let fixed = MockPlanner::fixed("Done");
        let turn = fixed.plan(request("anything"), CancellationToken::new()).await.unwrap();
        assert_eq!(turn, PlannerTurn::answer("Done"));
        assert_eq!(fixed.calls(), 1);
    }

    #[tokio::test]
    async fn test_script_plays_in_order() {
        let planner = MockPlanner::scripted(vec![
            MockStep::fail("boom"),
            MockStep::call("GetMcpStatus", json!({})),
            MockStep::answer("ok"),
        ]);
        let cancel = CancellationToken::new();

        assert!(planner.plan(request("x"), cancel.clone()).await.is_err());
        assert!(matches!(
            planner.plan(request("x"), cancel.clone()).await.unwrap(),
            PlannerTurn::ToolCalls(calls) if calls[0].name == "GetMcpStatus"
        ));
        assert_eq!(planner.plan(request("x"), cancel.clone()).await.unwrap(), PlannerTurn::answer("ok"));
        assert!(planner.plan(request("x"), cancel).await.is_err());
        assert_eq!(planner.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_cancelled_during_delay() {
        let planner = MockPlanner::fixed("late").with_delay(5_000);
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });

        let result = planner.plan(request("x"), cancel).await;
        assert!(matches!(result, Err(PlannerError::Cancelled)));
        assert_eq!(planner.calls(), 0);
    }
}

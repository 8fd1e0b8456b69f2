//! Bounded-retry command execution
//!
//! Each attempt runs with a fresh [`ExecutionContext`]:
//!
//! ```text
//! enumerate ─► plan ─┬─► answer ─► validate? ─► done
//!                    └─► tool calls ─► dispatch ─► plan ...
//! ```
//!
//! A failed or rejected attempt is retried until the attempt budget runs
//! out. The caller always gets a [`CommandResponse`].

use std::sync::Arc;

use thiserror::Error;

use super::context::ExecutionContext;
use super::prompt::system_prompt;
use super::response::{CommandRequest, CommandResponse};
use super::validation::{PlannerJudge, ValidationInput, Validator, Verdict};
use crate::config::{AssistantConfig, ResilienceSettings};
use crate::logging::Logger;
use crate::mcp::connect_servers;
use crate::planner::{
    GenaiPlanner, PlanOptions, Planner, PlannerError, PlannerRequest, PlannerResult, PlannerTurn,
};
use crate::tools::ToolRegistry;
use crate::trace::{TraceEvent, TraceKind};
use crate::types::{ChatMessage, DeviceAction};

/// Error text of a cancelled command
pub const CANCELLED_MESSAGE: &str = "Command cancelled";

/// Why an attempt did not produce an answer
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Planner round-trip failed
    #[error("Planner error: {0}")]
    Planner(#[from] PlannerError),

    /// Planner kept requesting tools
    #[error("Tool loop exceeded {0} rounds without an answer")]
    ToolRoundLimit(usize),

    /// Command was cancelled
    #[error("Command cancelled")]
    Cancelled,
}

impl ExecutionError {
    /// Check for cancellation, however it surfaced
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ExecutionError::Cancelled | ExecutionError::Planner(PlannerError::Cancelled)
        )
    }

    /// Short explanation suitable for the chat response
    pub fn user_message(&self) -> String {
        match self {
            ExecutionError::Planner(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Answer of one successful attempt
#[derive(Debug)]
struct Answer {
    text: String,
    system_prompt: String,
}

/// Best response seen so far
#[derive(Debug)]
struct Candidate {
    text: String,
    actions: Vec<DeviceAction>,
}

enum AttemptOutcome {
    /// Answer accepted, command done
    Accepted { text: String, validated: bool },
    /// Answer produced but not approved
    Unapproved { text: String, reason: String },
    /// No answer
    Failed(ExecutionError),
}

/// Runs commands through the registry and planner with retries
pub struct CommandExecutor {
    registry: Arc<ToolRegistry>,
    planner: Arc<dyn Planner>,
    validator: Option<Arc<dyn Validator>>,
    settings: ResilienceSettings,
    options: PlanOptions,
    logger: Arc<dyn Logger>,
}

impl CommandExecutor {
    /// Create an executor with default resilience settings and no validation
    pub fn new(registry: Arc<ToolRegistry>, planner: Arc<dyn Planner>, logger: Arc<dyn Logger>) -> Self {
        Self {
            registry,
            planner,
            validator: None,
            settings: ResilienceSettings::default(),
            options: PlanOptions::default(),
            logger,
        }
    }

    /// Build the full stack from configuration
    ///
    /// Connects every enabled MCP server (failing ones are skipped) and
    /// creates a genai planner. With `self_validation` on, the same
    /// planner is used as the judge.
    pub async fn from_config(config: &AssistantConfig, logger: Arc<dyn Logger>) -> PlannerResult<Self> {
        let connections = connect_servers(&config.servers, Arc::clone(&logger)).await;

        let mut registry = ToolRegistry::new(connections, Arc::clone(&logger));
        if let Some(timeout) = config.resilience.tool_timeout() {
            registry = registry.with_call_timeout(timeout);
        }

        let planner: Arc<dyn Planner> =
            Arc::new(GenaiPlanner::from_settings(&config.planner, Arc::clone(&logger))?);

        let mut executor = Self::new(Arc::new(registry), Arc::clone(&planner), logger)
            .with_settings(config.resilience.clone());
        if config.resilience.self_validation {
            executor = executor.with_validator(Arc::new(PlannerJudge::new(planner)));
        }
        Ok(executor)
    }

    /// Set the resilience policy
    ///
    /// Zero attempts or rounds are treated as one.
    pub fn with_settings(mut self, settings: ResilienceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Enable self-validation with this judge
    pub fn with_validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Sampling options for planner turns
    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    /// The registry commands are dispatched through
    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    /// Execute a command
    ///
    /// Never fails: every outcome, including exhaustion and cancellation,
    /// is reported through the returned response.
    pub async fn execute(&self, request: &CommandRequest) -> CommandResponse {
        let max_attempts = self.settings.max_attempts.max(1);
        let mut trace: Vec<TraceEvent> = Vec::new();
        let mut best: Option<Candidate> = None;
        let mut last_error: Option<String> = None;

        for attempt in 1..=max_attempts {
            if request.cancel.is_cancelled() {
                return self.cancelled(trace, best.map(|c| c.actions).unwrap_or_default(), attempt - 1);
            }

            self.logger.info(&format!(
                "[CommandExecutor] Attempt {}/{}: {}",
                attempt, max_attempts, request.command
            ));

            let ctx = ExecutionContext::with_cancel(request.devices.clone(), request.cancel.clone());
            ctx.trace()
                .info(format!("Attempt {} of {}", attempt, max_attempts));

            let outcome = self.attempt(&ctx, request).await;
            let (events, actions) = ctx.into_parts();
            trace.extend(events);

            match outcome {
                AttemptOutcome::Accepted { text, validated } => {
                    self.logger.info(&format!(
                        "[CommandExecutor] Attempt {} succeeded with {} actions",
                        attempt,
                        actions.len()
                    ));
                    return CommandResponse {
                        chat_response: text,
                        actions,
                        error: None,
                        trace,
                        attempts: attempt,
                        validated,
                    };
                }
                AttemptOutcome::Unapproved { text, reason } => {
                    self.logger.warn(&format!(
                        "[CommandExecutor] Attempt {} not approved: {}",
                        attempt, reason
                    ));
                    last_error = Some(reason);
                    best = Some(Candidate { text, actions });
                }
                AttemptOutcome::Failed(e) if e.is_cancelled() => {
                    self.logger.info("[CommandExecutor] Command cancelled");
                    return self.cancelled(trace, actions, attempt);
                }
                AttemptOutcome::Failed(e) => {
                    self.logger
                        .warn(&format!("[CommandExecutor] Attempt {} failed: {}", attempt, e));
                    last_error = Some(e.user_message());
                }
            }
        }

        match best {
            Some(candidate) => CommandResponse {
                chat_response: candidate.text,
                actions: candidate.actions,
                error: None,
                trace,
                attempts: max_attempts,
                validated: false,
            },
            None => {
                let message = last_error.unwrap_or_else(|| "Command failed".to_string());
                self.logger.error(&format!(
                    "[CommandExecutor] All {} attempts failed: {}",
                    max_attempts, message
                ));
                CommandResponse {
                    chat_response: String::new(),
                    actions: Vec::new(),
                    error: Some(message),
                    trace,
                    attempts: max_attempts,
                    validated: false,
                }
            }
        }
    }

    fn cancelled(&self, trace: Vec<TraceEvent>, actions: Vec<DeviceAction>, attempts: usize) -> CommandResponse {
        CommandResponse {
            chat_response: String::new(),
            actions,
            error: Some(CANCELLED_MESSAGE.to_string()),
            trace,
            attempts,
            validated: false,
        }
    }

    async fn attempt(&self, ctx: &ExecutionContext, request: &CommandRequest) -> AttemptOutcome {
        let answer = match self.run_tool_loop(ctx, request).await {
            Ok(answer) => answer,
            Err(e) => {
                ctx.trace().error("Attempt failed", e.to_string());
                return AttemptOutcome::Failed(e);
            }
        };

        let Some(validator) = &self.validator else {
            return AttemptOutcome::Accepted {
                text: answer.text,
                validated: false,
            };
        };

        let input = ValidationInput {
            command: &request.command,
            system_prompt: &answer.system_prompt,
            response: &answer.text,
        };
        match validator.validate(input, ctx.cancel_token().clone()).await {
            Ok(Verdict::Approved) => {
                ctx.trace().info("Validation approved the response");
                AttemptOutcome::Accepted {
                    text: answer.text,
                    validated: true,
                }
            }
            Ok(Verdict::Rejected) => {
                ctx.trace().error("Validation rejected the response", answer.text.clone());
                AttemptOutcome::Unapproved {
                    text: answer.text,
                    reason: "Validation rejected the response".to_string(),
                }
            }
            Ok(Verdict::Unparseable(reply)) => {
                ctx.trace().error("Validation reply was not yes or no", reply);
                AttemptOutcome::Unapproved {
                    text: answer.text,
                    reason: "Validation reply was not yes or no".to_string(),
                }
            }
            Err(PlannerError::Cancelled) => AttemptOutcome::Failed(ExecutionError::Cancelled),
            Err(e) => {
                ctx.trace().error("Validation failed", e.to_string());
                AttemptOutcome::Unapproved {
                    text: answer.text,
                    reason: e.user_message(),
                }
            }
        }
    }

    async fn run_tool_loop(&self, ctx: &ExecutionContext, request: &CommandRequest) -> Result<Answer, ExecutionError> {
        let descriptors = self.registry.enumerate(ctx).await;
        let tools = ToolRegistry::llm_tools(&descriptors);

        let system = request
            .system_prompt
            .clone()
            .unwrap_or_else(|| system_prompt(ctx.devices(), tools.len()));
        ctx.trace()
            .record_with(TraceKind::SystemPrompt, "System prompt set for planner", system.clone());
        ctx.trace()
            .record_with(TraceKind::UserPrompt, "User command received", request.command.clone());

        let mut messages = vec![
            ChatMessage::system(system.clone()),
            ChatMessage::user(request.command.clone()),
        ];
        let max_rounds = self.settings.max_tool_rounds.max(1);

        for _ in 0..max_rounds {
            if ctx.is_cancelled() {
                return Err(ExecutionError::Cancelled);
            }

            let planner_request = PlannerRequest::new(messages.clone())
                .with_tools(tools.clone())
                .with_options(self.options.clone());
            let turn = self
                .planner
                .plan(planner_request, ctx.cancel_token().clone())
                .await?;

            let calls = match turn {
                PlannerTurn::Answer(text) => {
                    ctx.trace()
                        .record_with(TraceKind::ModelResponse, "Planner answered", text.clone());
                    return Ok(Answer {
                        text,
                        system_prompt: system,
                    });
                }
                PlannerTurn::ToolCalls(calls) => calls,
            };

            ctx.trace().record_with(
                TraceKind::ModelResponse,
                format!("Planner requested {} tool calls", calls.len()),
                calls
                    .iter()
                    .map(|c| c.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            messages.push(ChatMessage::tool_calls(&calls));

            for call in &calls {
                if ctx.is_cancelled() {
                    return Err(ExecutionError::Cancelled);
                }
                let result = self.registry.dispatch(ctx, &call.name, &call.arguments).await;
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        Err(ExecutionError::ToolRoundLimit(max_rounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::planner::{MockPlanner, MockStep};
    use crate::tools::{ConnectionSet, MockRemoteProvider, EXECUTE_DEVICE_ACTION};
    use crate::trace::count_kind;
    use crate::types::{CancellationToken, Device};
    use serde_json::json;

    fn devices() -> Vec<Device> {
        vec![
            Device::new("TV"),
            Device::new("A/C"),
            Device::new("Kitchen lights"),
        ]
    }

    fn registry(connections: ConnectionSet) -> Arc<ToolRegistry> {
        Arc::new(ToolRegistry::new(connections, Arc::new(NoOpLogger)))
    }

    fn executor(planner: Arc<MockPlanner>) -> CommandExecutor {
        CommandExecutor::new(registry(ConnectionSet::new()), planner, Arc::new(NoOpLogger))
    }

    fn judge(replies: Vec<&str>) -> Arc<PlannerJudge> {
        let steps = replies.into_iter().map(MockStep::answer).collect();
        Arc::new(PlannerJudge::new(Arc::new(MockPlanner::scripted(steps))))
    }

    #[tokio::test]
    async fn test_third_attempt_succeeds() {
        let planner = Arc::new(MockPlanner::scripted(vec![
            MockStep::fail("boom"),
            MockStep::fail("boom again"),
            MockStep::answer("All done"),
        ]));
        let executor = executor(planner.clone());

        let response = executor
            .execute(&CommandRequest::new("Turn on the TV", devices()))
            .await;

        assert_eq!(response.error, None);
        assert_eq!(response.chat_response, "All done");
        assert_eq!(response.attempts, 3);
        assert_eq!(planner.calls(), 3);
        assert_eq!(count_kind(&response.trace, TraceKind::SystemPrompt), 3);
        assert_eq!(count_kind(&response.trace, TraceKind::UserPrompt), 3);
        assert_eq!(count_kind(&response.trace, TraceKind::Error), 2);
    }

    #[tokio::test]
    async fn test_all_attempts_fail() {
        let planner = Arc::new(MockPlanner::error("model crashed"));
        let executor = executor(planner.clone());

        let response = executor
            .execute(&CommandRequest::new("Turn on the TV", devices()))
            .await;

        assert_eq!(response.error.as_deref(), Some("model crashed"));
        assert!(response.actions.is_empty());
        assert_eq!(response.attempts, 3);
        assert_eq!(planner.calls(), 3);
    }

    #[tokio::test]
    async fn test_kitchen_lights_end_to_end() {
        let planner = Arc::new(MockPlanner::scripted(vec![
            MockStep::call(
                EXECUTE_DEVICE_ACTION,
                json!({"deviceName": "kitchen lights", "action": "on"}),
            ),
            MockStep::answer("The kitchen lights are on."),
        ]));
        let executor = executor(planner.clone());

        let response = executor
            .execute(&CommandRequest::new("Turn on the kitchen lights", devices()))
            .await;

        assert_eq!(response.error, None);
        assert_eq!(response.attempts, 1);
        assert_eq!(response.actions.len(), 1);
        assert_eq!(response.actions[0].device, "kitchen lights");
        assert_eq!(response.actions[0].action, "on");
        assert!(count_kind(&response.trace, TraceKind::ToolAvailable) >= 2);
        assert_eq!(count_kind(&response.trace, TraceKind::ToolCall), 1);
        assert_eq!(count_kind(&response.trace, TraceKind::ToolResponse), 1);
        assert_eq!(count_kind(&response.trace, TraceKind::ActionQueued), 1);

        // The tool result is fed back to the planner
        let second = &planner.requests()[1];
        assert!(second
            .messages
            .last()
            .unwrap()
            .flatten_text()
            .contains("kitchen lights turned on successfully"));
        assert_eq!(second.tools.len(), 2);
    }

    #[tokio::test]
    async fn test_collision_is_traced_and_dispatch_uses_winner() {
        let first = Arc::new(MockRemoteProvider::new().with_tool("search", "first"));
        let second = Arc::new(
            MockRemoteProvider::new()
                .with_tool("search", "second")
                .respond("search", "sunny, 21C"),
        );
        let connections = ConnectionSet::new()
            .with("alpha", first.clone())
            .with("beta", second.clone());
        let planner = Arc::new(MockPlanner::scripted(vec![
            MockStep::call("search", json!({"query": "weather"})),
            MockStep::answer("It is sunny."),
        ]));
        let executor = CommandExecutor::new(registry(connections), planner.clone(), Arc::new(NoOpLogger));

        let response = executor
            .execute(&CommandRequest::new("What's the weather?", devices()))
            .await;

        assert_eq!(response.chat_response, "It is sunny.");
        assert!(response
            .trace
            .iter()
            .any(|e| e.is(TraceKind::Error) && e.summary.contains("collision")));
        assert!(first.calls().is_empty());
        assert_eq!(second.calls().len(), 1);
        assert_eq!(planner.requests()[0].tools.len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_responses_return_last_success() {
        let planner = Arc::new(MockPlanner::scripted(vec![
            MockStep::answer("first"),
            MockStep::answer("second"),
            MockStep::answer("third"),
        ]));
        let executor = executor(planner).with_validator(judge(vec!["No", "no.", "No"]));

        let response = executor
            .execute(&CommandRequest::new("Turn on the TV", devices()))
            .await;

        assert_eq!(response.chat_response, "third");
        assert_eq!(response.error, None);
        assert!(!response.validated);
        assert_eq!(response.attempts, 3);
    }

    #[tokio::test]
    async fn test_later_yes_is_preferred() {
        let planner = Arc::new(MockPlanner::scripted(vec![
            MockStep::answer("first"),
            MockStep::answer("second"),
        ]));
        let executor = executor(planner.clone()).with_validator(judge(vec!["Maybe", "Yes"]));

        let response = executor
            .execute(&CommandRequest::new("Turn on the TV", devices()))
            .await;

        assert_eq!(response.chat_response, "second");
        assert!(response.validated);
        assert_eq!(response.attempts, 2);
        assert_eq!(planner.calls(), 2);
    }

    #[tokio::test]
    async fn test_rejected_attempt_actions_do_not_leak() {
        let planner = Arc::new(MockPlanner::scripted(vec![
            MockStep::call(EXECUTE_DEVICE_ACTION, json!({"deviceName": "TV", "action": "On"})),
            MockStep::answer("TV is on"),
            MockStep::answer("Nothing to do"),
        ]));
        let executor = executor(planner).with_validator(judge(vec!["No", "Yes"]));

        let response = executor
            .execute(&CommandRequest::new("Turn on the TV", devices()))
            .await;

        assert_eq!(response.chat_response, "Nothing to do");
        assert!(response.actions.is_empty());
        assert_eq!(count_kind(&response.trace, TraceKind::ActionQueued), 1);
    }

    #[tokio::test]
    async fn test_tool_round_limit_is_retried() {
        let steps = (0..4)
            .map(|_| MockStep::call("GetMcpStatus", json!({})))
            .chain(std::iter::once(MockStep::answer("status ok")))
            .collect();
        let planner = Arc::new(MockPlanner::scripted(steps));
        let settings = ResilienceSettings {
            max_tool_rounds: 2,
            ..ResilienceSettings::default()
        };
        let executor = executor(planner.clone()).with_settings(settings);

        let response = executor
            .execute(&CommandRequest::new("status?", devices()))
            .await;

        assert_eq!(response.chat_response, "status ok");
        assert_eq!(response.attempts, 3);
        assert_eq!(planner.calls(), 5);
    }

    #[tokio::test]
    async fn test_cancellation_stops_without_retry() {
        let planner = Arc::new(MockPlanner::fixed("too late").with_delay(5_000));
        let executor = executor(planner.clone());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();

        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let response = executor
            .execute(&CommandRequest::new("Turn on the TV", devices()).with_cancel(cancel))
            .await;

        assert_eq!(response.error.as_deref(), Some(CANCELLED_MESSAGE));
        assert_eq!(response.attempts, 1);
        assert_eq!(planner.calls(), 0);
    }

    #[tokio::test]
    async fn test_explicit_system_prompt_is_used() {
        let planner = Arc::new(MockPlanner::fixed("ok"));
        let executor = executor(planner.clone());

        executor
            .execute(&CommandRequest::new("hi", devices()).with_system_prompt("Be brief."))
            .await;

        let request = &planner.requests()[0];
        assert_eq!(request.messages[0].text(), Some("Be brief."));
    }
}

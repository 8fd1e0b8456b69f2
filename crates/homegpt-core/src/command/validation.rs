//! Self-validation of command responses

use async_trait::async_trait;
use std::sync::Arc;

use super::prompt::{validation_content, VALIDATION_INSTRUCTION, VALIDATION_QUESTION};
use crate::planner::{PlanOptions, Planner, PlannerRequest, PlannerResult, PlannerTurn};
use crate::types::{CancellationToken, ChatMessage};

/// Outcome of a yes/no judgment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The response makes sense
    Approved,
    /// The response does not make sense
    Rejected,
    /// The judge said something other than yes or no
    Unparseable(String),
}

impl Verdict {
    /// Check for approval
    pub fn is_approved(&self) -> bool {
        matches!(self, Verdict::Approved)
    }
}

/// Read a verdict from the judge's reply
///
/// Only the leading word counts, so "Yes, it does" approves and
/// "No." rejects.
pub fn parse_verdict(reply: &str) -> Verdict {
    let lead: String = reply
        .trim_start_matches(|c: char| !c.is_alphanumeric())
        .chars()
        .take_while(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    match lead.as_str() {
        "yes" => Verdict::Approved,
        "no" => Verdict::Rejected,
        _ => Verdict::Unparseable(reply.trim().to_string()),
    }
}

/// What the judge sees
#[derive(Debug, Clone)]
pub struct ValidationInput<'a> {
    /// The user's command
    pub command: &'a str,
    /// System prompt used for the attempt
    pub system_prompt: &'a str,
    /// The attempt's final answer
    pub response: &'a str,
}

/// Independent yes/no judgment of a command response
#[async_trait]
pub trait Validator: Send + Sync {
    /// Judge one response
    async fn validate(
        &self,
        input: ValidationInput<'_>,
        cancel_token: CancellationToken,
    ) -> PlannerResult<Verdict>;
}

/// Validator that asks a planner, without tools
pub struct PlannerJudge {
    planner: Arc<dyn Planner>,
    options: PlanOptions,
}

impl PlannerJudge {
    /// Create a judge over a planner
    pub fn new(planner: Arc<dyn Planner>) -> Self {
        Self {
            planner,
            options: PlanOptions::new().with_temperature(0.6),
        }
    }

    /// Override sampling options
    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    fn request(&self, input: &ValidationInput<'_>) -> PlannerRequest {
        PlannerRequest::new(vec![
            ChatMessage::system(VALIDATION_INSTRUCTION),
            ChatMessage::user(validation_content(
                input.command,
                input.system_prompt,
                input.response,
            )),
            ChatMessage::user(VALIDATION_QUESTION),
        ])
        .with_options(self.options.clone())
    }
}

#[async_trait]
impl Validator for PlannerJudge {
    async fn validate(
        &self,
        input: ValidationInput<'_>,
        cancel_token: CancellationToken,
    ) -> PlannerResult<Verdict> {
        let request = self.request(&input);
        match self.planner.plan(request, cancel_token).await? {
            PlannerTurn::Answer(reply) => Ok(parse_verdict(&reply)),
            PlannerTurn::ToolCalls(calls) => Ok(Verdict::Unparseable(format!(
                "judge requested {} tool calls",
                calls.len()
            ))),
        }
    }
}

//! Command execution
//!
//! - `ExecutionContext`: state owned by one attempt
//! - `CommandExecutor`: the attempt loop with retries and self-validation
//! - `PlannerJudge`: yes/no validation through a planner

mod context;
mod executor;
mod prompt;
mod response;
mod validation;

pub use context::ExecutionContext;
pub use executor::{CommandExecutor, ExecutionError, CANCELLED_MESSAGE};
pub use prompt::{system_prompt, validation_content, VALIDATION_INSTRUCTION, VALIDATION_QUESTION};
pub use response::{CommandRequest, CommandResponse};
pub use validation::{parse_verdict, PlannerJudge, ValidationInput, Validator, Verdict};

//! Planner abstraction
//!
//! The planner is the chat-completion collaborator: given the conversation
//! and the merged tool list it either asks for tool calls or answers.
//!
//! - `GenaiPlanner`: real endpoints through the genai crate
//!   (OpenAI-compatible servers such as LM Studio, or native providers)
//! - `MockPlanner`: scripted turns for tests

mod api_error;
mod error;
mod genai_adapter;
mod genai_planner;
mod mock;
mod traits;

pub use api_error::describe_api_error;
pub use error::{PlannerError, PlannerResult};
pub use genai_adapter::{
    compatible_endpoint, create_client, is_openai_compatible, ClientConfig, LM_STUDIO_ENDPOINT,
};
pub use genai_planner::GenaiPlanner;
pub use mock::{MockMode, MockPlanner, MockStep};
pub use traits::{PlanOptions, Planner, PlannerRequest, PlannerTurn};

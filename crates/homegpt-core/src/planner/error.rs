//! Planner error types

use thiserror::Error;

use super::api_error::describe_api_error;

/// Errors from a planner round-trip
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Missing API key
    #[error("API key is required for {provider}")]
    MissingApiKey { provider: String },

    /// Chat endpoint returned an error
    #[error("{provider} API error ({status}): {message}")]
    ApiError {
        provider: String,
        status: u16,
        message: String,
    },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,

    /// Response could not be interpreted
    #[error("Invalid response from {provider}: {message}")]
    InvalidResponse { provider: String, message: String },

    /// Rate limited
    #[error("{provider} rate limited: {message}")]
    RateLimited { provider: String, message: String },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PlannerError {
    /// Create an API error
    pub fn api_error(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            provider: provider.into(),
            status,
            message: message.into(),
        }
    }

    /// Create a missing API key error
    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a rate limited error
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RateLimited {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Short explanation suitable for the chat response
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::ApiError { message, .. } => {
                describe_api_error(message, &self.to_string())
            }
            PlannerError::RateLimited { .. } => {
                "Too many requests. Wait a moment before trying again.".to_string()
            }
            PlannerError::MissingApiKey { provider } => {
                format!("No API key is configured for {}.", provider)
            }
            other => other.to_string(),
        }
    }
}

pub type PlannerResult<T> = Result<T, PlannerError>;

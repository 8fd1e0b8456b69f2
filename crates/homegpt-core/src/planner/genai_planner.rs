//! GenaiPlanner - planner backed by the genai crate
//!
//! Streams one chat completion per round-trip and reports either the
//! captured tool calls or the accumulated text.

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};
use genai::Client;

use crate::config::PlannerSettings;
use crate::logging::Logger;
use crate::types::{CancellationToken, ToolCall};

use super::error::{PlannerError, PlannerResult};
use super::genai_adapter::{
    create_client, from_genai_tool_call, to_genai_messages, to_genai_options, to_genai_tools,
    ClientConfig,
};
use super::traits::{PlanOptions, Planner, PlannerRequest, PlannerTurn};

/// Planner using genai for all supported chat APIs
pub struct GenaiPlanner {
    /// Provider identifier
    provider_id: String,
    /// Model name as sent to the API
    model: String,
    /// Defaults applied when a request leaves options unset
    defaults: PlanOptions,
    client: Client,
    logger: Arc<dyn Logger>,
}

impl GenaiPlanner {
    /// Create a planner from settings
    pub fn from_settings(settings: &PlannerSettings, logger: Arc<dyn Logger>) -> PlannerResult<Self> {
        let config = ClientConfig::from(settings);
        if config.api_key.is_none() && settings.api_key_env.is_some() {
            return Err(PlannerError::missing_api_key(&settings.provider));
        }

        let mut defaults = PlanOptions::new().with_temperature(settings.temperature);
        defaults.max_tokens = settings.max_tokens;

        Ok(Self {
            provider_id: config.provider.clone(),
            model: Self::extract_model_name(&settings.model, &config.provider).to_string(),
            defaults,
            client: create_client(&config),
            logger,
        })
    }

    /// Strip a provider prefix ("openai/gpt-4o" -> "gpt-4o")
    ///
    /// Local servers use slashes in their own model ids
    /// ("qwen/qwen3-coder-30b"), so those are kept whole.
    pub fn extract_model_name<'a>(model: &'a str, provider: &str) -> &'a str {
        match model.split_once('/') {
            Some((prefix, rest)) if prefix.eq_ignore_ascii_case(provider) => rest,
            _ => model,
        }
    }

    fn merged_options(&self, options: &PlanOptions) -> PlanOptions {
        PlanOptions {
            temperature: options.temperature.or(self.defaults.temperature),
            max_tokens: options.max_tokens.or(self.defaults.max_tokens),
        }
    }

    fn api_error(&self, error: genai::Error) -> PlannerError {
        let status = http_status(&error);
        let message = error.to_string();
        if status == 429 || message.to_lowercase().contains("rate limit") {
            PlannerError::rate_limited(&self.provider_id, message)
        } else {
            PlannerError::api_error(&self.provider_id, status, message)
        }
    }

    async fn exchange(&self, request: PlannerRequest) -> PlannerResult<PlannerTurn> {
        let options = to_genai_options(&self.merged_options(&request.options));

        let mut chat_req = ChatRequest::new(to_genai_messages(request.messages));
        if !request.tools.is_empty() {
            chat_req = chat_req.with_tools(to_genai_tools(request.tools));
        }

        let chat_stream = self
            .client
            .exec_chat_stream(self.model.as_str(), chat_req, Some(&options))
            .await
            .map_err(|e| self.api_error(e))?;

        let mut stream = chat_stream.stream;
        let mut text = String::new();
        let mut tool_calls: Vec<ToolCall> = Vec::new();

        while let Some(event) = stream.next().await {
            match event.map_err(|e| self.api_error(e))? {
                ChatStreamEvent::Chunk(chunk) => text.push_str(&chunk.content),
                ChatStreamEvent::End(end) => {
                    if let Some(captured) = end.captured_tool_calls() {
                        tool_calls = captured.iter().map(|tc| from_genai_tool_call(tc)).collect();
                    }
                }
                _ => {}
            }
        }

        self.logger.debug(&format!(
            "[GenaiPlanner] Turn finished: {} chars, {} tool calls",
            text.len(),
            tool_calls.len()
        ));

        if !tool_calls.is_empty() {
            return Ok(PlannerTurn::ToolCalls(tool_calls));
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(PlannerError::invalid_response(
                &self.provider_id,
                "empty response",
            ));
        }
        Ok(PlannerTurn::Answer(text.to_string()))
    }
}

#[async_trait]
impl Planner for GenaiPlanner {
    fn name(&self) -> &str {
        &self.provider_id
    }

    async fn plan(
        &self,
        request: PlannerRequest,
        cancel_token: CancellationToken,
    ) -> PlannerResult<PlannerTurn> {
        self.logger.info(&format!(
            "[GenaiPlanner] plan called: provider={}, model={}, tools={}",
            self.provider_id,
            self.model,
            request.tools.len()
        ));

        if cancel_token.is_cancelled() {
            return Err(PlannerError::Cancelled);
        }

        tokio::select! {
            result = self.exchange(request) => result,
            _ = cancel_token.cancelled() => {
                self.logger.info("[GenaiPlanner] Request cancelled");
                Err(PlannerError::Cancelled)
            }
        }
    }
}

/// HTTP status of a failed genai call, or 0 when no response was received
fn http_status(error: &genai::Error) -> u16 {
    match error {
        genai::Error::HttpError { status, .. } => status.as_u16(),
        genai::Error::WebAdapterCall { webc_error, .. }
        | genai::Error::WebModelCall { webc_error, .. } => match webc_error {
            genai::webc::Error::ResponseFailedStatus { status, .. } => status.as_u16(),
            _ => 0,
        },
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_extract_model_name() {
        assert_eq!(GenaiPlanner::extract_model_name("openai/gpt-4o", "openai"), "gpt-4o");
        assert_eq!(
            GenaiPlanner::extract_model_name("qwen/qwen3-coder-30b", "openai-compatible"),
            "qwen/qwen3-coder-30b"
        );
        assert_eq!(GenaiPlanner::extract_model_name("gpt-4o", "openai"), "gpt-4o");
    }

    fn http_error(status: reqwest::StatusCode) -> genai::Error {
        genai::Error::HttpError {
            status,
            canonical_reason: status.canonical_reason().unwrap_or_default().to_string(),
            body: r#"{"error": {"message": "No models loaded"}}"#.to_string(),
        }
    }

    #[test]
    fn test_api_error_keeps_http_status() {
        let planner = GenaiPlanner::from_settings(&PlannerSettings::default(), Arc::new(NoOpLogger)).unwrap();

        let err = planner.api_error(http_error(reqwest::StatusCode::BAD_REQUEST));
        assert!(matches!(err, PlannerError::ApiError { status: 400, .. }));

        let err = planner.api_error(http_error(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(matches!(err, PlannerError::RateLimited { .. }));
    }

    #[test]
    fn test_api_error_without_response_has_no_status() {
        let planner = GenaiPlanner::from_settings(&PlannerSettings::default(), Arc::new(NoOpLogger)).unwrap();

        let err = planner.api_error(genai::Error::ChatReqHasNoMessages {
            model_iden: genai::ModelIden::new(genai::adapter::AdapterKind::OpenAI, "qwen"),
        });
        assert!(matches!(err, PlannerError::ApiError { status: 0, .. }));
    }

    #[test]
    fn test_from_settings_applies_defaults() {
        let settings = PlannerSettings {
            max_tokens: Some(512),
            ..PlannerSettings::default()
        };
        let planner = GenaiPlanner::from_settings(&settings, Arc::new(NoOpLogger)).unwrap();

        assert_eq!(planner.name(), "openai-compatible");
        assert_eq!(planner.model, "qwen/qwen3-coder-30b");

        let merged = planner.merged_options(&PlanOptions::new().with_temperature(0.0));
        assert_eq!(merged.temperature, Some(0.0));
        assert_eq!(merged.max_tokens, Some(512));
    }

    #[test]
    fn test_missing_env_key_is_reported() {
        let settings = PlannerSettings {
            provider: "openai".to_string(),
            api_key_env: Some("HOMEGPT_TEST_UNSET_KEY_VAR".to_string()),
            ..PlannerSettings::default()
        };
        let err = GenaiPlanner::from_settings(&settings, Arc::new(NoOpLogger))
            .err()
            .unwrap();
        assert!(matches!(err, PlannerError::MissingApiKey { .. }));
    }
}

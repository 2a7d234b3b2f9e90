//! Azure `OpenAI` Chat Completions API implementation.
//!
//! Implements the [`Model`] trait for a single Azure deployment.

use super::PROVIDER;
use super::client::AzureOpenAIClient;
use crate::error::ServiceError;
use crate::message::Message;
use crate::providers::{Choice, GenerateOptions, Model, ModelResponse, TokenUsage, saturating_u32};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

/// Azure `OpenAI` chat completion model bound to one deployment.
#[derive(Clone)]
pub struct CompletionModel {
    client: AzureOpenAIClient,
    deployment: String,
    /// Default ceiling on generated tokens, used when the call sets none.
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for CompletionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionModel")
            .field("deployment", &self.deployment)
            .field("max_tokens", &self.max_tokens)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    #[serde(default)]
    index: u32,
    message: Option<ApiMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl CompletionModel {
    /// Create a new completion model.
    pub(crate) fn new(client: AzureOpenAIClient, deployment: impl Into<String>) -> Self {
        Self {
            client,
            deployment: deployment.into(),
            max_tokens: None,
        }
    }

    /// Set the default ceiling on generated tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// The deployment this model targets.
    #[must_use]
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    fn request_body<'a>(
        &'a self,
        messages: &'a [Message],
        options: GenerateOptions,
    ) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.deployment,
            messages,
            max_tokens: options.max_tokens.or(self.max_tokens),
        }
    }

    /// Parse a successful response body into a `ModelResponse`.
    fn parse_response(body: &str) -> Result<ModelResponse, ServiceError> {
        let raw: Value = serde_json::from_str(body).map_err(|e| {
            ServiceError::response_format(format!("response is not JSON: {e}"))
                .with_provider(PROVIDER)
        })?;
        let parsed: ChatCompletionResponse = serde_json::from_value(raw.clone()).map_err(|e| {
            ServiceError::response_format(format!("unexpected response shape: {e}"))
                .with_provider(PROVIDER)
        })?;

        let choices = parsed
            .choices
            .into_iter()
            .map(|c| Choice {
                index: c.index,
                text: c.message.and_then(|m| m.content),
                finish_reason: c.finish_reason,
            })
            .collect();

        let mut response = ModelResponse::new(choices).with_raw(raw);
        if let Some(usage) = parsed.usage {
            response = response.with_token_usage(TokenUsage::new(
                saturating_u32(usage.prompt_tokens),
                saturating_u32(usage.completion_tokens),
            ));
        }
        Ok(response)
    }

    /// Map a non-success status and its body to a `ServiceError`.
    fn status_error(status: u16, body: &str) -> ServiceError {
        let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        let message = json["error"]["message"]
            .as_str()
            .map_or_else(|| body.to_string(), String::from);
        let code = match &json["error"]["code"] {
            Value::String(code) => Some(code.clone()),
            Value::Number(code) => Some(code.to_string()),
            _ => None,
        };

        match (status, code) {
            (401 | 403, _) => ServiceError::auth(PROVIDER, message).with_code(status.to_string()),
            (429, _) => ServiceError::rate_limited(PROVIDER, message).with_code(status.to_string()),
            (_, Some(code)) => ServiceError::provider_code(PROVIDER, code, message),
            (_, None) => ServiceError::http_status(status, body).with_provider(PROVIDER),
        }
    }
}

#[async_trait]
impl Model for CompletionModel {
    fn model_id(&self) -> &str {
        &self.deployment
    }

    fn provider(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, messages, options), fields(deployment = %self.deployment, turns = messages.len()))]
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, ServiceError> {
        let url = self.client.chat_completions_url(&self.deployment);
        let body = self.request_body(&messages, options);

        debug!(max_tokens = ?body.max_tokens, "Sending request to Azure OpenAI");

        let response = self
            .client
            .http_client()
            .post(&url)
            .headers(self.client.auth_headers())
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::from(e).with_provider(PROVIDER))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ServiceError::from(e).with_provider(PROVIDER))?;
        if !status.is_success() {
            return Err(Self::status_error(status.as_u16(), &text));
        }

        let parsed = Self::parse_response(&text)?;
        debug!(
            choices = parsed.choices.len(),
            usage = ?parsed.token_usage,
            "Azure OpenAI response"
        );
        Ok(parsed)
    }
}

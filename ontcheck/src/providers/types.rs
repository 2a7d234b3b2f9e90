//! Core types for model providers.
//!
//! This module contains the request options and response structures shared
//! by every [`Model`](super::Model) implementation.

use serde::{Deserialize, Serialize};

/// Token usage information from a model response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    /// Number of tokens in the input/prompt.
    pub input_tokens: u32,
    /// Number of tokens in the output/completion.
    pub output_tokens: u32,
}

impl TokenUsage {
    /// Create new token usage with specified counts.
    #[must_use]
    pub const fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Get total token count.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }
}

/// One generated alternative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Choice {
    /// Position of this choice in the response.
    pub index: u32,
    /// Generated text, if the service returned any.
    pub text: Option<String>,
    /// Why generation stopped (e.g., "stop", "length", "`content_filter`").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl Choice {
    /// Create a choice holding `text`.
    #[must_use]
    pub fn new(index: u32, text: impl Into<String>) -> Self {
        Self {
            index,
            text: Some(text.into()),
            finish_reason: None,
        }
    }
}

/// Response from a model generation call.
///
/// Contains every generated choice, token usage statistics, and optionally
/// the raw API response for debugging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelResponse {
    /// Generated choices, in service order.
    pub choices: Vec<Choice>,
    /// Token usage information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
    /// Raw response from the API (provider-specific).
    #[serde(skip)]
    pub raw: Option<serde_json::Value>,
}

impl ModelResponse {
    /// Create a response with the given choices.
    #[must_use]
    pub const fn new(choices: Vec<Choice>) -> Self {
        Self {
            choices,
            token_usage: None,
            raw: None,
        }
    }

    /// Create a response with a single text choice.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Choice::new(0, text)])
    }

    /// Set token usage.
    #[must_use]
    pub const fn with_token_usage(mut self, usage: TokenUsage) -> Self {
        self.token_usage = Some(usage);
        self
    }

    /// Set raw response.
    #[must_use]
    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Get the text of the first choice.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.choices.first().and_then(|c| c.text.as_deref())
    }

    /// Take the text of the first choice.
    #[must_use]
    pub fn into_text(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.text)
    }
}

/// Options for model generation requests.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl GenerateOptions {
    /// Create new default generate options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_usage_total() {
        let usage = TokenUsage::new(100, 50);
        assert_eq!(usage.total(), 150);
        assert_eq!(TokenUsage::new(u32::MAX, 1).total(), u32::MAX);
    }

    #[test]
    fn test_model_response_first_choice() {
        let response = ModelResponse::new(vec![Choice::new(0, "first"), Choice::new(1, "second")]);
        assert_eq!(response.text(), Some("first"));
        assert_eq!(response.into_text().as_deref(), Some("first"));
    }

    #[test]
    fn test_model_response_without_text() {
        assert!(ModelResponse::default().text().is_none());

        let response = ModelResponse::new(vec![Choice {
            index: 0,
            text: None,
            finish_reason: Some("content_filter".into()),
        }]);
        assert!(response.text().is_none());
    }

    #[test]
    fn test_model_response_with_token_usage() {
        let usage = TokenUsage::new(10, 5);
        let response = ModelResponse::from_text("Hello").with_token_usage(usage);

        assert_eq!(response.token_usage, Some(usage));
        assert!(response.raw.is_none());
    }

    #[test]
    fn test_generate_options() {
        assert!(GenerateOptions::default().max_tokens.is_none());
        assert_eq!(
            GenerateOptions::new().with_max_tokens(2000).max_tokens,
            Some(2000)
        );
    }
}

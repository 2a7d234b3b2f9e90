//! Model providers.
//!
//! The [`Model`] trait is the one capability the classifier needs: run a
//! single chat completion over a list of turns. [`azure`] talks to a hosted
//! Azure `OpenAI` deployment; [`mock`] records calls and replies with canned
//! text.
//!
//! # Example
//!
//! ```rust,ignore
//! use ontcheck::providers::azure::AzureOpenAIClient;
//!
//! let client = AzureOpenAIClient::builder()
//!     .endpoint("https://my-resource.openai.azure.com")
//!     .api_key("...")
//!     .build()?;
//! let model = client.completion_model("gpt-4o");
//! ```

mod config;
mod types;

pub mod azure;
pub mod mock;

pub use config::{DEFAULT_TIMEOUT_SECS, HttpClientConfig};
pub use types::{Choice, GenerateOptions, ModelResponse, TokenUsage};

pub use azure::AzureOpenAIClient;
pub use mock::MockModel;

use crate::error::ServiceError;
use crate::message::Message;
use async_trait::async_trait;

/// The core trait for chat model implementations.
///
/// Implementations send `messages` as one request and return every choice
/// the service produced. They do not retry.
#[async_trait]
pub trait Model: Send + Sync {
    /// Get the model or deployment identifier.
    fn model_id(&self) -> &str;

    /// Get the provider name (e.g., "azure-openai").
    fn provider(&self) -> &'static str {
        "unknown"
    }

    /// Generate a response for the given messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the response cannot be parsed.
    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, ServiceError>;
}

#[async_trait]
impl<M: Model + ?Sized> Model for std::sync::Arc<M> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn provider(&self) -> &'static str {
        (**self).provider()
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, ServiceError> {
        (**self).generate(messages, options).await
    }
}

/// Safely convert u64 to u32, saturating at `u32::MAX` if overflow.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn saturating_u32(value: u64) -> u32 {
    if value > u32::MAX as u64 {
        u32::MAX
    } else {
        value as u32
    }
}

//! Azure `OpenAI` chat completions.
//!
//! Requests go to
//! `{endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
//! with the key in the `api-key` header.

mod client;
mod completion;

pub use client::{AzureOpenAIClient, AzureOpenAIClientBuilder, DEFAULT_API_VERSION};
pub use completion::CompletionModel;

/// Provider name reported by [`CompletionModel`] and attached to its errors.
pub const PROVIDER: &str = "azure-openai";

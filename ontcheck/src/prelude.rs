//! Re-exports of the commonly used types.

pub use crate::classifier::Classifier;
pub use crate::config::{ClassifierConfig, EnvSecrets, SecretSource, SecretsFile};
pub use crate::error::{ConfigError, Error, Result, ServiceError, ServiceErrorKind};
pub use crate::image::{ImagePayload, encode};
pub use crate::message::{Content, ContentPart, Message, Role};
pub use crate::prompt::{Exemplars, PromptBuilder, PromptLocale};
pub use crate::providers::azure::{AzureOpenAIClient, CompletionModel};
pub use crate::providers::{GenerateOptions, MockModel, Model, ModelResponse};

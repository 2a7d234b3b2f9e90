//! Ontcheck classifies photos of network terminal (ONT) installations as
//! correctly or poorly installed, using a hosted multimodal chat model and two
//! reference images as few-shot examples.
//!
//! ```rust,ignore
//! use ontcheck::prelude::*;
//!
//! let config = ClassifierConfig::from_secrets(&EnvSecrets)?;
//! let classifier = Classifier::from_config(&config)?;
//! println!("{}", classifier.classify("unit.jpg").await?);
//! ```
//!
//! The returned text follows the prompt's `Decision` / `Description` /
//! `Justification` layout by convention only; it is not parsed.

pub mod classifier;
pub mod config;
pub mod error;
pub mod image;
pub mod message;
pub mod prelude;
pub mod prompt;
pub mod providers;

pub use classifier::Classifier;
pub use config::ClassifierConfig;
pub use error::{ConfigError, Error, Result, ServiceError, ServiceErrorKind};
pub use image::ImagePayload;
pub use prompt::{ClassificationRequest, Exemplars, PromptBuilder, PromptLocale};

//! The classification entry point.
//!
//! A [`Classifier`] owns a [`Model`], a [`PromptBuilder`] and the two
//! reference images. [`Classifier::classify`] encodes the target, sends one
//! request and returns the model's text exactly as received.
//!
//! # Example
//!
//! ```rust,ignore
//! use ontcheck::{Classifier, ClassifierConfig};
//! use ontcheck::config::EnvSecrets;
//!
//! let config = ClassifierConfig::from_secrets(&EnvSecrets)?;
//! let classifier = Classifier::from_config(&config)?;
//! let verdict = classifier.classify("photos/unit-17.jpg").await?;
//! println!("{verdict}");
//! ```

use crate::config::ClassifierConfig;
use crate::error::{Result, ServiceError};
use crate::prompt::{Exemplars, PromptBuilder};
use crate::providers::azure::{AzureOpenAIClient, CompletionModel};
use crate::providers::{GenerateOptions, Model};
use std::path::Path;
use tracing::{debug, instrument};

/// Classifies installation photos against a good and a bad reference.
#[derive(Debug, Clone)]
pub struct Classifier<M> {
    model: M,
    prompt: PromptBuilder,
    exemplars: Exemplars,
}

impl<M: Model> Classifier<M> {
    /// Create a classifier over `model` with the default prompt.
    #[must_use]
    pub fn new(model: M, exemplars: Exemplars) -> Self {
        Self {
            model,
            prompt: PromptBuilder::new(),
            exemplars,
        }
    }

    /// Replace the prompt builder.
    #[must_use]
    pub const fn with_prompt(mut self, prompt: PromptBuilder) -> Self {
        self.prompt = prompt;
        self
    }

    /// The underlying model.
    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// The prompt builder.
    #[must_use]
    pub const fn prompt(&self) -> &PromptBuilder {
        &self.prompt
    }

    /// The reference images.
    #[must_use]
    pub const fn exemplars(&self) -> &Exemplars {
        &self.exemplars
    }

    /// Classify the image at `target`.
    ///
    /// Returns the first choice's text verbatim. The decision, description
    /// and justification sections are whatever the model wrote.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`](crate::Error::NotFound) or
    ///   [`Error::Read`](crate::Error::Read) if any of the three images cannot
    ///   be encoded. No request is sent.
    /// - [`Error::Service`](crate::Error::Service) if the call fails, or if
    ///   the response holds no choice or the first choice has no text.
    #[instrument(
        skip(self, target),
        fields(model = %self.model.model_id(), target = %target.as_ref().display())
    )]
    pub async fn classify(&self, target: impl AsRef<Path>) -> Result<String> {
        let request = self.prompt.build_with(target, &self.exemplars)?;
        let (messages, max_tokens) = request.into_parts();

        debug!(turns = messages.len(), max_tokens, "sending classification request");
        let response = self
            .model
            .generate(messages, GenerateOptions::new().with_max_tokens(max_tokens))
            .await?;

        if let Some(usage) = response.token_usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "classification complete"
            );
        }

        if response.choices.is_empty() {
            return Err(ServiceError::response_format("response has no choices")
                .with_provider(self.model.provider())
                .into());
        }
        response.into_text().ok_or_else(|| {
            ServiceError::response_format("first choice has no text content")
                .with_provider(self.model.provider())
                .into()
        })
    }
}

impl Classifier<CompletionModel> {
    /// Create a classifier backed by the Azure deployment in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the endpoint or key
    /// is unusable, or [`Error::Service`](crate::Error::Service) if the HTTP
    /// client cannot be built.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let client = AzureOpenAIClient::builder()
            .endpoint(&config.endpoint)
            .api_key(&config.api_key)
            .api_version(&config.api_version)
            .timeout_secs(config.timeout_secs)
            .build()?;
        let model = client
            .completion_model(&config.deployment)
            .with_max_tokens(config.max_tokens);

        Ok(Self::new(model, config.exemplars.clone()).with_prompt(config.prompt_builder()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error, ServiceErrorKind};
    use crate::message::{ContentPart, Role};
    use crate::prompt::{PromptLocale, TURN_COUNT};
    use crate::providers::{Choice, MockModel, ModelResponse};
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use base64::Engine;
    use base64::prelude::BASE64_STANDARD;

    // SOI, a JFIF APP0 stub and EOI; enough to stand in for a black frame.
    const BLACK_JPEG: &[u8] = &[
        0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
        0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
    ];

    struct Fixture {
        temp: TempDir,
        exemplars: Exemplars,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let good = temp.child("reference/good.jpeg");
            good.write_binary(b"good-reference").unwrap();
            let bad = temp.child("reference/bad.jpeg");
            bad.write_binary(b"bad-reference").unwrap();
            let exemplars = Exemplars::new(good.path(), bad.path());
            Self { temp, exemplars }
        }

        fn target(&self, name: &str, bytes: &[u8]) -> std::path::PathBuf {
            let child = self.temp.child(name);
            child.write_binary(bytes).unwrap();
            child.path().to_path_buf()
        }
    }

    fn image_url(part: &ContentPart) -> &str {
        match part {
            ContentPart::ImageUrl { image_url } => &image_url.url,
            ContentPart::Text { .. } => panic!("expected image part"),
        }
    }

    #[tokio::test]
    async fn test_classify_black_jpeg() {
        let fx = Fixture::new();
        let target = fx.target("black.jpg", BLACK_JPEG);
        let reply = "Decision: Poorly installed\n\nDescription: the image is completely dark.\n\n\
                     Justification: nothing can be seen.";
        let mock = MockModel::new(reply);
        let classifier = Classifier::new(mock.clone(), fx.exemplars.clone());

        let verdict = classifier.classify(&target).await.unwrap();
        assert_eq!(verdict, reply);

        assert_eq!(mock.call_count(), 1);
        let call = mock.last_call().unwrap();
        assert_eq!(call.messages.len(), TURN_COUNT);
        assert_eq!(call.options.max_tokens, Some(2000));
        assert_eq!(call.messages[0].role, Role::System);

        let urls: Vec<_> = call.messages[1..]
            .iter()
            .map(|m| image_url(&m.parts().unwrap()[1]))
            .collect();
        assert_eq!(
            urls[0],
            format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(b"good-reference"))
        );
        assert_eq!(
            urls[1],
            format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(b"bad-reference"))
        );
        let payload = urls[2].strip_prefix("data:image/jpeg;base64,").unwrap();
        assert_eq!(BASE64_STANDARD.decode(payload).unwrap(), BLACK_JPEG);
    }

    #[tokio::test]
    async fn test_classify_returns_text_verbatim() {
        let fx = Fixture::new();
        let target = fx.target("unit.png", b"png");
        let reply = "\n  Decision: Correctly installed  \n";
        let classifier = Classifier::new(MockModel::new(reply), fx.exemplars.clone());

        assert_eq!(classifier.classify(&target).await.unwrap(), reply);
    }

    #[tokio::test]
    async fn test_classify_uses_first_choice() {
        let fx = Fixture::new();
        let target = fx.target("unit.jpg", b"x");
        let response = ModelResponse::new(vec![Choice::new(0, "first"), Choice::new(1, "second")]);
        let classifier = Classifier::new(MockModel::with_response(response), fx.exemplars.clone());

        assert_eq!(classifier.classify(&target).await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_classify_missing_target_makes_no_call() {
        let fx = Fixture::new();
        let mock = MockModel::new("unused");
        let classifier = Classifier::new(mock.clone(), fx.exemplars.clone());

        let err = classifier.classify("/nonexistent/x.jpg").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_classify_missing_exemplar_makes_no_call() {
        let fx = Fixture::new();
        let target = fx.target("unit.jpg", b"x");
        let mock = MockModel::new("unused");
        let exemplars = Exemplars::new(&fx.exemplars.good, fx.temp.path().join("gone.jpeg"));
        let classifier = Classifier::new(mock.clone(), exemplars);

        let err = classifier.classify(&target).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { ref path } if path.ends_with("gone.jpeg")));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_classify_propagates_service_error() {
        let fx = Fixture::new();
        let target = fx.target("unit.jpg", b"x");
        let failure = ServiceError::auth("azure-openai", "invalid subscription key");
        let mock = MockModel::failing(failure.clone());
        let classifier = Classifier::new(mock.clone(), fx.exemplars.clone());

        let err = classifier.classify(&target).await.unwrap_err();
        assert_eq!(err.as_service(), Some(&failure));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_classify_unusable_responses() {
        let fx = Fixture::new();
        let target = fx.target("unit.jpg", b"x");

        let classifier = Classifier::new(
            MockModel::with_response(ModelResponse::default()),
            fx.exemplars.clone(),
        );
        let err = classifier.classify(&target).await.unwrap_err();
        let service = err.as_service().unwrap();
        assert_eq!(service.kind, ServiceErrorKind::ResponseFormat);
        assert_eq!(service.provider.as_deref(), Some("mock"));

        let empty = Choice {
            index: 0,
            text: None,
            finish_reason: Some("content_filter".to_string()),
        };
        let classifier = Classifier::new(
            MockModel::with_response(ModelResponse::new(vec![empty])),
            fx.exemplars.clone(),
        );
        let err = classifier.classify(&target).await.unwrap_err();
        assert_eq!(
            err.as_service().map(|e| e.kind),
            Some(ServiceErrorKind::ResponseFormat)
        );
    }

    #[tokio::test]
    async fn test_classify_with_prompt_settings() {
        let fx = Fixture::new();
        let target = fx.target("unit.jpg", b"x");
        let mock = MockModel::new("Decisión: Mal instalado");
        let classifier = Classifier::new(mock.clone(), fx.exemplars.clone()).with_prompt(
            PromptBuilder::new()
                .with_locale(PromptLocale::Spanish)
                .with_max_tokens(512),
        );

        classifier.classify(&target).await.unwrap();
        let call = mock.last_call().unwrap();
        assert_eq!(call.options.max_tokens, Some(512));
        assert!(
            call.messages[0]
                .text_content()
                .unwrap()
                .contains("Mal instalado")
        );
    }

    #[tokio::test]
    async fn test_classify_concurrent_calls() {
        let fx = Fixture::new();
        let first = fx.target("a.jpg", b"a");
        let second = fx.target("b.jpg", b"b");
        let mock = MockModel::new("ok");
        let classifier = Classifier::new(mock.clone(), fx.exemplars.clone());

        let (a, b) = tokio::join!(classifier.classify(&first), classifier.classify(&second));
        assert_eq!(a.unwrap(), "ok");
        assert_eq!(b.unwrap(), "ok");
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_from_config() {
        let config = ClassifierConfig::new("https://unit.openai.azure.com", "key", "gpt-4o")
            .with_max_tokens(900)
            .with_locale(PromptLocale::Spanish)
            .with_exemplars(Exemplars::new("g.jpeg", "b.jpeg"));

        let classifier = Classifier::from_config(&config).unwrap();
        assert_eq!(classifier.model().deployment(), "gpt-4o");
        assert_eq!(classifier.model().max_tokens, Some(900));
        assert_eq!(classifier.prompt().max_tokens(), 900);
        assert_eq!(classifier.prompt().locale(), PromptLocale::Spanish);
        assert_eq!(classifier.exemplars(), &Exemplars::new("g.jpeg", "b.jpeg"));
    }

    #[test]
    fn test_from_config_rejects_bad_endpoint() {
        let config = ClassifierConfig::new("", "key", "gpt-4o");
        let err = Classifier::from_config(&config).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Missing(_))));
    }
}

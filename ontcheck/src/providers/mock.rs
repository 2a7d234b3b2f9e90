//! A recording [`Model`] for tests and offline runs.
//!
//! Clones share state, so a test can hand one clone to a
//! [`Classifier`](crate::Classifier) and inspect the other afterwards.

use super::{GenerateOptions, Model, ModelResponse};
use crate::error::ServiceError;
use crate::message::Message;
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One recorded [`Model::generate`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// The turns that were sent.
    pub messages: Vec<Message>,
    /// The options that were sent.
    pub options: GenerateOptions,
}

#[derive(Debug)]
struct MockState {
    reply: Result<ModelResponse, ServiceError>,
    calls: Vec<RecordedCall>,
}

/// A model that returns a fixed reply and records every call.
#[derive(Debug, Clone)]
pub struct MockModel {
    model_id: String,
    state: Arc<Mutex<MockState>>,
}

impl MockModel {
    /// Reply with a single choice holding `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_response(ModelResponse::from_text(text))
    }

    /// Reply with `response`.
    #[must_use]
    pub fn with_response(response: ModelResponse) -> Self {
        Self::from_reply(Ok(response))
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn failing(error: ServiceError) -> Self {
        Self::from_reply(Err(error))
    }

    fn from_reply(reply: Result<ModelResponse, ServiceError>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            state: Arc::new(Mutex::new(MockState {
                reply,
                calls: Vec::new(),
            })),
        }
    }

    /// Set the reported model identifier.
    #[must_use]
    pub fn with_model_id(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of calls made so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// All recorded calls, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// The most recent call.
    #[must_use]
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.lock().calls.last().cloned()
    }
}

#[async_trait]
impl Model for MockModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn provider(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        messages: Vec<Message>,
        options: GenerateOptions,
    ) -> Result<ModelResponse, ServiceError> {
        let mut state = self.lock();
        state.calls.push(RecordedCall { messages, options });
        state.reply.clone()
    }
}

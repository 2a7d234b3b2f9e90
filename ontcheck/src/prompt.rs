//! Few-shot prompt assembly.
//!
//! [`PromptBuilder::build`] always produces the same four turns:
//!
//! 1. a system instruction naming the two permitted decision labels,
//! 2. the good exemplar (caption + image),
//! 3. the bad exemplar (caption + image),
//! 4. the target image with the answer-format instructions.
//!
//! The order is what the model conditions on; nothing else in the request
//! tells it which exemplar is which.

use crate::error::Result;
use crate::image;
use crate::message::{ContentPart, Message};
use std::path::{Path, PathBuf};

/// Default ceiling on generated output length, in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Number of turns in every [`ClassificationRequest`].
pub const TURN_COUNT: usize = 4;

/// Language of the literal prompt text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PromptLocale {
    /// English wording.
    #[default]
    English,
    /// Spanish wording.
    Spanish,
}

struct PromptText {
    correct_label: &'static str,
    poor_label: &'static str,
    system: &'static str,
    good_caption: &'static str,
    bad_caption: &'static str,
    instructions: &'static str,
}

const ENGLISH: PromptText = PromptText {
    correct_label: "Correctly installed",
    poor_label: "Poorly installed",
    system: "Your goal is to classify whether an ONT is properly protected or not.\n\
             Binary classification:\n\
             * Poorly installed\n\
             * Correctly installed",
    good_caption: "this is a well-installed unit because it sits inside the cable channel",
    bad_caption: "this is a poorly-installed unit because the cable exits the channel",
    instructions: "Based on the previous examples, classify the following image.\n\n\
                   Use the following format:\n\n\
                   Decision: (you may answer Correctly installed / Poorly installed)\n\n\
                   Description: (in detail, what you see in the image and why you reach \
                   the decision. Include whether the cable comes out on one side: left, \
                   right, completely out, etc.)\n\n\
                   Justification: (the justification as a paragraph or as a list, as you \
                   see fit.)",
};

const SPANISH: PromptText = PromptText {
    correct_label: "Correctamente instalado",
    poor_label: "Mal instalado",
    system: "Tu objetivo es clasificar si un ONT está bien resguardado o no.\n\
             Tipo de clasificación binaria:\n\
             * Mal instalado\n\
             * Correctamente instalado",
    good_caption: "Este es un ONT bien instalado ya que está dentro de la canaleta",
    bad_caption: "Este es un ONT mal instalado ya que el cable se sale de la canaleta",
    instructions: "Basándote en los ejemplos anteriores, clasifica la siguiente imagen.\n\n\
                   El formato será el siguiente:\n\n\
                   Decisión: (Puedes devolver Correctamente instalado / Mal instalado)\n\n\
                   Descripción: (detalladamente, qué ves en la imagen y por qué tomas la \
                   decisión. Incluye si el cable se sale de un lado, izquierdo, derecho, \
                   completamente salido, etc)\n\n\
                   Justificación: (Aquí pones la justificación en un párrafo o en lista, \
                   como creas conveniente.)",
};

impl PromptLocale {
    const fn text(self) -> &'static PromptText {
        match self {
            Self::English => &ENGLISH,
            Self::Spanish => &SPANISH,
        }
    }

    /// The two decision labels the model is told to choose from, as
    /// `[correct, poor]`.
    #[must_use]
    pub const fn decision_labels(self) -> [&'static str; 2] {
        let text = self.text();
        [text.correct_label, text.poor_label]
    }
}

/// Paths of the two reference images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exemplars {
    /// A correctly installed unit.
    pub good: PathBuf,
    /// A poorly installed unit.
    pub bad: PathBuf,
}

impl Exemplars {
    /// Create exemplars from explicit paths.
    #[must_use]
    pub fn new(good: impl Into<PathBuf>, bad: impl Into<PathBuf>) -> Self {
        Self {
            good: good.into(),
            bad: bad.into(),
        }
    }
}

impl Default for Exemplars {
    fn default() -> Self {
        Self::new(
            Path::new("reference").join("good.jpeg"),
            Path::new("reference").join("bad.jpeg"),
        )
    }
}

/// The assembled prompt plus the output-length bound.
///
/// Only [`PromptBuilder`] creates these, so every instance holds exactly
/// [`TURN_COUNT`] turns in the fixed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    messages: Vec<Message>,
    max_tokens: u32,
}

impl ClassificationRequest {
    /// The turns, in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The ceiling on generated tokens.
    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// The final turn, holding the image under evaluation.
    #[must_use]
    pub fn target(&self) -> &Message {
        &self.messages[TURN_COUNT - 1]
    }

    /// Split into turns and output bound.
    #[must_use]
    pub fn into_parts(self) -> (Vec<Message>, u32) {
        (self.messages, self.max_tokens)
    }
}

/// Builds [`ClassificationRequest`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    locale: PromptLocale,
    max_tokens: u32,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            locale: PromptLocale::default(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl PromptBuilder {
    /// Create a builder with English text and [`DEFAULT_MAX_TOKENS`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the prompt language.
    #[must_use]
    pub const fn with_locale(mut self, locale: PromptLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Set the ceiling on generated tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// The configured locale.
    #[must_use]
    pub const fn locale(&self) -> PromptLocale {
        self.locale
    }

    /// The configured output bound.
    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        self.max_tokens
    }

    /// Encode the three images and assemble the four turns.
    ///
    /// # Errors
    ///
    /// Returns the encoding error of the first image that cannot be read;
    /// no request is produced in that case.
    pub fn build(
        &self,
        target: impl AsRef<Path>,
        good_example: impl AsRef<Path>,
        bad_example: impl AsRef<Path>,
    ) -> Result<ClassificationRequest> {
        let good = image::encode(good_example)?;
        let bad = image::encode(bad_example)?;
        let target = image::encode(target)?;

        let text = self.locale.text();
        let messages = vec![
            Message::system(text.system),
            Message::user_parts(vec![ContentPart::text(text.good_caption), good.into()]),
            Message::user_parts(vec![ContentPart::text(text.bad_caption), bad.into()]),
            Message::user_parts(vec![ContentPart::text(text.instructions), target.into()]),
        ];

        Ok(ClassificationRequest {
            messages,
            max_tokens: self.max_tokens,
        })
    }

    /// [`build`](Self::build) with the exemplar pair taken from `exemplars`.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub fn build_with(
        &self,
        target: impl AsRef<Path>,
        exemplars: &Exemplars,
    ) -> Result<ClassificationRequest> {
        self.build(target, &exemplars.good, &exemplars.bad)
    }
}

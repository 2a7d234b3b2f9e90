//! Chat message types in the OpenAI chat-completions wire format.
//!
//! A [`Message`] carries a [`Role`] and a [`Content`], which is either plain
//! text or an ordered list of [`ContentPart`]s mixing text and inline images.
//!
//! ```rust,ignore
//! use ontcheck::message::{ContentPart, Message};
//!
//! let turn = Message::user_parts(vec![
//!     ContentPart::text("What is in this image?"),
//!     ContentPart::image_url("data:image/jpeg;base64,..."),
//! ]);
//! ```

use crate::image::ImagePayload;
use serde::{Deserialize, Serialize};

/// The author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions that frame the conversation.
    System,
    /// Input from the caller.
    User,
    /// Output from the model.
    Assistant,
}

/// An image reference inside a content part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageUrl {
    /// A remote URL or an inline `data:` URL.
    pub url: String,
}

/// One segment of a multi-part message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    /// A text segment.
    Text {
        /// The text.
        text: String,
    },
    /// An image segment.
    ImageUrl {
        /// The image location.
        image_url: ImageUrl,
    },
}

impl ContentPart {
    /// Create a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an image part from a URL (remote or `data:`).
    #[must_use]
    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: ImageUrl { url: url.into() },
        }
    }

    /// Returns `true` if this is an image part.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self, Self::ImageUrl { .. })
    }

    /// The text of a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            Self::ImageUrl { .. } => None,
        }
    }
}

impl From<ImagePayload> for ContentPart {
    fn from(payload: ImagePayload) -> Self {
        Self::image_url(payload.data_url())
    }
}

/// Message content: plain text or ordered parts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    /// Plain text.
    Text(String),
    /// Ordered text and image segments.
    Parts(Vec<ContentPart>),
}

/// A single conversational turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the turn.
    pub role: Role,
    /// What the turn says.
    pub content: Content,
}

impl Message {
    /// Create a message.
    #[must_use]
    pub const fn new(role: Role, content: Content) -> Self {
        Self { role, content }
    }

    /// Create a plain-text system message.
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::new(Role::System, Content::Text(text.into()))
    }

    /// Create a plain-text user message.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, Content::Text(text.into()))
    }

    /// Create a multi-part user message.
    #[must_use]
    pub const fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self::new(Role::User, Content::Parts(parts))
    }

    /// The content parts, if this is a multi-part message.
    #[must_use]
    pub fn parts(&self) -> Option<&[ContentPart]> {
        match &self.content {
            Content::Parts(parts) => Some(parts),
            Content::Text(_) => None,
        }
    }

    /// Concatenated text of the message, ignoring images.
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        match &self.content {
            Content::Text(text) => Some(text.clone()),
            Content::Parts(parts) => {
                let texts: Vec<&str> = parts.iter().filter_map(ContentPart::as_text).collect();
                if texts.is_empty() {
                    None
                } else {
                    Some(texts.join("\n"))
                }
            }
        }
    }

    /// Number of image parts.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.parts()
            .map_or(0, |parts| parts.iter().filter(|p| p.is_image()).count())
    }
}

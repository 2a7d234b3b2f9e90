//! Inline image encoding.
//!
//! Turns an image file into an [`ImagePayload`]: a MIME type plus the file's
//! bytes in standard base64, renderable as a `data:` URL that can be embedded
//! directly in a chat message.

use crate::error::{Error, Result};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// MIME type used when none can be inferred from the file name.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// An encoded image, ready to be placed in a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: String,
}

impl ImagePayload {
    /// Encode raw bytes with the given MIME type.
    #[must_use]
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64_STANDARD.encode(bytes),
        }
    }

    /// The MIME type of the image.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// The base64-encoded bytes.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Render as `data:<mime>;base64,<data>`.
    #[must_use]
    pub fn data_url(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Infer a MIME type from the file extension, falling back to
/// [`DEFAULT_MIME_TYPE`].
///
/// Uses the static `mime_guess` table, so the result does not depend on the
/// host platform's MIME database.
#[must_use]
pub fn guess_mime_type(path: impl AsRef<Path>) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(DEFAULT_MIME_TYPE)
}

/// Read and encode the image at `path`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `path` is not a regular file (checked before
/// any read), or [`Error::Read`] if reading it fails.
pub fn encode(path: impl AsRef<Path>) -> Result<ImagePayload> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Error::not_found(path));
    }

    let mime_type = guess_mime_type(path);
    let bytes = std::fs::read(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), mime_type, bytes = bytes.len(), "encoded image");
    Ok(ImagePayload::from_bytes(&bytes, mime_type))
}

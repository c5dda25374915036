//! Image payloads, data URLs and the identification request

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::validation::{validate_image_count, ValidationError};

/// One uploaded image: base64 text plus its declared media type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImagePayload {
    pub base64: String,
    #[serde(rename = "type")]
    pub media_type: String,
}

impl ImagePayload {
    pub fn new(base64: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            media_type: media_type.into(),
        }
    }
}

/// `data:<media type>;base64,<payload>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    media_type: String,
    base64: String,
}

impl DataUrl {
    pub fn new(media_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            media_type: media_type.into(),
            base64: base64.into(),
        }
    }

    /// Encode raw bytes under the given media type
    pub fn encode(bytes: &[u8], media_type: &str) -> Self {
        Self::new(media_type, STANDARD.encode(bytes))
    }

    /// Parse a base64 data URL. The media type runs up to the last `;base64,`.
    pub fn parse(url: &str) -> Option<Self> {
        let media_type = media_type_of(url)?;
        let base64 = url.split(',').nth(1)?;
        Some(Self::new(media_type, base64))
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// Decode the payload back to bytes
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(&self.base64)
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.media_type, self.base64)
    }
}

impl From<&ImagePayload> for DataUrl {
    fn from(payload: &ImagePayload) -> Self {
        DataUrl::new(payload.media_type.clone(), payload.base64.clone())
    }
}

impl From<DataUrl> for ImagePayload {
    fn from(url: DataUrl) -> Self {
        ImagePayload::new(url.base64, url.media_type)
    }
}

/// Media type declared by a data URL, if it has the `data:...;base64,` shape
pub fn media_type_of(url: &str) -> Option<&str> {
    let rest = url.strip_prefix("data:")?;
    let end = rest.rfind(";base64,")?;
    Some(&rest[..end])
}

/// A validated batch of one to four images, in upload order
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IdentificationRequest {
    images: Vec<ImagePayload>,
}

impl IdentificationRequest {
    pub fn new(images: Vec<ImagePayload>) -> Result<Self, ValidationError> {
        validate_image_count(images.len())?;
        Ok(Self { images })
    }

    pub fn images(&self) -> &[ImagePayload] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always false once constructed
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

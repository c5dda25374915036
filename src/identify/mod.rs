//! Server-side identification: request validation, prompt construction and forwarding

pub mod gateway;
pub mod payload;
pub mod validation;

pub use gateway::{IdentificationGateway, IdentificationResult};
pub use payload::{media_type_of, DataUrl, IdentificationRequest, ImagePayload};
pub use validation::{validate_image_count, ValidationError, MAX_IMAGES};

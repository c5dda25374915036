//! Image-count validation for inbound identification requests

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Maximum number of images per request
pub const MAX_IMAGES: usize = 4;

/// Validation errors, worded as the caller sees them
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No images provided")]
    NoImages,

    #[error("You can upload up to {max} images only")]
    TooManyImages { count: usize, max: usize },
}

/// Validate the number of images in a batch
pub fn validate_image_count(count: usize) -> Result<(), ValidationError> {
    if count == 0 {
        warn!("Validation failed: no images");
        return Err(ValidationError::NoImages);
    }

    if count > MAX_IMAGES {
        warn!("Validation failed: too many images ({} > {})", count, MAX_IMAGES);
        return Err(ValidationError::TooManyImages {
            count,
            max: MAX_IMAGES,
        });
    }

    debug!("Image count validation passed ({})", count);
    Ok(())
}

/// Locate the `images` array in a request body and check its length.
/// A missing field, a non-array value and an empty array are all "no images".
pub fn extract_images(body: &Value) -> Result<&[Value], ValidationError> {
    let images = match body.get("images") {
        Some(Value::Array(items)) if !items.is_empty() => items.as_slice(),
        _ => {
            warn!("Validation failed: images missing, not an array, or empty");
            return Err(ValidationError::NoImages);
        }
    };

    validate_image_count(images.len())?;
    Ok(images)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_count_boundaries() {
        assert_eq!(validate_image_count(0), Err(ValidationError::NoImages));
        for n in 1..=MAX_IMAGES {
            assert!(validate_image_count(n).is_ok());
        }
        assert!(validate_image_count(5).is_err());
    }

    #[test]
    fn test_messages() {
        assert_eq!(ValidationError::NoImages.to_string(), "No images provided");
        assert_eq!(
            validate_image_count(7).unwrap_err().to_string(),
            "You can upload up to 4 images only"
        );
    }

    #[test]
    fn test_extract_images_shapes() {
        assert_eq!(extract_images(&json!({})), Err(ValidationError::NoImages));
        assert_eq!(extract_images(&json!({"images": "nope"})), Err(ValidationError::NoImages));
        assert_eq!(extract_images(&json!({"images": []})), Err(ValidationError::NoImages));
        assert_eq!(extract_images(&json!([1, 2])), Err(ValidationError::NoImages));

        let body = json!({"images": [{}, {}]});
        assert_eq!(extract_images(&body).unwrap().len(), 2);

        let body = json!({"images": [{}, {}, {}, {}, {}]});
        assert!(matches!(extract_images(&body), Err(ValidationError::TooManyImages { count: 5, max: 4 })));
    }
}

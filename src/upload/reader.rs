//! Reading local image files into payloads

use futures::future::try_join_all;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::UploadError;
use crate::identify::{media_type_of, DataUrl, ImagePayload};

/// Media types the upload form offers in its file picker
pub const ACCEPTED_MEDIA_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/webp", "image/gif"];

/// Type reported when the extension is not recognised
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Media type a file reports for itself, derived from its extension
pub fn reported_media_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// Split a data URL into its base64 text and declared media type,
/// using `fallback_type` when the URL does not declare one.
pub fn split_data_url(url: &str, fallback_type: &str) -> ImagePayload {
    let base64 = url.split(',').nth(1).unwrap_or_default();
    let media_type = media_type_of(url).unwrap_or(fallback_type);
    ImagePayload::new(base64, media_type)
}

/// Read one file and turn it into a payload
pub async fn read_image(path: &Path) -> Result<ImagePayload, UploadError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| UploadError::FileRead {
            path: path.display().to_string(),
            source,
        })?;

    let reported = reported_media_type(path);
    if !ACCEPTED_MEDIA_TYPES.contains(&reported) {
        warn!(path = %path.display(), media_type = reported, "File type is not an accepted image type");
    }

    let data_url = DataUrl::encode(&bytes, reported).to_string();
    debug!(path = %path.display(), bytes = bytes.len(), "Encoded image");

    Ok(split_data_url(&data_url, reported))
}

/// Read all files concurrently; the first failure aborts the batch.
/// Output order matches input order.
pub async fn read_images<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ImagePayload>, UploadError> {
    try_join_all(paths.iter().map(|p| read_image(p.as_ref()))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_reported_media_type() {
        assert_eq!(reported_media_type(Path::new("a.PNG")), "image/png");
        assert_eq!(reported_media_type(Path::new("a.jpg")), "image/jpeg");
        assert_eq!(reported_media_type(Path::new("a.jpeg")), "image/jpeg");
        assert_eq!(reported_media_type(Path::new("a.webp")), "image/webp");
        assert_eq!(reported_media_type(Path::new("a.gif")), "image/gif");
        assert_eq!(reported_media_type(Path::new("notes.txt")), UNKNOWN_MEDIA_TYPE);
        assert_eq!(reported_media_type(Path::new("no_extension")), UNKNOWN_MEDIA_TYPE);
    }

    #[test]
    fn test_split_data_url_fallback() {
        let payload = split_data_url("data:image/png;base64,AAAA", "image/gif");
        assert_eq!(payload, ImagePayload::new("AAAA", "image/png"));

        let payload = split_data_url("garbage,BBBB", "image/gif");
        assert_eq!(payload, ImagePayload::new("BBBB", "image/gif"));
    }

    #[tokio::test]
    async fn test_read_image_round_trip() {
        let bytes = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0xff];
        let dir = tempfile::tempdir().unwrap();
        let path = temp_file(&dir, "photo.png", &bytes);

        let payload = read_image(&path).await.unwrap();
        assert_eq!(payload.media_type, "image/png");
        assert_eq!(DataUrl::from(&payload).decode().unwrap(), bytes);

        drop(dir);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_read_images_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let first = temp_file(&dir, "a.gif", b"first");
        let second = temp_file(&dir, "b.jpg", b"second");

        let payloads = read_images(&[first, second]).await.unwrap();
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].media_type, "image/gif");
        assert_eq!(payloads[1].media_type, "image/jpeg");
        assert_eq!(DataUrl::from(&payloads[1]).decode().unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_one_missing_file_fails_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let present = temp_file(&dir, "ok.png", b"ok");
        let missing = dir.path().join("missing.png");

        let err = read_images(&[present, missing]).await.unwrap_err();
        assert!(matches!(err, UploadError::FileRead { .. }));
    }
}

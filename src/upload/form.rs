//! Upload form state machine
//!
//! ```text
//! Idle ──select──▶ Ready ──submit──▶ Submitting ──▶ Succeeded | Failed
//!   ▲                ▲                                   │
//!   └────────────────┴────────── select ─────────────────┘
//! ```

use serde_json::Value;
use std::path::Path;
use tracing::{error, info};

use super::client::GatewayClient;
use super::reader::read_images;
use crate::error::UploadError;
use crate::identify::{IdentificationRequest, ImagePayload, MAX_IMAGES};

pub const TOO_MANY_FILES: &str = "You can upload up to 4 images.";
pub const NO_SELECTION: &str = "Please select at least one image.";
pub const READ_FAILURE: &str = "Error reading files.";
pub const GENERIC_SUBMIT_FAILURE: &str = "Error occurred";

/// Where the form is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Ready,
    Submitting,
    Succeeded,
    Failed,
}

/// Explicit state of the upload form
#[derive(Debug, Clone)]
pub struct UploadForm {
    images: Vec<ImagePayload>,
    phase: Phase,
    error: Option<String>,
    result: Option<String>,
}

impl UploadForm {
    pub fn new() -> Self {
        Self {
            images: Vec::new(),
            phase: Phase::Idle,
            error: None,
            result: None,
        }
    }

    pub fn images(&self) -> &[ImagePayload] {
        &self.images
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// User-visible error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Pretty-printed response body of the last successful submission
    pub fn result(&self) -> Option<&str> {
        self.result.as_deref()
    }

    /// The pending indicator
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Submitting
    }

    /// Stage a new selection. Either every file is staged or none is.
    pub async fn select_files<P: AsRef<Path>>(&mut self, paths: &[P]) {
        self.error = None;

        if paths.len() > MAX_IMAGES {
            self.error = Some(TOO_MANY_FILES.to_string());
            return;
        }

        match read_images(paths).await {
            Ok(images) => self.stage(images),
            Err(e) => {
                error!("Failed to read selected files: {}", e);
                self.error = Some(READ_FAILURE.to_string());
            }
        }
    }

    /// Replace the staged images with already-encoded payloads
    pub fn stage(&mut self, images: Vec<ImagePayload>) {
        self.images = images;
        if self.phase != Phase::Submitting {
            self.phase = if self.images.is_empty() { Phase::Idle } else { Phase::Ready };
        }
    }

    /// Enter `Submitting` and hand back the request to send
    pub fn begin_submit(&mut self) -> Result<IdentificationRequest, UploadError> {
        self.error = None;

        if self.images.is_empty() {
            self.error = Some(NO_SELECTION.to_string());
            return Err(UploadError::Validation(NO_SELECTION.to_string()));
        }

        if self.phase == Phase::Submitting {
            let err = UploadError::SubmissionInProgress;
            self.error = Some(err.to_string());
            return Err(err);
        }

        let request = IdentificationRequest::new(self.images.clone()).map_err(|e| {
            self.error = Some(e.to_string());
            UploadError::Validation(e.to_string())
        })?;

        self.phase = Phase::Submitting;
        self.result = None;
        Ok(request)
    }

    /// Leave `Submitting` with the outcome of the request
    pub fn finish_submit(&mut self, outcome: Result<Value, UploadError>) {
        match outcome {
            Ok(body) => {
                let text = serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string());
                self.result = Some(text);
                self.phase = Phase::Succeeded;
            }
            Err(e) => {
                error!("Submission failed: {}", e);
                let message = e.to_string();
                self.error = Some(if message.is_empty() {
                    GENERIC_SUBMIT_FAILURE.to_string()
                } else {
                    message
                });
                self.phase = Phase::Failed;
            }
        }
    }

    /// Submit the staged images through `client`
    pub async fn submit(&mut self, client: &GatewayClient) {
        let request = match self.begin_submit() {
            Ok(request) => request,
            Err(_) => return,
        };

        info!(images = request.len(), "Submitting images for identification");
        let outcome = client.identify(&request).await;
        self.finish_submit(outcome);
    }
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn image() -> ImagePayload {
        ImagePayload::new("AAAA", "image/png")
    }

    #[tokio::test]
    async fn test_too_many_files_keeps_previous_selection() {
        let mut form = UploadForm::new();
        form.stage(vec![image()]);

        let paths = ["a.png", "b.png", "c.png", "d.png", "e.png"];
        form.select_files(&paths).await;

        assert_eq!(form.error(), Some(TOO_MANY_FILES));
        assert_eq!(form.images().len(), 1);
        assert_eq!(form.phase(), Phase::Ready);
    }

    #[tokio::test]
    async fn test_unreadable_file_stages_nothing() {
        let mut form = UploadForm::new();
        form.select_files(&["/definitely/not/here.png"]).await;

        assert_eq!(form.error(), Some(READ_FAILURE));
        assert!(form.images().is_empty());
        assert_eq!(form.phase(), Phase::Idle);
    }

    #[test]
    fn test_submit_without_images_is_blocked() {
        let mut form = UploadForm::new();

        assert!(matches!(form.begin_submit(), Err(UploadError::Validation(_))));
        assert_eq!(form.error(), Some(NO_SELECTION));
        assert!(!form.is_loading());
    }

    #[test]
    fn test_second_submit_is_rejected_while_pending() {
        let mut form = UploadForm::new();
        form.stage(vec![image()]);

        let request = form.begin_submit().unwrap();
        assert_eq!(request.len(), 1);
        assert!(form.is_loading());

        assert!(matches!(form.begin_submit(), Err(UploadError::SubmissionInProgress)));
        assert_eq!(form.error(), Some("A submission is already in progress."));
        assert!(form.is_loading());
    }

    #[test]
    fn test_success_pretty_prints_body() {
        let mut form = UploadForm::new();
        form.stage(vec![image()]);
        form.begin_submit().unwrap();

        form.finish_submit(Ok(json!({"result": {"index": 0}})));

        assert_eq!(form.phase(), Phase::Succeeded);
        assert!(!form.is_loading());
        assert_eq!(form.result(), Some("{\n  \"result\": {\n    \"index\": 0\n  }\n}"));
        assert_eq!(form.error(), None);
    }

    #[test]
    fn test_failure_surfaces_message_and_clears_loading() {
        let mut form = UploadForm::new();
        form.stage(vec![image()]);
        form.begin_submit().unwrap();

        form.finish_submit(Err(UploadError::Status {
            status: 400,
            message: "You can upload up to 4 images only".to_string(),
        }));

        assert_eq!(form.phase(), Phase::Failed);
        assert!(!form.is_loading());
        assert_eq!(form.error(), Some("You can upload up to 4 images only"));
    }

    #[test]
    fn test_new_selection_restarts_cycle() {
        let mut form = UploadForm::new();
        form.stage(vec![image()]);
        form.begin_submit().unwrap();
        form.finish_submit(Ok(json!({})));

        form.stage(vec![image(), image()]);
        assert_eq!(form.phase(), Phase::Ready);
        assert!(form.begin_submit().is_ok());
        assert_eq!(form.result(), None);
    }
}

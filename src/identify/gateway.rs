//! The identification gateway: validate, build the prompt, call upstream once

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::payload::{DataUrl, IdentificationRequest, ImagePayload};
use super::validation::extract_images;
use crate::completion::{ChatCompletionRequest, ChatMessage, CompletionProvider, ContentPart, Role};
use crate::config::CompletionConfig;
use crate::error::{GatewayError, Result};
use crate::observability::MetricsCollector;

/// Success body: the upstream's first choice, untouched. Omitted when there is none.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IdentificationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

/// Stateless gateway between HTTP callers and the completion provider
pub struct IdentificationGateway {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    store: bool,
    instruction: String,
    metrics: Arc<MetricsCollector>,
}

impl IdentificationGateway {
    pub fn new(
        config: &CompletionConfig,
        provider: Arc<dyn CompletionProvider>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            store: config.store,
            instruction: config.instruction.clone(),
            metrics,
        }
    }

    /// Decode a raw request body into a validated request
    pub fn parse_request(body: &[u8]) -> Result<IdentificationRequest> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| GatewayError::MalformedBody(e.to_string()))?;

        let images = extract_images(&value)?
            .iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<ImagePayload>(item.clone()).map_err(|e| {
                    GatewayError::MalformedBody(format!("Invalid image at position {}: {}", index, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(IdentificationRequest::new(images)?)
    }

    /// One user message: the instruction, then every image in upload order
    pub fn build_prompt(&self, request: &IdentificationRequest) -> ChatCompletionRequest {
        let mut content = Vec::with_capacity(request.len() + 1);
        content.push(ContentPart::text(self.instruction.clone()));
        content.extend(
            request
                .images()
                .iter()
                .map(|image| ContentPart::image(&DataUrl::from(image))),
        );

        ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: Role::User,
                content,
            }],
            store: self.store,
        }
    }

    /// Forward a validated request and extract the first choice
    pub async fn identify(&self, request: IdentificationRequest) -> Result<IdentificationResult> {
        let prompt = self.build_prompt(&request);
        debug!(model = %prompt.model, images = request.len(), "Forwarding to completion API");

        let started = Instant::now();
        let outcome = self.provider.complete(&prompt).await;
        self.metrics.record_upstream_latency(started.elapsed());

        let response = outcome.map_err(|e| {
            self.metrics.record_upstream_failure();
            error!(error = %e, "Error calling completion API");
            e
        })?;

        Ok(IdentificationResult {
            result: response.into_first_choice(),
        })
    }

    /// Parse, validate and forward a raw request body
    pub async fn identify_body(&self, body: &[u8]) -> Result<IdentificationResult> {
        let request = Self::parse_request(body)?;
        info!(images = request.len(), "Identification request accepted");
        self.identify(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ChatCompletionResponse;
    use crate::error::CompletionError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every prompt and answers with a canned outcome
    struct RecordingProvider {
        calls: Mutex<Vec<ChatCompletionRequest>>,
        fail_with: Option<String>,
    }

    impl RecordingProvider {
        fn ok() -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_with: None }
        }

        fn failing(message: &str) -> Self {
            Self { calls: Mutex::new(Vec::new()), fail_with: Some(message.to_string()) }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CompletionProvider for RecordingProvider {
        async fn complete(&self, request: &ChatCompletionRequest) -> Result<ChatCompletionResponse> {
            self.calls.lock().unwrap().push(request.clone());
            match &self.fail_with {
                Some(message) => Err(CompletionError::Api { status: 429, message: message.clone() }.into()),
                None => Ok(serde_json::from_value(json!({
                    "choices": [{"index": 0, "message": {"role": "assistant", "content": "1. Bananas"}}]
                }))
                .map_err(CompletionError::from)?),
            }
        }

        fn has_credential(&self) -> bool {
            true
        }
    }

    fn gateway(provider: Arc<RecordingProvider>) -> IdentificationGateway {
        IdentificationGateway::new(&CompletionConfig::default(), provider, Arc::new(MetricsCollector::new()))
    }

    #[test]
    fn test_prompt_layout() {
        let gateway = gateway(Arc::new(RecordingProvider::ok()));
        let request = IdentificationRequest::new(vec![
            ImagePayload::new("AAAA", "image/png"),
            ImagePayload::new("BBBB", "image/jpeg"),
        ])
        .unwrap();

        let prompt = gateway.build_prompt(&request);
        assert_eq!(prompt.model, "o1");
        assert!(prompt.store);
        assert_eq!(prompt.messages.len(), 1);

        let content = &prompt.messages[0].content;
        assert_eq!(content.len(), 3);
        assert_eq!(content[0], ContentPart::text("Identify all grocery items in these images and return a list."));
        assert_eq!(content[1], ContentPart::image(&DataUrl::new("image/png", "AAAA")));
        assert_eq!(content[2], ContentPart::image(&DataUrl::new("image/jpeg", "BBBB")));
    }

    #[test]
    fn test_parse_request_errors() {
        assert!(matches!(
            IdentificationGateway::parse_request(b"not json"),
            Err(GatewayError::MalformedBody(_))
        ));
        assert!(matches!(
            IdentificationGateway::parse_request(br#"{"images": []}"#),
            Err(GatewayError::InvalidInput(_))
        ));
        assert!(matches!(
            IdentificationGateway::parse_request(br#"{"images": [{"base64": 1}]}"#),
            Err(GatewayError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_identify_returns_first_choice() {
        let provider = Arc::new(RecordingProvider::ok());
        let gateway = gateway(provider.clone());

        let result = gateway
            .identify_body(br#"{"images":[{"base64":"iVBORw0","type":"image/png"}]}"#)
            .await
            .unwrap();

        assert_eq!(result.result.unwrap()["message"]["content"], "1. Bananas");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_input_never_calls_upstream() {
        let provider = Arc::new(RecordingProvider::ok());
        let gateway = gateway(provider.clone());

        let five: Vec<_> = (0..5).map(|_| json!({"base64": "AAAA", "type": "image/png"})).collect();
        let body = serde_json::to_vec(&json!({ "images": five })).unwrap();

        let err = gateway.identify_body(&body).await.unwrap_err();
        assert_eq!(err.to_string(), "You can upload up to 4 images only");
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_counted() {
        let provider = Arc::new(RecordingProvider::failing("rate limit exceeded"));
        let metrics = Arc::new(MetricsCollector::new());
        let gateway = IdentificationGateway::new(&CompletionConfig::default(), provider, metrics.clone());

        let err = gateway
            .identify_body(br#"{"images":[{"base64":"AAAA","type":"image/gif"}]}"#)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "rate limit exceeded");
        assert_eq!(metrics.get_metrics().upstream_failures, 1);
    }

    #[test]
    fn test_missing_choice_serializes_to_empty_object() {
        let empty = IdentificationResult { result: None };
        assert_eq!(serde_json::to_value(&empty).unwrap(), json!({}));

        let found = IdentificationResult { result: Some(json!({"index": 0})) };
        assert_eq!(serde_json::to_value(&found).unwrap(), json!({"result": {"index": 0}}));
    }
}

//! HTTP client for the identify endpoint

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::UploadError;
use crate::identify::IdentificationRequest;

/// Message used when a failed response carries no `error` field
pub const GENERIC_FAILURE: &str = "Something went wrong";

/// Path of the identify endpoint relative to the server root
pub const IDENTIFY_PATH: &str = "/api/identify";

/// Client for a running grocery identifier server
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    http_client: Client,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http_client(base_url, Client::new())
    }

    /// Create client with custom HTTP client
    pub fn with_http_client(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, IDENTIFY_PATH)
    }

    /// Send one identification request and return the whole response body
    pub async fn identify(&self, request: &IdentificationRequest) -> Result<Value, UploadError> {
        debug!(images = request.len(), endpoint = %self.endpoint(), "Submitting images");

        let response = self.http_client
            .post(self.endpoint())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());

            return Err(UploadError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}

/// Non-empty `error` string of a failure body
fn error_message(body: &Value) -> Option<String> {
    body.get("error")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identify::ImagePayload;
    use mockito::Matcher;
    use serde_json::json;

    fn one_image() -> IdentificationRequest {
        IdentificationRequest::new(vec![ImagePayload::new("AAAA", "image/png")]).unwrap()
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GatewayClient::new("http://localhost:3000/");
        assert_eq!(client.endpoint(), "http://localhost:3000/api/identify");
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(error_message(&json!({"error": "boom"})), Some("boom".to_string()));
        assert_eq!(error_message(&json!({"error": ""})), None);
        assert_eq!(error_message(&json!({"error": 3})), None);
        assert_eq!(error_message(&json!({})), None);
    }

    #[tokio::test]
    async fn test_success_returns_whole_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", IDENTIFY_PATH)
            .match_body(Matcher::Json(json!({"images": [{"base64": "AAAA", "type": "image/png"}]})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"result":{"index":0}}"#)
            .create_async()
            .await;

        let body = GatewayClient::new(server.url()).identify(&one_image()).await.unwrap();
        assert_eq!(body, json!({"result": {"index": 0}}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_failure_without_error_field_uses_generic_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", IDENTIFY_PATH)
            .with_status(502)
            .with_body("upstream down")
            .create_async()
            .await;

        let err = GatewayClient::new(server.url()).identify(&one_image()).await.unwrap_err();
        assert!(matches!(err, UploadError::Status { status: 502, .. }));
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[tokio::test]
    async fn test_oversized_body_error_is_shown() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", IDENTIFY_PATH)
            .with_status(413)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"Failed to buffer the request body: length limit exceeded"}"#)
            .create_async()
            .await;

        let err = GatewayClient::new(server.url()).identify(&one_image()).await.unwrap_err();
        assert!(matches!(err, UploadError::Status { status: 413, .. }));
        assert_eq!(err.to_string(), "Failed to buffer the request body: length limit exceeded");
    }
}

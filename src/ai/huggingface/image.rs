use crate::ai::{mime, ImageGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message used when the provider gives no usable error detail.
pub const GENERIC_FAILURE: &str = "Image generation failed.";

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    /// Block until a cold model is loaded instead of failing with 503.
    wait_for_model: bool,
}

#[derive(Debug, Deserialize)]
struct InferenceError {
    error: Option<serde_json::Value>,
}

pub struct HuggingFaceImageClient {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl HuggingFaceImageClient {
    pub fn new(api_key: String, endpoint: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, endpoint, timeout, Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        endpoint: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            endpoint,
            timeout,
        }
    }

    /// Pull the `error` field out of a failed response body, if it has one.
    fn extract_error_message(body: &[u8]) -> Option<String> {
        let parsed: InferenceError = serde_json::from_slice(body).ok()?;
        match parsed.error? {
            serde_json::Value::String(message) if !message.trim().is_empty() => Some(message),
            serde_json::Value::Array(items) => {
                let joined = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .collect::<Vec<_>>()
                    .join("; ");
                (!joined.is_empty()).then_some(joined)
            }
            _ => None,
        }
    }

    fn transport_error(err: reqwest::Error) -> Error {
        if err.is_timeout() {
            return Error::from(err);
        }
        tracing::error!("Failed to reach image endpoint: {}", err);
        Error::ImageProvider(GENERIC_FAILURE.to_string())
    }
}

#[async_trait]
impl ImageGenerationService for HuggingFaceImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!("Sending image generation request to {}", self.endpoint);

        let request = InferenceRequest {
            inputs: prompt,
            options: InferenceOptions {
                wait_for_model: true,
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(Self::transport_error)?;

        if !status.is_success() {
            let message = Self::extract_error_message(&body)
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            tracing::error!(
                "Image API error (status {}): {}",
                status,
                String::from_utf8_lossy(&body)
            );
            return Err(Error::ImageProvider(message));
        }

        if body.is_empty() {
            tracing::error!("Image API returned an empty body (status {})", status);
            return Err(Error::ImageProvider(GENERIC_FAILURE.to_string()));
        }

        tracing::debug!(
            "Image API returned {} bytes ({})",
            body.len(),
            mime::detect_image_mime(&body)
        );

        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00];

    fn make_client(server: &MockServer) -> HuggingFaceImageClient {
        HuggingFaceImageClient::new(
            "hf-key".to_string(),
            format!("{}/models/sd", server.uri()),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_generate_image_returns_raw_bytes() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/models/sd"))
            .and(header("authorization", "Bearer hf-key"))
            .and(body_json(serde_json::json!({
                "inputs": "a castle in fog",
                "options": { "wait_for_model": true }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(PNG_BYTES.to_vec(), "image/png"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let bytes = make_client(&server)
            .generate_image("a castle in fog")
            .await
            .unwrap();
        assert_eq!(bytes, PNG_BYTES);
    }

    #[tokio::test]
    async fn test_error_field_becomes_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Input is too long"
            })))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::ImageProvider(msg) if msg == "Input is too long"));
    }

    #[tokio::test]
    async fn test_non_json_error_uses_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::ImageProvider(msg) if msg == GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn test_empty_success_body_is_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::ImageProvider(msg) if msg == GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn test_json_without_error_field_uses_generic_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "detail": "something"
            })))
            .mount(&server)
            .await;

        let err = make_client(&server).generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::ImageProvider(msg) if msg == GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_uses_generic_message() {
        let client = HuggingFaceImageClient::new(
            "hf-key".to_string(),
            "http://127.0.0.1:1/models/sd".to_string(),
            Duration::from_secs(5),
        );

        let err = client.generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::ImageProvider(msg) if msg == GENERIC_FAILURE));
    }

    #[tokio::test]
    async fn test_slow_upstream_returns_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(PNG_BYTES.to_vec(), "image/png")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = HuggingFaceImageClient::new(
            "hf-key".to_string(),
            format!("{}/models/sd", server.uri()),
            Duration::from_millis(50),
        );

        let err = client.generate_image("x").await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }

    #[test]
    fn test_extract_error_message_joins_list() {
        let body = br#"{"error": ["first", "second"]}"#;
        assert_eq!(
            HuggingFaceImageClient::extract_error_message(body).as_deref(),
            Some("first; second")
        );
    }
}

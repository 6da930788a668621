use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::config::MAX_SCENE_CHARS;

pub const PROMPT_FAILURE_MESSAGE: &str = "Failed to generate prompt";

/// HTTP-level error for the generation handlers.
///
/// Every variant renders as `{ "error": <message>, "code": <CODE> }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Scene description is too long. Maximum length is {max} characters.")]
    PayloadTooLarge { max: usize },

    /// Text generation failed; the cause is logged, never returned.
    #[error("Prompt generation failed: {0}")]
    PromptGeneration(crate::Error),

    /// Image generation failed with a caller-safe message.
    #[error("{0}")]
    ImageGeneration(String),

    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// The request body was rejected before reaching the handler.
    ///
    /// Keeps the rejection's own status (413 over the body limit, 415 for
    /// a non-form content type, 422 for a missing or undecodable field).
    #[error("Rejected request ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn scene_too_long() -> Self {
        ApiError::PayloadTooLarge {
            max: MAX_SCENE_CHARS,
        }
    }

    /// Classify a rejected `/generate-prompt` body.
    ///
    /// A body over the framework limit is necessarily over the scene limit.
    pub fn from_scene_rejection(rejection: FormRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::scene_too_long()
        } else {
            rejection.into()
        }
    }

    /// Classify a failure from the prompt synthesizer.
    pub fn from_prompt_error(err: crate::Error) -> Self {
        match err {
            crate::Error::Timeout(msg) => ApiError::Timeout(msg),
            other => ApiError::PromptGeneration(other),
        }
    }

    /// Classify a failure from the image renderer or the image store.
    pub fn from_image_error(err: crate::Error) -> Self {
        match err {
            crate::Error::Timeout(msg) => ApiError::Timeout(msg),
            crate::Error::ImageProvider(msg) => ApiError::ImageGeneration(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::PayloadTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                self.to_string(),
            ),
            ApiError::PromptGeneration(cause) => {
                tracing::error!(error = %cause, "Error generating prompt");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PROMPT_GENERATION_FAILED",
                    PROMPT_FAILURE_MESSAGE.to_string(),
                )
            }
            ApiError::ImageGeneration(msg) => {
                tracing::error!(error = %msg, "Error during image generation");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "IMAGE_GENERATION_FAILED",
                    msg.clone(),
                )
            }
            ApiError::Timeout(msg) => {
                tracing::warn!(error = %msg, "Upstream timed out");
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "UPSTREAM_TIMEOUT",
                    "The generation service did not respond in time".to_string(),
                )
            }
            ApiError::Rejected { status, message } => {
                let code = match *status {
                    StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
                    StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
                    _ => "INVALID_FORM",
                };
                (*status, code, message.clone())
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_payload_too_large_names_limit() {
        let (status, body) = render(ApiError::scene_too_long()).await;

        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["error"].as_str().unwrap().contains("4000"));
    }

    #[tokio::test]
    async fn test_prompt_failure_hides_cause() {
        let err = ApiError::from_prompt_error(crate::Error::AiProvider(
            "Gemini API error (status 403): key=secret".to_string(),
        ));
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], PROMPT_FAILURE_MESSAGE);
        assert!(!body.to_string().contains("secret"));
    }

    #[tokio::test]
    async fn test_image_failure_keeps_provider_message() {
        let err = ApiError::from_image_error(crate::Error::ImageProvider(
            "Model too busy".to_string(),
        ));
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Model too busy");
        assert_eq!(body["code"], "IMAGE_GENERATION_FAILED");
    }

    #[tokio::test]
    async fn test_timeouts_map_to_gateway_timeout() {
        for err in [
            ApiError::from_prompt_error(crate::Error::Timeout("t".to_string())),
            ApiError::from_image_error(crate::Error::Timeout("t".to_string())),
        ] {
            let (status, body) = render(err).await;
            assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
            assert_eq!(body["code"], "UPSTREAM_TIMEOUT");
        }
    }

    #[tokio::test]
    async fn test_rejection_keeps_its_status() {
        let err = ApiError::Rejected {
            status: StatusCode::UNSUPPORTED_MEDIA_TYPE,
            message: "Expected request with `Content-Type: application/x-www-form-urlencoded`"
                .to_string(),
        };
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_store_failure_is_sanitized() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/secret/path");
        let (status, body) = render(ApiError::from_image_error(io.into())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "INTERNAL_ERROR");
        assert!(!body.to_string().contains("/secret/path"));
    }
}

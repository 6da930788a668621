//! Prompt synthesis and image rendering handlers.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Form, Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::config::MAX_SCENE_CHARS;

#[derive(Debug, Deserialize)]
pub struct SceneForm {
    pub scene: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PromptResponse {
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct PromptForm {
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImageResponse {
    pub image_path: String,
}

/// POST /generate-prompt
async fn generate_prompt(
    State(state): State<AppState>,
    form: Result<Form<SceneForm>, FormRejection>,
) -> ApiResult<Json<PromptResponse>> {
    let Form(form) = form.map_err(ApiError::from_scene_rejection)?;
    let length = form.scene.chars().count();
    tracing::info!(length, "Received scene for prompt generation");

    if length > MAX_SCENE_CHARS {
        return Err(ApiError::scene_too_long());
    }
    tracing::debug!(scene = %form.scene, "Scene accepted");

    let prompt = state
        .prompts
        .generate_prompt(&form.scene)
        .await
        .map_err(ApiError::from_prompt_error)?;

    tracing::debug!(%prompt, "Generated prompt");
    Ok(Json(PromptResponse { prompt }))
}

/// POST /generate-image
async fn generate_image(
    State(state): State<AppState>,
    form: Result<Form<PromptForm>, FormRejection>,
) -> ApiResult<Json<ImageResponse>> {
    let Form(form) = form?;
    tracing::info!(
        length = form.prompt.chars().count(),
        "Received prompt for image generation"
    );

    let bytes = state
        .images
        .generate_image(&form.prompt)
        .await
        .map_err(ApiError::from_image_error)?;

    let stored = state
        .store
        .save(&bytes)
        .await
        .map_err(ApiError::from_image_error)?;

    Ok(Json(ImageResponse {
        image_path: stored.public_path,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate-prompt", post(generate_prompt))
        .route("/generate-image", post(generate_image))
}

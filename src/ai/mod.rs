//! AI service integration for prompt and image generation
//!
//! Gemini turns a scene description into a text-to-image prompt; the
//! Hugging Face Inference API renders that prompt into image bytes.

pub mod gemini;
pub mod huggingface;
pub mod mime;
pub mod mock;

pub use gemini::GeminiChatClient;
pub use huggingface::HuggingFaceImageClient;
pub use mock::{MockImageGenerationClient, MockPromptClient};

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PromptService: Send + Sync {
    /// Turn a scene description into a prompt for a text-to-image model.
    async fn generate_prompt(&self, scene: &str) -> Result<String>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Render a prompt into raw image bytes.
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}

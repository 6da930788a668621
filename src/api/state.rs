use std::sync::Arc;

use crate::ai::{ImageGenerationService, PromptService};
use crate::storage::ImageStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything inside is behind `Arc` and immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub prompts: Arc<dyn PromptService>,
    pub images: Arc<dyn ImageGenerationService>,
    pub store: Arc<ImageStore>,
}

impl AppState {
    pub fn new(
        prompts: Arc<dyn PromptService>,
        images: Arc<dyn ImageGenerationService>,
        store: ImageStore,
    ) -> Self {
        Self {
            prompts,
            images,
            store: Arc::new(store),
        }
    }
}

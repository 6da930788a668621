use super::{ImageGenerationService, PromptService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted response for a mock call.
#[derive(Debug, Clone)]
enum Scripted<T> {
    Ok(T),
    ProviderError(String),
    Timeout,
}

/// A tiny valid 1x1 PNG.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49,
    0x44, 0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2,
    0x25, 0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Records every scene it receives; cycles through scripted responses.
pub struct MockPromptClient {
    responses: Arc<Mutex<Vec<Scripted<String>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockPromptClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_prompt_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(Scripted::Ok(response));
        self
    }

    pub fn with_error(self, message: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::ProviderError(message));
        self
    }

    pub fn with_timeout(self) -> Self {
        self.responses.lock().unwrap().push(Scripted::Timeout);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn received_scenes(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockPromptClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PromptService for MockPromptClient {
    async fn generate_prompt(&self, scene: &str) -> Result<String> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(scene.to_string());
            calls.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(format!("A detailed illustration of: {}", scene));
        }

        match &responses[(count - 1) % responses.len()] {
            Scripted::Ok(prompt) => Ok(prompt.clone()),
            Scripted::ProviderError(message) => Err(Error::AiProvider(message.clone())),
            Scripted::Timeout => Err(Error::Timeout("mock prompt timeout".to_string())),
        }
    }
}

/// Records every prompt it receives; returns [`TINY_PNG`] unless scripted.
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<Scripted<Vec<u8>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(Scripted::Ok(response));
        self
    }

    pub fn with_error(self, message: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::ProviderError(message));
        self
    }

    pub fn with_timeout(self) -> Self {
        self.responses.lock().unwrap().push(Scripted::Timeout);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn received_prompts(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(prompt.to_string());
            calls.len()
        };

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Ok(TINY_PNG.to_vec());
        }

        match &responses[(count - 1) % responses.len()] {
            Scripted::Ok(bytes) => Ok(bytes.clone()),
            Scripted::ProviderError(message) => Err(Error::ImageProvider(message.clone())),
            Scripted::Timeout => Err(Error::Timeout("mock image timeout".to_string())),
        }
    }
}

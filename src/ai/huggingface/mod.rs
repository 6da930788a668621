//! Hugging Face Inference API text-to-image client.

pub mod image;

pub use image::HuggingFaceImageClient;

//! Web backend that illustrates book scenes.
//!
//! A scene description is turned into a text-to-image prompt by Gemini, and
//! the prompt is rendered by a Hugging Face hosted model into an image file
//! served from the static directory.

pub mod ai;
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod prompts;
pub mod storage;

pub use error::{Error, Result};

//! Process configuration, read once at startup.

use crate::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_IMAGE_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/stabilityai/stable-diffusion-3.5-large";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 60;

/// Longest scene description accepted by `/generate-prompt`, in characters.
pub const MAX_SCENE_CHARS: usize = 4000;

#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub huggingface_api_key: String,
    pub image_endpoint: String,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub upstream_timeout: Duration,
    /// `None` keeps generated images forever.
    pub image_retention: Option<Duration>,
}

impl Config {
    /// Load configuration from the environment (and `.env` if present).
    ///
    /// | Env Var                     | Default                          |
    /// |-----------------------------|----------------------------------|
    /// | `GEMINI_API_KEY`            | required                         |
    /// | `GEMINI_MODEL_NAME`         | `gemini-1.5-flash`               |
    /// | `HUGGINGFACE_API_KEY`       | required                         |
    /// | `STABLE_DIFFUSION_ENDPOINT` | Stable Diffusion 3.5 large       |
    /// | `HOST`                      | `0.0.0.0`                        |
    /// | `PORT`                      | `8080`                           |
    /// | `STATIC_DIR`                | `static`                         |
    /// | `UPSTREAM_TIMEOUT_SECS`     | `60`                             |
    /// | `IMAGE_RETENTION_SECS`      | unset                            |
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };

        let image_retention = match parse_var::<u64, _>(&lookup, "IMAGE_RETENTION_SECS")? {
            Some(0) => {
                return Err(Error::Config(
                    "IMAGE_RETENTION_SECS must be greater than 0".to_string(),
                ))
            }
            secs => secs.map(Duration::from_secs),
        };

        Ok(Self {
            gemini_api_key: required("GEMINI_API_KEY")?,
            gemini_model: lookup("GEMINI_MODEL_NAME")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            huggingface_api_key: required("HUGGINGFACE_API_KEY")?,
            image_endpoint: lookup("STABLE_DIFFUSION_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_IMAGE_ENDPOINT.to_string()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_var(&lookup, "PORT")?.unwrap_or(DEFAULT_PORT),
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            upstream_timeout: Duration::from_secs(
                parse_var(&lookup, "UPSTREAM_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS),
            ),
            image_retention,
        })
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", key, raw, e))),
    }
}

//! Application wiring: build services from configuration and serve them.

use crate::ai::{
    GeminiChatClient, HuggingFaceImageClient, ImageGenerationService, PromptService,
};
use crate::api::{build_app_router, AppState};
use crate::config::Config;
use crate::storage::{spawn_retention_sweeper, ImageStore};
use crate::Result;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

/// Owns the configured services and the HTTP server lifecycle.
pub struct App {
    config: Config,
    state: AppState,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub prompts: Arc<dyn PromptService>,
    pub images: Arc<dyn ImageGenerationService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, config: Config) -> Result<Self> {
        let store = ImageStore::new(&config.static_dir)?;
        let state = AppState::new(services.prompts, services.images, store);
        Ok(Self { config, state })
    }

    /// Build the Gemini and Hugging Face clients described by `config`.
    pub fn new(config: Config) -> Result<Self> {
        // One connection pool shared by both providers.
        let http_client = reqwest::Client::new();

        info!(
            "Prompt provider: Gemini (model: {}), timeout {:?}",
            config.gemini_model, config.upstream_timeout
        );
        let prompts = GeminiChatClient::new_with_client(
            config.gemini_api_key.clone(),
            config.gemini_model.clone(),
            config.upstream_timeout,
            http_client.clone(),
        );

        info!("Image provider: {}", config.image_endpoint);
        let images = HuggingFaceImageClient::new_with_client(
            config.huggingface_api_key.clone(),
            config.image_endpoint.clone(),
            config.upstream_timeout,
            http_client,
        );

        Self::with_services(
            AppServices {
                prompts: Arc::new(prompts),
                images: Arc::new(images),
            },
            config,
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn router(&self) -> Router {
        build_app_router(self.state.clone(), &self.config.static_dir)
    }

    /// Bind and serve until SIGINT/SIGTERM.
    pub async fn run(self) -> anyhow::Result<()> {
        let sweeper = self
            .config
            .image_retention
            .map(|retention| spawn_retention_sweeper((*self.state.store).clone(), retention));

        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "Starting server");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        if let Some(handle) = sweeper {
            handle.abort();
        }
        info!("Server stopped");
        Ok(())
    }
}

/// Wait for Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received SIGINT, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn test_config(static_dir: PathBuf) -> Config {
        Config {
            gemini_api_key: "gemini-key".to_string(),
            gemini_model: "models/gemini-1.5-flash".to_string(),
            huggingface_api_key: "hf-key".to_string(),
            image_endpoint: "http://127.0.0.1:1/sd".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir,
            upstream_timeout: Duration::from_secs(1),
            image_retention: None,
        }
    }

    #[test]
    fn test_new_creates_image_directory() {
        let dir = tempfile::tempdir().unwrap();
        let static_dir = dir.path().join("static");

        let app = App::new(test_config(static_dir.clone())).unwrap();

        assert!(static_dir.join("images").is_dir());
        assert_eq!(app.config().static_dir, static_dir);
    }
}

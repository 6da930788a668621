//! Shared application router builder.
//!
//! Used by both the binary and the integration tests so they exercise the
//! same middleware stack.

use std::any::Any;
use std::path::Path;

use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::api::error::ApiError;
use crate::api::routes;
use crate::api::state::AppState;
use crate::storage::STATIC_URL_PREFIX;

/// Build the full application [`Router`].
///
/// `static_root` is served under `/static`, which is where generated image
/// paths point.
pub fn build_app_router(state: AppState, static_root: &Path) -> Router {
    Router::new()
        .merge(routes::index::router())
        .merge(routes::health::router())
        .merge(routes::generate::router())
        .nest_service(
            &format!("/{}", STATIC_URL_PREFIX),
            ServeDir::new(static_root),
        )
        // -- Middleware stack (applied bottom-up) --
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Keep panics inside the shared error envelope.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}

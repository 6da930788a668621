//! HTTP surface: routes, shared state, and the error envelope.

pub mod error;
pub mod router;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use router::build_app_router;
pub use state::AppState;

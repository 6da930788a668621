use axum::response::Html;
use axum::{routing::get, Router};

use crate::api::state::AppState;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

use axum::Router;
use tower_http::services::ServeFile;

use crate::state::AppState;

/// Static API reference at `/docs/html`.
pub fn router(docs_path: &str) -> Router<AppState> {
    Router::new().route_service("/docs/html", ServeFile::new(docs_path))
}

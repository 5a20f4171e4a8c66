//! Health check HTTP handler.

use axum::response::IntoResponse;

use crate::web::responses::ok;

/// Liveness endpoint. The service has no external state to probe, so
/// answering at all means healthy.
pub async fn health_check() -> impl IntoResponse {
    ok(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

//! Route handlers.

pub mod health;
pub mod pages;
pub mod verify_news;

use axum::{
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// CORS preflight answer, identical for every path.
pub async fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
        ],
    )
        .into_response()
}

/// Unknown paths: preflight for `OPTIONS`, 404 otherwise.
pub async fn fallback(method: Method) -> Response {
    if method == Method::OPTIONS {
        return preflight().await;
    }
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response()
}

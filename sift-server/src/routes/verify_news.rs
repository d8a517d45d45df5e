//! JSON endpoint consumed by the browser front-end.

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::error::ApiError;
use crate::state::AppState;

/// `/api/verify-news`, all methods.
pub async fn verify_news(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response, ApiError> {
    if method == Method::OPTIONS {
        return Ok(super::preflight().await);
    }
    if method != Method::POST {
        return Err(ApiError::MethodNotAllowed);
    }

    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "request body is not JSON");
        ApiError::InvalidJson
    })?;
    // Non-string values count as missing.
    let field = |name: &str| payload.get(name).and_then(Value::as_str);

    let extraction = state
        .analyzer
        .analyze(field("content"), field("source"))
        .await?;

    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(extraction),
    )
        .into_response())
}

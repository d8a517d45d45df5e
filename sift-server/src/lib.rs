//! SIFT Checker web server
//!
//! Axum-based server exposing the JSON verification API and a small
//! server-rendered front-end.

pub mod error;
pub mod routes;
pub mod samples;
pub mod state;
pub mod views;

use axum::{
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use std::any::Any;
use std::net::SocketAddr;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use error::ApiError;
pub use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::pages::index).options(routes::preflight))
        .route("/check", post(routes::pages::check).options(routes::preflight))
        .route("/health", get(routes::health::health).options(routes::preflight))
        .route("/api/verify-news", any(routes::verify_news::verify_news))
        .fallback(routes::fallback)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    ApiError::Internal(message).into_response()
}

/// Run the web server until Ctrl-C.
pub async fn run_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("SIFT checker listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

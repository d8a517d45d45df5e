//! Server-rendered form and result pages.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    Form,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::samples::{self, SAMPLES};
use crate::state::AppState;
use crate::views::{render, ErrorTemplate, IndexTemplate, ResultTemplate, ResultView, SampleLink};

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub sample: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct CheckForm {
    pub content: Option<String>,
    pub source: Option<String>,
}

/// GET / - the claim form, optionally pre-filled with a sample.
pub async fn index(Query(query): Query<IndexQuery>) -> Response {
    let (content, source) = query
        .sample
        .and_then(samples::sample)
        .map(|s| (s.content.to_string(), s.source.to_string()))
        .unwrap_or_default();

    render(
        StatusCode::OK,
        &IndexTemplate {
            content,
            source,
            samples: SampleLink::list(&SAMPLES),
        },
    )
}

/// POST /check - run the analysis and render the verdict.
pub async fn check(State(state): State<AppState>, Form(form): Form<CheckForm>) -> Response {
    match state
        .analyzer
        .analyze(form.content.as_deref(), form.source.as_deref())
        .await
    {
        Ok(extraction) => render(
            StatusCode::OK,
            &ResultTemplate {
                result: ResultView::from_extraction(&extraction),
            },
        ),
        Err(err) => {
            let err = ApiError::from(err);
            err.log();
            render(
                err.status_code(),
                &ErrorTemplate {
                    status: err.status_code().as_u16(),
                    message: err.to_string(),
                    detail: err.detail(),
                },
            )
        }
    }
}

//! HTML views over analysis results.
//!
//! Templates only ever see [`ResultView`], which is built from whatever the
//! extractor produced; missing fields render as empty text.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::Value;
use sift_common::{AnalysisResult, Extraction};

use crate::samples::SampleClaim;

/// Badge category for a credibility rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayCategory {
    Verified,
    Misleading,
    Fake,
    Unknown,
}

impl DisplayCategory {
    pub fn from_rating(rating: &str) -> Self {
        match rating {
            "Highly Credible" | "Generally Credible" => DisplayCategory::Verified,
            "Needs Caution" | "Potentially Misleading" => DisplayCategory::Misleading,
            "Suspected Fake" | "Confirmed Fake" => DisplayCategory::Fake,
            _ => DisplayCategory::Unknown,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            DisplayCategory::Verified => "tag-verified",
            DisplayCategory::Misleading => "tag-misleading",
            DisplayCategory::Fake => "tag-fake",
            DisplayCategory::Unknown => "tag-unknown",
        }
    }
}

/// View model for one verdict.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub content: String,
    pub source: String,
    pub stop: String,
    pub investigate_source: String,
    pub find_coverage: String,
    pub trace_claims: String,
    pub rating: String,
    pub category: DisplayCategory,
    pub final_advice: String,
    pub learning_tips: String,
    pub fallback: bool,
}

impl ResultView {
    pub fn from_extraction(extraction: &Extraction) -> Self {
        match extraction {
            Extraction::Structured(result) => Self::from_result(result, false),
            Extraction::Fallback(result) => Self::from_result(result, true),
            Extraction::Unvalidated(map) => {
                let text = |v: Option<&Value>| v.and_then(Value::as_str).unwrap_or("").to_string();
                let steps = map.get("sift_analysis");
                let step = |key: &str| text(steps.and_then(|s| s.get(key)));
                let rating = text(map.get("credibility_rating"));
                Self {
                    content: text(map.get("content")),
                    source: text(map.get("source")),
                    stop: step("stop"),
                    investigate_source: step("investigate_source"),
                    find_coverage: step("find_coverage"),
                    trace_claims: step("trace_claims"),
                    category: DisplayCategory::from_rating(&rating),
                    rating,
                    final_advice: text(map.get("final_advice")),
                    learning_tips: text(map.get("learning_tips")),
                    fallback: false,
                }
            }
        }
    }

    fn from_result(result: &AnalysisResult, fallback: bool) -> Self {
        Self {
            content: result.content.clone(),
            source: result.source.clone(),
            stop: result.sift_analysis.stop.clone(),
            investigate_source: result.sift_analysis.investigate_source.clone(),
            find_coverage: result.sift_analysis.find_coverage.clone(),
            trace_claims: result.sift_analysis.trace_claims.clone(),
            rating: result.credibility_rating.clone(),
            category: DisplayCategory::from_rating(&result.credibility_rating),
            final_advice: result.final_advice.clone(),
            learning_tips: result.learning_tips.clone(),
            fallback,
        }
    }

    pub fn tag_class(&self) -> &'static str {
        self.category.css_class()
    }
}

// ============================================================
// TEMPLATES
// ============================================================

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub content: String,
    pub source: String,
    pub samples: Vec<SampleLink>,
}

/// Sample claim as a numbered fill-in link.
pub struct SampleLink {
    pub number: usize,
    pub title: &'static str,
    pub source: &'static str,
}

impl SampleLink {
    pub fn list(samples: &[SampleClaim]) -> Vec<Self> {
        samples
            .iter()
            .enumerate()
            .map(|(i, s)| SampleLink {
                number: i + 1,
                title: s.title,
                source: s.source,
            })
            .collect()
    }
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultTemplate {
    pub result: ResultView,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub status: u16,
    pub message: String,
    pub detail: Option<String>,
}

/// Render a template into a response with the given status.
pub fn render<T: Template>(status: StatusCode, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template render failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Template error: {e}")),
            )
                .into_response()
        }
    }
}

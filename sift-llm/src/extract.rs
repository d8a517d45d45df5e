//! Turns free-form model output into a fully populated analysis.
//!
//! The reply is searched for one greedy `{ ... }` span: from the first
//! opening brace to the last closing brace, without balancing. Several
//! independent objects, or stray braces in prose, therefore yield a span that
//! fails to parse and the fixed template is used instead. Extraction never
//! fails and is deterministic.
//!
//! Parsing is `serde_json`'s, which is stricter than a browser's `JSON.parse`
//! in two corners: a lone UTF-16 surrogate escape such as `"\ud800"` and
//! nesting deeper than 128 levels are both syntax errors here, so such
//! replies take the template rather than passing through.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use sift_common::{AnalysisRequest, AnalysisResult, Extraction, SiftAnalysis};
use std::sync::OnceLock;

const FALLBACK_RATING: &str = "Needs Caution";

fn json_span(raw: &str) -> Option<&str> {
    static SPAN: OnceLock<Regex> = OnceLock::new();
    SPAN.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid span pattern"))
        .find(raw)
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseExtractor {
    validate_shape: bool,
}

impl ResponseExtractor {
    /// With `validate_shape`, a parsed object lacking the expected fields is
    /// replaced by the template instead of being passed through.
    pub fn new(validate_shape: bool) -> Self {
        Self { validate_shape }
    }

    pub fn extract(&self, raw: &str, request: &AnalysisRequest) -> Extraction {
        let Some(span) = json_span(raw) else {
            tracing::debug!("no JSON object in model reply, using template");
            return Extraction::Fallback(fallback_result(request));
        };

        let value: Value = match serde_json::from_str(span) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "model reply JSON did not parse, using template");
                return Extraction::Fallback(fallback_result(request));
            }
        };

        match AnalysisResult::deserialize(&value) {
            Ok(result) => Extraction::Structured(result.with_request(request)),
            Err(e) if self.validate_shape => {
                tracing::debug!(error = %e, "model reply has the wrong shape, using template");
                Extraction::Fallback(fallback_result(request))
            }
            Err(e) => match value {
                Value::Object(map) => {
                    tracing::debug!(error = %e, "passing through unexpected reply shape");
                    Extraction::Unvalidated(echo_request(map, request))
                }
                // A `{...}` span that parses is always an object.
                _ => Extraction::Fallback(fallback_result(request)),
            },
        }
    }
}

fn echo_request(mut map: Map<String, Value>, request: &AnalysisRequest) -> Map<String, Value> {
    map.insert("content".into(), Value::String(request.content.clone()));
    map.insert("source".into(), Value::String(request.source.clone()));
    map
}

/// Fixed verdict used whenever the model reply cannot be read.
pub fn fallback_result(request: &AnalysisRequest) -> AnalysisResult {
    AnalysisResult {
        sift_analysis: SiftAnalysis {
            stop: "Based on AI analysis, this information contains multiple elements that require verification. It is recommended to stop sharing and conduct further verification.".into(),
            investigate_source: format!(
                "The credibility and background of \"{}\" need further investigation.",
                request.source
            ),
            find_coverage: "It is recommended to search for relevant reports through authoritative news media and official channels for comparative verification.".into(),
            trace_claims: "Need to track the original source of the information and check if it has been modified or distorted.".into(),
            extra: Map::new(),
        },
        credibility_rating: FALLBACK_RATING.into(),
        final_advice: "Do not easily believe or share this information. It is recommended to verify through multiple reliable channels.".into(),
        learning_tips: "When encountering suspicious information, first stop and think, then verify from multiple perspectives.".into(),
        content: request.content.clone(),
        source: request.source.clone(),
        extra: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            content: "Eating broccoli cures cancer".into(),
            source: "blog post".into(),
        }
    }

    const WELL_FORMED: &str = r#"{"sift_analysis":{"stop":"s","investigate_source":"i","find_coverage":"f","trace_claims":"t"},"credibility_rating":"Suspected Fake","final_advice":"a","learning_tips":"l"}"#;

    #[test]
    fn span_is_greedy_from_first_open_to_last_close() {
        assert_eq!(json_span("a {x} b {y} c"), Some("{x} b {y}"));
        assert_eq!(json_span("line\n{\n\"k\": 1\n}\ntrailer"), Some("{\n\"k\": 1\n}"));
        assert_eq!(json_span("} backwards {"), None);
        assert_eq!(json_span("no braces"), None);
    }

    #[test]
    fn object_wrapped_in_prose_is_parsed_and_echoes_the_request() {
        let raw = format!("Sure! {WELL_FORMED} Hope this helps.");
        let out = ResponseExtractor::default().extract(&raw, &request());

        let Extraction::Structured(result) = &out else {
            panic!("expected structured, got {}", out.outcome());
        };
        assert_eq!(result.credibility_rating, "Suspected Fake");
        assert_eq!(result.sift_analysis.trace_claims, "t");
        assert_eq!(result.content, "Eating broccoli cures cancer");
        assert_eq!(result.source, "blog post");
    }

    #[test]
    fn model_supplied_content_and_source_are_overwritten() {
        let raw = r#"{"sift_analysis":{"stop":"s","investigate_source":"i","find_coverage":"f","trace_claims":"t"},"credibility_rating":"r","final_advice":"a","learning_tips":"l","content":"forged","source":"forged"}"#;
        let value = ResponseExtractor::default().extract(raw, &request()).to_value();
        assert_eq!(value["content"], "Eating broccoli cures cancer");
        assert_eq!(value["source"], "blog post");
    }

    #[test]
    fn prose_without_json_uses_the_template() {
        let out = ResponseExtractor::default().extract("I cannot analyze this.", &request());
        let Extraction::Fallback(result) = &out else {
            panic!("expected fallback");
        };
        assert_eq!(result.credibility_rating, "Needs Caution");
        assert!(result.sift_analysis.investigate_source.contains("\"blog post\""));
        assert!(!result.sift_analysis.stop.is_empty());
        assert!(!result.sift_analysis.find_coverage.is_empty());
        assert!(!result.sift_analysis.trace_claims.is_empty());
        assert!(!result.final_advice.is_empty());
        assert!(!result.learning_tips.is_empty());
        assert_eq!(result.content, "Eating broccoli cures cancer");
    }

    #[test]
    fn malformed_json_uses_the_template() {
        let raw = r#"Here you go: {"sift_analysis": {"stop": "unterminated}"#;
        let out = ResponseExtractor::default().extract(raw, &request());
        assert!(out.is_fallback());
        assert_eq!(out.credibility_rating(), Some("Needs Caution"));
    }

    #[test]
    fn lone_surrogates_and_deep_nesting_use_the_template() {
        let surrogate = r#"{"credibility_rating": "\ud800"}"#;
        let deep = format!("{{\"a\": {}1{}}}", "[".repeat(200), "]".repeat(200));
        for raw in [surrogate.to_string(), deep] {
            assert!(ResponseExtractor::default().extract(&raw, &request()).is_fallback());
        }
    }

    #[test]
    fn two_objects_are_not_balanced_and_fall_back() {
        let raw = format!("{WELL_FORMED}\n\nAlternative: {WELL_FORMED}");
        assert!(ResponseExtractor::default().extract(&raw, &request()).is_fallback());
    }

    #[test]
    fn wrong_shape_passes_through_by_default() {
        let raw = r#"{"verdict": "fake", "credibility_rating": 2}"#;
        let out = ResponseExtractor::default().extract(raw, &request());
        assert_eq!(out.outcome(), "unvalidated");
        assert_eq!(
            out.to_value(),
            json!({
                "verdict": "fake",
                "credibility_rating": 2,
                "content": "Eating broccoli cures cancer",
                "source": "blog post"
            })
        );
    }

    #[test]
    fn wrong_shape_falls_back_when_validating() {
        let raw = r#"{"verdict": "fake"}"#;
        let out = ResponseExtractor::new(true).extract(raw, &request());
        assert!(out.is_fallback());
    }

    #[test]
    fn identical_input_gives_identical_bytes() {
        let extractor = ResponseExtractor::default();
        for raw in ["I cannot analyze this.", WELL_FORMED, r#"{"x": 1}"#] {
            let a = serde_json::to_vec(&extractor.extract(raw, &request())).unwrap();
            let b = serde_json::to_vec(&extractor.extract(raw, &request())).unwrap();
            assert_eq!(a, b);
        }
    }
}

//! Value objects for a single credibility analysis.
//!
//! Everything here is constructed per request and dropped once the response
//! is written. Model-produced keys that are not part of the schema are kept
//! in `extra` maps so they are echoed back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rating labels the model is asked to choose from. Not enforced: any
/// string the model returns is passed through.
pub const CREDIBILITY_RATINGS: [&str; 7] = [
    "Highly Credible",
    "Generally Credible",
    "Needs Caution",
    "Potentially Misleading",
    "Suspected Fake",
    "Confirmed Fake",
    "Unable to Determine",
];

/// A validated request: `source` has already been resolved by the policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub content: String,
    pub source: String,
}

/// The four SIFT steps as free-text explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiftAnalysis {
    pub stop: String,
    pub investigate_source: String,
    pub find_coverage: String,
    pub trace_claims: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Full verdict returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sift_analysis: SiftAnalysis,
    pub credibility_rating: String,
    pub final_advice: String,
    pub learning_tips: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub source: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisResult {
    /// Replace the echoed fields with the caller's own values.
    pub fn with_request(mut self, request: &AnalysisRequest) -> Self {
        self.content = request.content.clone();
        self.source = request.source.clone();
        self
    }
}

/// Outcome of reading one model reply.
///
/// Serialises to the bare wire object; the variant only records how the
/// object was obtained.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Extraction {
    /// The reply held a JSON object with the expected shape.
    Structured(AnalysisResult),
    /// The reply held a JSON object of some other shape, passed through.
    Unvalidated(Map<String, Value>),
    /// The reply held no usable JSON; the fixed template was used.
    Fallback(AnalysisResult),
}

impl Extraction {
    /// Short label used in logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Extraction::Structured(_) => "structured",
            Extraction::Unvalidated(_) => "unvalidated",
            Extraction::Fallback(_) => "fallback",
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Extraction::Fallback(_))
    }

    /// The rating label, when the object carries a string one.
    pub fn credibility_rating(&self) -> Option<&str> {
        match self {
            Extraction::Structured(r) | Extraction::Fallback(r) => Some(&r.credibility_rating),
            Extraction::Unvalidated(map) => map.get("credibility_rating").and_then(Value::as_str),
        }
    }

    /// Render the wire object as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            content: "claim".into(),
            source: "blog".into(),
        }
    }

    #[test]
    fn unknown_model_keys_survive_a_round_through_the_struct() {
        let raw = json!({
            "sift_analysis": {
                "stop": "a", "investigate_source": "b",
                "find_coverage": "c", "trace_claims": "d",
                "confidence": 0.4
            },
            "credibility_rating": "Suspected Fake",
            "final_advice": "e",
            "learning_tips": "f",
            "sources_checked": ["x"]
        });
        let parsed: AnalysisResult = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.sift_analysis.extra.get("confidence"), Some(&json!(0.4)));

        let wire = Extraction::Structured(parsed.with_request(&request())).to_value();
        assert_eq!(wire["sources_checked"], json!(["x"]));
        assert_eq!(wire["sift_analysis"]["confidence"], json!(0.4));
        assert_eq!(wire["content"], json!("claim"));
        assert_eq!(wire["source"], json!("blog"));
    }

    #[test]
    fn unvalidated_object_serialises_as_is() {
        let mut map = Map::new();
        map.insert("verdict".into(), json!("fake"));
        let extraction = Extraction::Unvalidated(map);
        assert_eq!(extraction.to_value(), json!({"verdict": "fake"}));
        assert_eq!(extraction.credibility_rating(), None);
        assert_eq!(extraction.outcome(), "unvalidated");
    }
}

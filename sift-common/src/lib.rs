//! Common types and utilities shared across the SIFT checker crates.
//!
//! This crate defines the analysis data model, the request policies, the
//! shared error type, and the observability helpers used throughout the
//! workspace. It is intentionally lightweight so that every crate can depend
//! on it without pulling in the HTTP or server stack.
//!
//! # Overview
//!
//! - [`AnalysisRequest`], [`AnalysisResult`], [`SiftAnalysis`]: the value
//!   objects that flow through one analysis
//! - [`Extraction`]: the three terminal outcomes of reading a model reply
//! - [`SourcePolicy`]: whether a claim's `source` is mandatory
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`SiftError`] and [`Result`]: shared error handling
//!
//! # Examples
//!
//! ```rust
//! use sift_common::{SourcePolicy, UNKNOWN_SOURCE};
//!
//! let policy = SourcePolicy::default();
//! assert_eq!(policy, SourcePolicy::Strict);
//! assert_eq!(UNKNOWN_SOURCE, "Unknown");
//! ```
use serde::{Deserialize, Serialize};

pub mod analysis;
pub mod observability;

pub use analysis::{
    AnalysisRequest, AnalysisResult, CREDIBILITY_RATINGS, Extraction, SiftAnalysis,
};

/// Source label substituted when the lenient policy accepts a claim without one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// How a missing or blank `source` is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourcePolicy {
    /// Both `content` and `source` must be non-blank.
    #[default]
    Strict,
    /// A blank `source` becomes [`UNKNOWN_SOURCE`].
    Lenient,
}

impl SourcePolicy {
    /// Message reported when the required fields are missing.
    pub fn required_message(self) -> &'static str {
        match self {
            SourcePolicy::Strict => "Content and source are required",
            SourcePolicy::Lenient => "Content is required",
        }
    }
}

/// Which provider credentials were found at startup.
///
/// Serialises with the camel-cased keys operators already know from the
/// error payload (`hasApiKey`, `hasAppId`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub has_api_key: bool,
    pub has_app_id: bool,
}

impl CredentialStatus {
    pub fn is_complete(&self) -> bool {
        self.has_api_key && self.has_app_id
    }
}

/// How the API key is placed in the `Authorization` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthScheme {
    /// The configured key is sent verbatim (it may already carry its own prefix).
    #[default]
    Raw,
    /// The key is sent as `Bearer <key>`.
    Bearer,
}

/// Provider credentials resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    pub app_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Error types used across the SIFT checker.
#[derive(thiserror::Error, Debug)]
pub enum SiftError {
    /// A required request field was missing or blank.
    #[error("{0}")]
    Validation(String),

    /// The provider credentials were not configured at startup.
    #[error("API credentials not configured")]
    MissingCredentials(CredentialStatus),

    /// The chat-completion API answered with a non-success status.
    #[error("API request failed with status {status}")]
    Upstream { status: u16, body: String },

    /// Anything else that stopped the request before a result existed.
    #[error("{0}")]
    Internal(String),

    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenient alias for results that use [`SiftError`].
pub type Result<T> = std::result::Result<T, SiftError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_status_uses_operator_field_names() {
        let status = CredentialStatus {
            has_api_key: true,
            has_app_id: false,
        };
        let value = serde_json::to_value(status).unwrap();
        assert_eq!(value, serde_json::json!({"hasApiKey": true, "hasAppId": false}));
        assert!(!status.is_complete());
    }

    #[test]
    fn upstream_error_names_the_status() {
        let err = SiftError::Upstream {
            status: 401,
            body: "{\"error_code\":\"unauthorized\"}".into(),
        };
        assert_eq!(err.to_string(), "API request failed with status 401");
    }

    #[test]
    fn credentials_debug_hides_the_key() {
        let creds = Credentials {
            api_key: "bce-v3/ALTAK-secret".into(),
            app_id: "app-1".into(),
        };
        let shown = format!("{creds:?}");
        assert!(!shown.contains("secret"));
        assert!(shown.contains("app-1"));
    }

    #[test]
    fn source_policy_parses_lowercase() {
        let policy: SourcePolicy = serde_json::from_str("\"lenient\"").unwrap();
        assert_eq!(policy, SourcePolicy::Lenient);
        assert_eq!(policy.required_message(), "Content is required");
    }
}

//! Chat-completion integration for the SIFT checker.
//!
//! This crate exposes the provider-agnostic [`traits::ChatClient`] interface,
//! the Qianfan client, the prompt builder, the reply extractor, and the
//! [`analyzer::Analyzer`] that strings them together.
//!
//! # Examples
//! ```no_run
//! use sift_common::{CredentialStatus, Credentials, Result};
//! use sift_llm::{analyzer::Analyzer, backend_from_credentials, QIANFAN_CHAT_ENDPOINT};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let creds = Credentials { api_key: "key".into(), app_id: "app".into() };
//! let backend = backend_from_credentials(QIANFAN_CHAT_ENDPOINT, Ok(creds), None)?;
//! let analyzer = Analyzer::new(Default::default(), Default::default(), backend);
//! let verdict = analyzer.analyze(Some("Water is wet"), Some("a friend")).await?;
//! println!("{}", verdict.to_value());
//! # Ok(())
//! # }
//! ```
pub mod analyzer;
pub mod extract;
pub mod prompt;
pub mod qianfan;
pub mod traits;

pub use qianfan::{QianfanClient, QIANFAN_CHAT_ENDPOINT};

use analyzer::Backend;
use traits::ChatClient;
use sift_common::{AuthScheme, CredentialStatus, Credentials, Result};
use std::sync::Arc;
use std::time::Duration;

/// Construct the provider backend from startup credentials.
///
/// Missing credentials are not an error here: the server still starts and
/// reports the gap on each request.
pub fn backend_from_credentials(
    endpoint: &str,
    credentials: std::result::Result<Credentials, CredentialStatus>,
    timeout: Option<Duration>,
) -> Result<Backend> {
    backend_with_scheme(endpoint, credentials, timeout, AuthScheme::Raw, None)
}

/// Like [`backend_from_credentials`], with the auth scheme and model label
/// spelled out.
pub fn backend_with_scheme(
    endpoint: &str,
    credentials: std::result::Result<Credentials, CredentialStatus>,
    timeout: Option<Duration>,
    scheme: AuthScheme,
    model: Option<&str>,
) -> Result<Backend> {
    match credentials {
        Ok(creds) => {
            let mut client = QianfanClient::new(endpoint, &creds)?
                .with_auth_scheme(scheme)
                .with_timeout(timeout);
            if let Some(model) = model {
                client = client.with_model_label(model);
            }
            tracing::info!(endpoint, model = client.model_name(), "provider ready");
            Ok(Backend::Ready(Arc::new(client)))
        }
        Err(status) => {
            tracing::warn!(
                has_api_key = status.has_api_key,
                has_app_id = status.has_app_id,
                "provider credentials incomplete; analysis requests will fail"
            );
            Ok(Backend::Unconfigured(status))
        }
    }
}

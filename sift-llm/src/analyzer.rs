//! One claim in, one verdict out.
//!
//! [`Analyzer`] runs the pipeline: resolve the request, check credentials,
//! build the prompt, call the provider once, read the reply.

use crate::extract::ResponseExtractor;
use crate::prompt::PromptBuilder;
use crate::traits::ChatClient;
use sift_common::{CredentialStatus, Extraction, Result, SiftError};
use std::sync::Arc;
use std::time::Instant;

/// Provider handle, or the reason there is none.
#[derive(Clone)]
pub enum Backend {
    Ready(Arc<dyn ChatClient>),
    /// Credentials were incomplete at startup; every request reports this.
    Unconfigured(CredentialStatus),
}

impl Backend {
    pub fn status(&self) -> CredentialStatus {
        match self {
            Backend::Ready(_) => CredentialStatus {
                has_api_key: true,
                has_app_id: true,
            },
            Backend::Unconfigured(status) => *status,
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Ready(client) => f
                .debug_tuple("Ready")
                .field(&client.model_name())
                .finish(),
            Backend::Unconfigured(status) => f.debug_tuple("Unconfigured").field(status).finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Analyzer {
    prompts: PromptBuilder,
    extractor: ResponseExtractor,
    backend: Backend,
}

impl Analyzer {
    pub fn new(prompts: PromptBuilder, extractor: ResponseExtractor, backend: Backend) -> Self {
        Self {
            prompts,
            extractor,
            backend,
        }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Analyze raw request fields.
    ///
    /// Validation runs before the credential check, so a bad request is
    /// reported as such even on an unconfigured server. Exactly one provider
    /// call is made per accepted request; any reply that arrives yields an
    /// [`Extraction`].
    pub async fn analyze(
        &self,
        content: Option<&str>,
        source: Option<&str>,
    ) -> Result<Extraction> {
        let request = self.prompts.resolve(content, source)?;

        let client = match &self.backend {
            Backend::Ready(client) => client,
            Backend::Unconfigured(status) => {
                tracing::error!(
                    has_api_key = status.has_api_key,
                    has_app_id = status.has_app_id,
                    "provider credentials missing"
                );
                return Err(SiftError::MissingCredentials(*status));
            }
        };

        let chat = self.prompts.build(&request);
        tracing::info!(
            model = client.model_name(),
            content_chars = request.content.chars().count(),
            source = %request.source,
            "analysis.start"
        );

        let started = Instant::now();
        let completion = client.complete(&chat).await.map_err(|e| {
            tracing::error!(error = %e, "analysis.provider_failed");
            e
        })?;

        let text = completion.first_text().ok_or_else(|| {
            let reason = completion
                .error_msg
                .clone()
                .unwrap_or_else(|| "empty choices".to_string());
            tracing::error!(%reason, "analysis.no_choices");
            SiftError::Internal(format!("Provider reply contained no choices: {reason}"))
        })?;

        let extraction = self.extractor.extract(text, &request);
        tracing::info!(
            outcome = extraction.outcome(),
            rating = extraction.credibility_rating().unwrap_or("-"),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis.done"
        );
        Ok(extraction)
    }
}

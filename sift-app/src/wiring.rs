//! Settings → analyzer.

use anyhow::Result;
use sift_config::Settings;
use sift_llm::analyzer::Analyzer;
use sift_llm::backend_with_scheme;
use sift_llm::extract::ResponseExtractor;
use sift_llm::prompt::{PromptBuilder, PromptOptions};

pub fn prompt_options(settings: &Settings) -> PromptOptions {
    PromptOptions {
        source_policy: settings.analysis.source_policy,
        system_turn: settings.analysis.system_turn,
        model: settings.provider.model.clone(),
        temperature: Some(settings.provider.temperature),
        max_tokens: Some(settings.provider.max_tokens),
    }
}

/// Credentials are resolved here, once; a missing one leaves the analyzer
/// unconfigured rather than failing startup.
pub fn build_analyzer(settings: &Settings) -> Result<Analyzer> {
    let provider = &settings.provider;
    let backend = backend_with_scheme(
        &provider.endpoint,
        settings.credentials(),
        provider.timeout(),
        provider.auth_scheme,
        provider.model.as_deref(),
    )?;

    Ok(Analyzer::new(
        PromptBuilder::new(prompt_options(settings)),
        ResponseExtractor::new(settings.analysis.validate_shape),
        backend,
    ))
}

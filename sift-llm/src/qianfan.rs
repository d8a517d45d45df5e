use crate::traits::{ChatClient, ChatCompletion, ChatRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use sift_common::{AuthScheme, Credentials, Result, SiftError};
use sift_http::{Auth, HttpClient, HttpError, RequestOpts};
use std::time::Duration;

pub const QIANFAN_CHAT_ENDPOINT: &str = "https://qianfan.baidubce.com/v2/chat/completions";

const APP_ID_HEADER: HeaderName = HeaderName::from_static("appid");

/// Client for an OpenAI-style chat-completion endpoint that authenticates
/// with an opaque `Authorization` value plus an `appid` header.
pub struct QianfanClient {
    client: HttpClient,
    api_key: String,
    app_id: HeaderValue,
    auth_scheme: AuthScheme,
    model: String,
}

impl QianfanClient {
    /// Create a new client for the given endpoint and credentials.
    ///
    /// Header values are checked here so a malformed credential fails at
    /// startup instead of on the first request.
    pub fn new(endpoint: &str, credentials: &Credentials) -> Result<Self> {
        let client = HttpClient::new(endpoint)
            .map_err(|e| SiftError::Config(format!("HttpClient init failed: {e}")))?;
        HeaderValue::from_str(&credentials.api_key)
            .map_err(|e| SiftError::Config(format!("API key is not a valid header value: {e}")))?;
        let app_id = HeaderValue::from_str(&credentials.app_id)
            .map_err(|e| SiftError::Config(format!("App id is not a valid header value: {e}")))?;

        Ok(Self {
            client,
            api_key: credentials.api_key.clone(),
            app_id,
            auth_scheme: AuthScheme::Raw,
            model: "provider-default".to_string(),
        })
    }

    pub fn with_auth_scheme(mut self, scheme: AuthScheme) -> Self {
        self.auth_scheme = scheme;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Label reported by [`ChatClient::model_name`]; the model actually used
    /// is whatever the request names.
    pub fn with_model_label(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    fn auth(&self) -> Result<Auth<'_>> {
        Ok(match self.auth_scheme {
            AuthScheme::Bearer => Auth::Bearer(&self.api_key),
            AuthScheme::Raw => Auth::Header {
                name: AUTHORIZATION,
                value: HeaderValue::from_str(&self.api_key)
                    .map_err(|e| SiftError::Config(e.to_string()))?,
            },
        })
    }
}

#[async_trait]
impl ChatClient for QianfanClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion> {
        let mut headers = HeaderMap::new();
        headers.insert(APP_ID_HEADER, self.app_id.clone());

        let opts = RequestOpts {
            auth: Some(self.auth()?),
            headers: Some(headers),
            ..Default::default()
        };

        tracing::debug!(
            endpoint = %self.client.base(),
            turns = request.messages.len(),
            model = ?request.model,
            "qianfan.complete"
        );

        let completion: ChatCompletion = self
            .client
            .post_json_opts("", request, opts)
            .await
            .map_err(http_to_sift)?;

        if let Some(usage) = &completion.usage {
            tracing::debug!(total_tokens = ?usage.total_tokens, "qianfan.usage");
        }
        Ok(completion)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

fn http_to_sift(e: HttpError) -> SiftError {
    match e {
        HttpError::Api { status, body, .. } => SiftError::Upstream {
            status: status.as_u16(),
            body,
        },
        other => SiftError::Internal(other.to_string()),
    }
}

//! JSON-over-HTTP client used for the chat-completion call.
//!
//! One attempt per call; failures are reported, never retried. A non-success
//! response keeps its full body so callers can pass it on. Credentials never
//! reach the logs: header values listed in `SENSITIVE_HEADERS` are replaced,
//! and events only name the auth kind.
//!
//! Events: `http.request.start`, `http.response`, `http.error`,
//! `http.network_error`, `http.response.decode_error`. With `SIFT_HTTP_RAW=1`
//! the target `http.raw` also gets a redacted curl line and the response body.
//!
//! ```no_run
//! # async fn demo() -> Result<(), sift_http::HttpError> {
//! let client = sift_http::HttpClient::new("https://api.example.com/v1/chat")?;
//! let reply: serde_json::Value = client
//!     .post_json_opts("", &serde_json::json!({"ping": true}), sift_http::RequestOpts::default())
//!     .await?;
//! # let _ = reply;
//! # Ok(()) }
//! ```

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

const RAW_ENV: &str = "SIFT_HTTP_RAW";
const RAW_BODY_LIMIT: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const SENSITIVE_HEADERS: &[&str] = &["authorization", "appid", "x-api-key", "x-subscription-token"];

fn raw_enabled() -> bool {
    std::env::var(RAW_ENV).is_ok_and(|v| matches!(v.as_str(), "1" | "true" | "yes"))
}

fn is_sensitive(name: &str) -> bool {
    SENSITIVE_HEADERS
        .iter()
        .any(|s| name.eq_ignore_ascii_case(s))
}

fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Reproducible curl command with credentials masked.
fn make_curl(method: &Method, url: &Url, headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut line = format!("curl -X{method}");
    for (name, value) in redact_headers(headers) {
        line.push_str(" -H ");
        line.push_str(&shell_quote(&format!("{name}: {value}")));
    }
    match body.map(std::str::from_utf8) {
        Some(Ok(text)) => {
            let mut text = text.to_string();
            if text.len() > RAW_BODY_LIMIT {
                truncate_at_char_boundary(&mut text, RAW_BODY_LIMIT);
                text.push_str("...");
            }
            line.push_str(" -d ");
            line.push_str(&shell_quote(&text));
        }
        Some(Err(_)) => {
            let len = body.map_or(0, <[u8]>::len);
            line.push_str(&format!(" --data-binary @- # {len} bytes"));
        }
        None => {}
    }
    line.push(' ');
    line.push_str(&shell_quote(url.as_str()));
    line
}

fn redact_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let shown = if is_sensitive(name.as_str()) {
                "<redacted>"
            } else {
                value.to_str().unwrap_or("<binary>")
            };
            (name.as_str().to_owned(), shown.to_owned())
        })
        .collect()
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("could not build request: {0}")]
    Build(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response ({0}); body starts with: {1}")]
    Decode(String, String),
    #[error("upstream returned {status}: {message} (request id {request_id})")]
    Api {
        status: StatusCode,
        message: String,
        /// Full response body, lossily decoded.
        body: String,
        request_id: String,
    },
}

/// How a request authenticates.
///
/// ```
/// use sift_http::Auth;
/// use reqwest::header::{HeaderName, HeaderValue};
///
/// let auth = Auth::Header {
///     name: HeaderName::from_static("authorization"),
///     value: HeaderValue::from_static("bce-v3/ALTAK-example"),
/// };
/// assert!(matches!(auth, Auth::Header { .. }));
/// ```
#[derive(Clone, Debug)]
pub enum Auth<'a> {
    /// `Authorization: Bearer <token>`; the token is cleaned first.
    Bearer(&'a str),
    /// Opaque credential in a header of its own, sent as-is.
    Header {
        name: HeaderName,
        value: HeaderValue,
    },
    None,
}

impl Auth<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Auth::Bearer(_) => "bearer",
            Auth::Header { .. } => "header",
            Auth::None => "none",
        }
    }
}

/// Per-call overrides.
///
/// ```
/// use sift_http::RequestOpts;
/// use std::time::Duration;
///
/// let opts = RequestOpts {
///     timeout: Some(Duration::from_secs(45)),
///     ..Default::default()
/// };
/// assert_eq!(opts.timeout, Some(Duration::from_secs(45)));
/// assert!(opts.headers.is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct RequestOpts<'a> {
    pub timeout: Option<Duration>,
    pub auth: Option<Auth<'a>>,
    /// Extra headers, applied before auth.
    pub headers: Option<HeaderMap>,
}

#[derive(Clone)]
pub struct HttpClient {
    base: Url,
    inner: Client,
    /// Applied when a request does not set its own; `None` waits indefinitely.
    pub default_timeout: Option<Duration>,
}

impl HttpClient {
    /// Client for `base`, with a connect timeout and no overall timeout.
    pub fn new(base: &str) -> Result<Self, HttpError> {
        let base = Url::parse(base).map_err(|e| HttpError::Url(e.to_string()))?;
        let inner = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| HttpError::Build(e.to_string()))?;
        Ok(Self {
            base,
            inner,
            default_timeout: None,
        })
    }

    /// ```
    /// use sift_http::{HttpClient, HttpError};
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new("https://qianfan.example.com/v2/chat/completions")?
    ///     .with_timeout(Some(Duration::from_secs(90)));
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(90)));
    /// # Ok::<(), HttpError>(())
    /// ```
    pub fn with_timeout(mut self, dur: Option<Duration>) -> Self {
        self.default_timeout = dur;
        self
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// POST JSON with per-request options (headers/auth/timeout).
    ///
    /// An empty `path` posts to the base URL itself.
    pub async fn post_json_opts<B, T>(
        &self,
        path: &str,
        body: &B,
        opts: RequestOpts<'_>,
    ) -> Result<T, HttpError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.resolve(path)?;
        let payload = serde_json::to_vec(body).map_err(|e| HttpError::Build(e.to_string()))?;
        let exchange = self.exchange(Method::POST, url, Some(payload), &opts).await?;
        exchange.decode()
    }

    fn resolve(&self, path: &str) -> Result<Url, HttpError> {
        if path.is_empty() {
            return Ok(self.base.clone());
        }
        self.base
            .join(path)
            .map_err(|e| HttpError::Url(e.to_string()))
    }

    /// Send once and collect the whole response body.
    async fn exchange(
        &self,
        method: Method,
        url: Url,
        payload: Option<Vec<u8>>,
        opts: &RequestOpts<'_>,
    ) -> Result<Exchange, HttpError> {
        let timeout = opts.timeout.or(self.default_timeout);
        let mut rb = self.inner.request(method.clone(), url.clone());
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }
        if let Some(bytes) = &payload {
            rb = rb
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(bytes.clone());
        }
        if let Some(hdrs) = &opts.headers {
            rb = rb.headers(hdrs.clone());
        }
        rb = match &opts.auth {
            Some(Auth::Bearer(tok)) => rb.bearer_auth(sanitize_api_key(tok)?),
            Some(Auth::Header { name, value }) => rb.header(name, value),
            Some(Auth::None) | None => rb,
        };

        let req_id = Uuid::new_v4().simple().to_string();
        tracing::debug!(
            req_id=%req_id,
            method=%method,
            host_path=%format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
            timeout_ms=?timeout.map(|t| t.as_millis() as u64),
            auth_kind=opts.auth.as_ref().map(Auth::kind).unwrap_or("none"),
            body_len=payload.as_ref().map(Vec::len).unwrap_or(0),
            "http.request.start"
        );
        if raw_enabled() {
            let curl = make_curl(&method, &url, &outgoing_headers(opts), payload.as_deref());
            tracing::debug!(target: "http.raw", %req_id, %curl, "request");
        }

        let started = Instant::now();
        let resp = rb.send().await.map_err(|err| network_error(&req_id, "send", err))?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp
            .bytes()
            .await
            .map_err(|err| network_error(&req_id, "body", err))?
            .to_vec();

        let exchange = Exchange {
            req_id,
            status,
            upstream_id: upstream_request_id(&headers),
            body,
        };
        exchange.log(started.elapsed().as_millis() as u64, &headers);
        Ok(exchange)
    }
}

/// One completed request/response pair.
struct Exchange {
    req_id: String,
    status: StatusCode,
    upstream_id: String,
    body: Vec<u8>,
}

impl Exchange {
    fn log(&self, duration_ms: u64, headers: &HeaderMap) {
        tracing::debug!(
            req_id=%self.req_id,
            status=%self.status,
            duration_ms,
            body_len=self.body.len(),
            x_request_id=%self.upstream_id,
            "http.response"
        );
        if raw_enabled() {
            let mut shown = self.body.clone();
            let truncated = shown.len() > RAW_BODY_LIMIT;
            shown.truncate(RAW_BODY_LIMIT);
            tracing::info!(
                target: "http.raw",
                req_id=%self.req_id,
                status=%self.status,
                headers=?redact_headers(headers),
                body=%String::from_utf8_lossy(&shown),
                truncated,
                "response"
            );
        }
    }

    /// Decode a 2xx body; anything else becomes [`HttpError::Api`].
    fn decode<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let snippet = body_snippet(&self.body);
        if self.status.is_success() {
            return serde_json::from_slice::<T>(&self.body).map_err(|e| {
                tracing::warn!(
                    req_id=%self.req_id,
                    serde_err=%e,
                    body_snippet=%snippet,
                    "http.response.decode_error"
                );
                HttpError::Decode(e.to_string(), snippet)
            });
        }

        let message = error_message(&self.body);
        tracing::warn!(
            req_id=%self.req_id,
            status=%self.status,
            message=%message,
            x_request_id=%self.upstream_id,
            body_snippet=%snippet,
            "http.error"
        );
        Err(HttpError::Api {
            status: self.status,
            message,
            body: String::from_utf8_lossy(&self.body).into_owned(),
            request_id: self.upstream_id,
        })
    }
}

fn network_error(req_id: &str, stage: &'static str, err: reqwest::Error) -> HttpError {
    let message = err.to_string();
    tracing::warn!(req_id=%req_id, stage, message=%message, timeout=err.is_timeout(), "http.network_error");
    HttpError::Network(message)
}

fn upstream_request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .or_else(|| headers.get("x-correlation-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string()
}

/// Headers as they go on the wire, for the raw curl line.
fn outgoing_headers(opts: &RequestOpts<'_>) -> HeaderMap {
    let mut merged = opts.headers.clone().unwrap_or_default();
    match &opts.auth {
        Some(Auth::Header { name, value }) => {
            merged.append(name, value.clone());
        }
        Some(Auth::Bearer(_)) => {
            merged.append(AUTHORIZATION, HeaderValue::from_static("Bearer"));
        }
        _ => {}
    }
    merged
}

/// Best human-readable message in an error body.
///
/// Understands `{"error":{"message"}}`, Qianfan's `{"error_code","error_msg"}`,
/// and flat `message`/`detail`/`error` strings; otherwise a body snippet.
fn error_message(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return body_snippet(body);
    };
    let candidates = [
        value.pointer("/error/message"),
        value.get("error_msg"),
        value.get("message"),
        value.get("detail"),
        value.get("error"),
    ];
    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .find(|m| !m.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| body_snippet(body))
}

fn body_snippet(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > SNIPPET_MAX {
        truncate_at_char_boundary(&mut snip, SNIPPET_MAX);
        snip.push_str("...");
    }
    snip
}

fn truncate_at_char_boundary(s: &mut String, max: usize) {
    let mut cut = max.min(s.len());
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    s.truncate(cut);
}

/// Clean a pasted token: outer quotes and all ASCII whitespace go, and
/// what remains must be printable ASCII.
fn sanitize_api_key(raw: &str) -> Result<String, HttpError> {
    let token: String = raw
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    if let Some(bad) = token.chars().find(|c| !c.is_ascii() || c.is_ascii_control()) {
        return Err(HttpError::Build(format!(
            "API key contains an unsupported character ({:?})",
            bad
        )));
    }
    Ok(token)
}

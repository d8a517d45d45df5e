//! Loader for service settings with YAML + environment overlays.
//!
//! Precedence, lowest first: struct defaults, YAML files and snippets in the
//! order they were added, `SIFT__SECTION__KEY` environment variables, and
//! finally `QIANFAN_API_KEY` / `QIANFAN_APP_ID`. `${VAR}` placeholders in any
//! string are expanded after merging.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use sift_common::observability::{LogConfig, LogFormat};
use sift_common::{AuthScheme, CredentialStatus, Credentials, SourcePolicy};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MAX_EXPANSION_PASSES: usize = 8;

pub const DEFAULT_CONFIG_FILE: &str = "sift.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub provider: ProviderSettings,
    pub analysis: AnalysisSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".into(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub app_id: Option<String>,
    /// Sent as the request `model`; omitted when unset so the gateway default applies.
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// No timeout unless set.
    pub timeout_secs: Option<u64>,
    pub auth_scheme: AuthScheme,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://qianfan.baidubce.com/v2/chat/completions".into(),
            api_key: None,
            app_id: None,
            model: None,
            temperature: 0.3,
            max_tokens: 2000,
            timeout_secs: None,
            auth_scheme: AuthScheme::Raw,
        }
    }
}

impl std::fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("app_id", &self.app_id)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("auth_scheme", &self.auth_scheme)
            .finish()
    }
}

impl ProviderSettings {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub source_policy: SourcePolicy,
    pub system_turn: bool,
    pub validate_shape: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub format: LogFormat,
    pub dir: Option<PathBuf>,
    pub stderr: bool,
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            dir: None,
            stderr: true,
            filter: "info".into(),
        }
    }
}

impl LoggingSettings {
    pub fn to_log_config(&self, app_name: &'static str) -> LogConfig {
        LogConfig {
            app_name,
            log_dir: self.dir.clone(),
            emit_stderr: self.stderr,
            format: self.format,
            default_filter: self.filter.clone(),
        }
    }
}

impl Settings {
    /// Provider credentials, or which of them are absent.
    ///
    /// Blank values and placeholders whose variable was never set count as
    /// absent.
    pub fn credentials(&self) -> Result<Credentials, CredentialStatus> {
        let api_key = usable(self.provider.api_key.as_deref());
        let app_id = usable(self.provider.app_id.as_deref());
        match (api_key, app_id) {
            (Some(api_key), Some(app_id)) => Ok(Credentials {
                api_key: api_key.to_string(),
                app_id: app_id.to_string(),
            }),
            (api_key, app_id) => Err(CredentialStatus {
                has_api_key: api_key.is_some(),
                has_app_id: app_id.is_some(),
            }),
        }
    }
}

fn usable(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty() && !v.contains("${"))
}

/// Expand `$VAR` / `${VAR}` in every string, following values that expand
/// to further placeholders up to `MAX_EXPANSION_PASSES` times.
fn expand_placeholders(node: &mut Value) {
    match node {
        Value::String(text) if text.contains('$') => {
            for _ in 0..MAX_EXPANSION_PASSES {
                let next = match shellexpand::env(text.as_str()) {
                    Ok(expanded) if expanded != text.as_str() => expanded.into_owned(),
                    _ => break,
                };
                *text = next;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(expand_placeholders),
        Value::Object(fields) => fields.values_mut().for_each(expand_placeholders),
        _ => {}
    }
}

/// Collects settings sources; [`SiftConfigLoader::load`] adds the environment last.
pub struct SiftConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
}

impl Default for SiftConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SiftConfigLoader {
    /// Start from defaults with `SIFT__` environment overrides.
    ///
    /// ```
    /// use sift_config::SiftConfigLoader;
    ///
    /// let settings = SiftConfigLoader::new()
    ///     .with_yaml_str("server:\n  bind: \"127.0.0.1:8080\"")
    ///     .load()
    ///     .expect("valid config");
    ///
    /// assert_eq!(settings.server.bind, "127.0.0.1:8080");
    /// assert_eq!(settings.provider.max_tokens, 2000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
        }
    }

    /// Required settings file; format follows the extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Like [`Self::with_file`], but a missing file is skipped so headless
    /// deployments can rely on the environment alone.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Inline YAML, merged in call order.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, config::FileFormat::Yaml));
        self
    }

    /// Consume the builder and deserialize the merged sources.
    ///
    /// ```
    /// use sift_common::SourcePolicy;
    /// use sift_config::SiftConfigLoader;
    ///
    /// unsafe { std::env::set_var("SIFT_DOC_KEY", "bce-v3/ALTAK-doc"); }
    ///
    /// let settings = SiftConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// provider:
    ///   api_key: "${SIFT_DOC_KEY}"
    ///   app_id: "app-doc"
    /// analysis:
    ///   source_policy: lenient
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(settings.analysis.source_policy, SourcePolicy::Lenient);
    /// let creds = settings.credentials().expect("both credentials set");
    /// assert_eq!(creds.api_key, "bce-v3/ALTAK-doc");
    ///
    /// unsafe { std::env::remove_var("SIFT_DOC_KEY"); }
    /// ```
    pub fn load(self) -> Result<Settings, ConfigError> {
        let cfg = self
            .builder
            .add_source(Environment::with_prefix("SIFT").separator("__"))
            .set_override_option("provider.api_key", std::env::var("QIANFAN_API_KEY").ok())?
            .set_override_option("provider.app_id", std::env::var("QIANFAN_APP_ID").ok())?
            .build()?;

        let mut merged: Value = cfg.try_deserialize()?;
        expand_placeholders(&mut merged);

        // Round-trip through `config` so string-typed env values still
        // coerce into numbers and booleans.
        Config::try_from(&merged)?.try_deserialize()
    }
}

//! Process-wide `tracing` setup.
//!
//! Events go to a daily rolling file and, optionally, to stderr. The first
//! call to [`init_logging`] installs the subscriber; later calls return the
//! same file path without touching it.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

/// Keeps the non-blocking writer alive for the life of the process.
struct InstalledSink {
    _guard: WorkerGuard,
    path: PathBuf,
}

static SINK: OnceLock<InstalledSink> = OnceLock::new();

const LOG_DIR_ENV: &str = "SIFT_LOG_DIR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Where and how to log.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// File stem and default directory name.
    pub app_name: &'static str,
    /// Overrides `SIFT_LOG_DIR` and the local data directory. `~/` is expanded.
    pub log_dir: Option<PathBuf>,
    pub emit_stderr: bool,
    pub format: LogFormat,
    /// Filter used when `RUST_LOG` is absent or unparsable.
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            app_name: "sift",
            log_dir: None,
            emit_stderr: true,
            format: LogFormat::Text,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    fn directory(&self) -> PathBuf {
        self.log_dir
            .clone()
            .or_else(|| std::env::var_os(LOG_DIR_ENV).map(PathBuf::from))
            .map(|dir| expand_home(&dir))
            .unwrap_or_else(|| default_data_dir(self.app_name))
    }

    fn file_stem(&self) -> String {
        format!("{}.log", self.app_name)
    }
}

/// Install the global subscriber and return today's log file.
pub fn init_logging(config: LogConfig) -> anyhow::Result<PathBuf> {
    if let Some(sink) = SINK.get() {
        return Ok(sink.path.clone());
    }

    let dir = config.directory();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("cannot create log directory {}", dir.display()))?;

    let stem = config.file_stem();
    let path = dated_log_file(&dir, &stem, Utc::now());
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, &stem));

    let mut layers = vec![format_layer(config.format, writer, false)];
    if config.emit_stderr {
        layers.push(format_layer(config.format, std::io::stderr, true));
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    let installed = SINK.get_or_init(|| InstalledSink {
        _guard: guard,
        path,
    });
    Ok(installed.path.clone())
}

/// File the daily appender writes to at `now`; it rolls over on UTC dates.
fn dated_log_file(dir: &Path, stem: &str, now: DateTime<Utc>) -> PathBuf {
    dir.join(format!("{stem}.{}", now.format("%Y-%m-%d")))
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

fn format_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Text => fmt::layer().with_writer(writer).with_ansi(ansi).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(writer).boxed(),
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

fn default_data_dir(app_name: &str) -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(app_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins() {
        let tmp = tempfile::tempdir().unwrap();
        let config = LogConfig {
            log_dir: Some(tmp.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.directory(), tmp.path());
        assert_eq!(config.file_stem(), "sift.log");
    }

    #[test]
    fn log_file_follows_the_utc_date() {
        let evening_west_of_utc = DateTime::parse_from_rfc3339("2026-10-18T23:30:00-05:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            dated_log_file(Path::new("/var/log/sift"), "sift.log", evening_west_of_utc),
            PathBuf::from("/var/log/sift/sift.log.2026-10-19")
        );
    }

    #[test]
    fn default_directory_is_named_after_the_app() {
        let dir = default_data_dir("sift-tests");
        assert!(dir.ends_with("sift-tests"));
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/logs")), home.join("logs"));
        }
        assert_eq!(expand_home(Path::new("/var/log")), PathBuf::from("/var/log"));
    }

    #[test]
    fn log_format_parses_lowercase() {
        let format: LogFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, LogFormat::Json);
    }
}

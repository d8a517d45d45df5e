use sift_common::observability::LogFormat;
use sift_common::{AuthScheme, SourcePolicy};
use sift_config::SiftConfigLoader;
use serial_test::serial;
use std::{fs, path::PathBuf, time::Duration};
use tempfile::TempDir;

/// Helper to write a YAML file in a temp dir and return its path.
fn write_yaml(tmp: &TempDir, name: &str, yaml: &str) -> PathBuf {
    let p = tmp.path().join(name);
    fs::write(&p, yaml).expect("write yaml");
    p
}

const NO_PROVIDER_ENV: [(&str, Option<&str>); 2] =
    [("QIANFAN_API_KEY", None), ("QIANFAN_APP_ID", None)];

#[test]
#[serial]
fn file_values_are_loaded_and_expanded() {
    let tmp = TempDir::new().unwrap();
    let file_yaml = r#"
server:
  bind: "127.0.0.1:8088"
provider:
  endpoint: "http://localhost:9000/v2/chat/completions"
  api_key: "${SIFT_TEST_KEY}"
  app_id: "app-file"
  model: "ernie-4.0-8k"
  temperature: 0.5
  max_tokens: 512
  timeout_secs: 30
  auth_scheme: bearer
analysis:
  source_policy: lenient
  system_turn: true
  validate_shape: true
logging:
  format: json
  stderr: false
  filter: "debug"
"#;
    let p = write_yaml(&tmp, "sift.yaml", file_yaml);

    temp_env::with_vars(
        [
            ("SIFT_TEST_KEY", Some("bce-v3/ALTAK-file")),
            ("QIANFAN_API_KEY", None),
            ("QIANFAN_APP_ID", None),
        ],
        || {
            let settings = SiftConfigLoader::new().with_file(&p).load().unwrap();

            assert_eq!(settings.server.bind, "127.0.0.1:8088");
            assert_eq!(settings.provider.model.as_deref(), Some("ernie-4.0-8k"));
            assert_eq!(settings.provider.temperature, 0.5);
            assert_eq!(settings.provider.max_tokens, 512);
            assert_eq!(settings.provider.timeout(), Some(Duration::from_secs(30)));
            assert_eq!(settings.provider.auth_scheme, AuthScheme::Bearer);
            assert_eq!(settings.analysis.source_policy, SourcePolicy::Lenient);
            assert!(settings.analysis.system_turn);
            assert!(settings.analysis.validate_shape);
            assert_eq!(settings.logging.format, LogFormat::Json);
            assert!(!settings.logging.stderr);

            let creds = settings.credentials().unwrap();
            assert_eq!(creds.api_key, "bce-v3/ALTAK-file");
            assert_eq!(creds.app_id, "app-file");
        },
    );
}

#[test]
#[serial]
fn missing_optional_file_falls_back_to_defaults() {
    let tmp = TempDir::new().unwrap();
    temp_env::with_vars(NO_PROVIDER_ENV, || {
        let settings = SiftConfigLoader::new()
            .with_optional_file(tmp.path().join("absent.yaml"))
            .load()
            .unwrap();
        assert_eq!(settings.server.bind, "0.0.0.0:3000");
        let status = settings.credentials().unwrap_err();
        assert!(!status.has_api_key && !status.has_app_id);
    });
}

#[test]
#[serial]
fn missing_required_file_is_an_error() {
    let tmp = TempDir::new().unwrap();
    let result = SiftConfigLoader::new()
        .with_file(tmp.path().join("absent.yaml"))
        .load();
    assert!(result.is_err());
}

#[test]
#[serial]
fn prefixed_env_overrides_the_file_and_coerces_types() {
    temp_env::with_vars(
        [
            ("SIFT__SERVER__BIND", Some("127.0.0.1:4000")),
            ("SIFT__PROVIDER__MAX_TOKENS", Some("1024")),
            ("SIFT__ANALYSIS__SYSTEM_TURN", Some("true")),
            ("QIANFAN_API_KEY", None),
            ("QIANFAN_APP_ID", None),
        ],
        || {
            let settings = SiftConfigLoader::new()
                .with_yaml_str("server:\n  bind: \"0.0.0.0:9999\"\nprovider:\n  max_tokens: 10")
                .load()
                .unwrap();
            assert_eq!(settings.server.bind, "127.0.0.1:4000");
            assert_eq!(settings.provider.max_tokens, 1024);
            assert!(settings.analysis.system_turn);
        },
    );
}

#[test]
#[serial]
fn qianfan_variables_win_over_everything() {
    temp_env::with_vars(
        [
            ("QIANFAN_API_KEY", Some("bce-v3/ALTAK-env")),
            ("QIANFAN_APP_ID", Some("app-env")),
        ],
        || {
            let settings = SiftConfigLoader::new()
                .with_yaml_str("provider:\n  api_key: from-yaml\n  app_id: from-yaml")
                .load()
                .unwrap();
            let creds = settings.credentials().unwrap();
            assert_eq!(creds.api_key, "bce-v3/ALTAK-env");
            assert_eq!(creds.app_id, "app-env");
        },
    );
}

#[test]
#[serial]
fn unresolved_placeholder_reports_the_missing_credential() {
    temp_env::with_vars(
        [
            ("SIFT_UNSET_KEY", None::<&str>),
            ("QIANFAN_API_KEY", None),
            ("QIANFAN_APP_ID", None),
        ],
        || {
            let settings = SiftConfigLoader::new()
                .with_yaml_str("provider:\n  api_key: \"${SIFT_UNSET_KEY}\"\n  app_id: app-1")
                .load()
                .unwrap();
            let status = settings.credentials().unwrap_err();
            assert!(!status.has_api_key);
            assert!(status.has_app_id);
        },
    );
}

use super::*;

use std::io::Write;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("temp config");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

fn no_env() -> Option<config::Map<String, String>> {
    Some(config::Map::new())
}

#[test]
fn explicit_missing_file_is_a_config_error() {
    let missing = std::env::temp_dir().join("rentmanager-settings-that-does-not-exist.toml");
    let err = Settings::load_with_env(Some(&missing), no_env()).expect_err("missing file");
    assert!(matches!(err, ClientError::Config(_)));
}

#[test]
fn file_values_override_defaults_and_url_is_normalized() {
    let file = write_config(
        r#"
api_base_url = "https://rent.example.com/"
request_timeout_secs = 5
"#,
    );

    let settings = Settings::load_with_env(Some(file.path()), no_env()).expect("settings");
    assert_eq!(settings.api_base_url, "https://rent.example.com");
    assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    assert_eq!(settings.log_filter, "info");
}

#[test]
fn environment_overrides_file() {
    let file = write_config("api_base_url = \"http://file.example\"\n");
    let mut env = config::Map::new();
    env.insert(
        "RENTMANAGER__API_BASE_URL".to_string(),
        "http://env.example:9000".to_string(),
    );
    env.insert(
        "RENTMANAGER__REQUEST_TIMEOUT_SECS".to_string(),
        "12".to_string(),
    );

    let settings = Settings::load_with_env(Some(file.path()), Some(env)).expect("settings");
    assert_eq!(settings.api_base_url, "http://env.example:9000");
    assert_eq!(settings.request_timeout_secs, 12);
}

#[test]
fn rejects_non_http_base_url() {
    let err = Settings::default()
        .with_api_base_url("ftp://rent.example.com")
        .expect_err("scheme");
    assert!(err.to_string().contains("http or https"));

    let err = Settings::default()
        .with_api_base_url("   ")
        .expect_err("empty");
    assert!(matches!(err, ClientError::Config(_)));
}

#[test]
fn zero_timeout_is_rejected() {
    let settings = Settings {
        request_timeout_secs: 0,
        ..Settings::default()
    };
    assert!(settings.validated().is_err());
}

#[test]
fn explicit_data_dir_wins() {
    let settings = Settings {
        data_dir: Some(PathBuf::from("/tmp/rentmanager-test")),
        ..Settings::default()
    };
    assert_eq!(
        settings.resolve_data_dir().expect("data dir"),
        PathBuf::from("/tmp/rentmanager-test")
    );
}

#[test]
fn renders_effective_settings_as_toml() {
    let rendered = Settings::default().to_toml().expect("toml");
    assert!(rendered.contains("api_base_url = \"http://127.0.0.1:8080\""));
    assert!(!rendered.contains("data_dir"));
}

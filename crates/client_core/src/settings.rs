use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_CONFIG_FILE: &str = "rentmanager.toml";
pub const ENV_PREFIX: &str = "RENTMANAGER";
const APP_DIR_NAME: &str = "rentmanager";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8080".into(),
            request_timeout_secs: 30,
            data_dir: None,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    /// Defaults, then the TOML file (explicit path, or `rentmanager.toml` in
    /// the working directory when present), then `RENTMANAGER__*` variables.
    pub fn load(config_path: Option<&Path>) -> ClientResult<Self> {
        Self::load_with_env(config_path, None)
    }

    /// Same as [`Settings::load`] with an injected environment instead of the
    /// process one.
    pub fn load_with_env(
        config_path: Option<&Path>,
        env: Option<config::Map<String, String>>,
    ) -> ClientResult<Self> {
        let file_source = match config_path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file_source)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .and_then(|cfg| cfg.try_deserialize())
            .map_err(|err| ClientError::Config(err.to_string()))?;

        settings.validated()
    }

    pub fn validated(mut self) -> ClientResult<Self> {
        self.api_base_url = normalize_base_url(&self.api_base_url)?;
        if self.request_timeout_secs == 0 {
            return Err(ClientError::Config(
                "request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.log_filter.trim().is_empty() {
            self.log_filter = Settings::default().log_filter;
        }
        Ok(self)
    }

    pub fn with_api_base_url(mut self, api_base_url: &str) -> ClientResult<Self> {
        self.api_base_url = normalize_base_url(api_base_url)?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn resolve_data_dir(&self) -> ClientResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_local_dir().ok_or_else(|| {
            ClientError::Config("unable to resolve local app data dir; set data_dir".into())
        })?;
        Ok(base.join(APP_DIR_NAME))
    }

    pub fn to_toml(&self) -> ClientResult<String> {
        toml::to_string_pretty(self).map_err(|err| ClientError::Config(err.to_string()))
    }
}

fn normalize_base_url(raw: &str) -> ClientResult<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ClientError::Config("api_base_url must not be empty".into()));
    }
    let url = Url::parse(raw)
        .map_err(|err| ClientError::Config(format!("invalid api_base_url '{raw}': {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::Config(format!(
            "api_base_url must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ClientError::Config(format!(
            "api_base_url '{raw}' has no host"
        )));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;

use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::Context;
use url::Url;

pub const SETTINGS_FILE: &str = "contracts.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_url: String,
    pub credential_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".into(),
            credential_path: default_credential_path(),
        }
    }
}

fn default_credential_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contracts")
        .join("session.json")
}

/// Defaults, then `contracts.toml` in the working directory, then the
/// environment. Command-line overrides are applied by the caller.
pub fn load_settings() -> Settings {
    let file = fs::read_to_string(SETTINGS_FILE).ok();
    load_settings_from(file.as_deref(), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) {
            if let Some(v) = file_cfg.get("server_url") {
                settings.server_url = v.clone();
            }
            if let Some(v) = file_cfg.get("credential_path") {
                settings.credential_path = PathBuf::from(v);
            }
        }
    }

    if let Some(v) = env("CONTRACTS_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = env("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = env("CONTRACTS_CREDENTIAL_PATH") {
        settings.credential_path = PathBuf::from(v);
    }
    if let Some(v) = env("APP__CREDENTIAL_PATH") {
        settings.credential_path = PathBuf::from(v);
    }

    settings
}

/// Rejects anything that is not an absolute http(s) URL and strips the
/// trailing slash so paths can be appended directly.
pub fn validate_server_url(raw: &str) -> anyhow::Result<String> {
    let parsed = Url::parse(raw.trim())
        .with_context(|| format!("server url '{raw}' is not a valid URL"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("server url '{raw}' must use http or https");
    }
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;

//! Process-wide SMP settings, read once from `SMP_*` environment variables.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://api.amexgbt.com";
pub const DEFAULT_COMPANY_ID: &str = "5281df97-5579-4ea5-a6ce-620f546b6d8b";
pub const DEFAULT_GDS_CODE: &str = "DUMMY";
pub const DEFAULT_OFFICE_ID: &str = "TEST";

const ENV_PREFIX: &str = "SMP";
const ECHO_TOKEN_PREFIX: &str = "mcp-smp";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid SMP_API_BASE_URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Whether searches hit the upstream API or return canned data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SmpMode {
    #[default]
    Fake,
    Real,
}

impl fmt::Display for SmpMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SmpMode::Fake => f.write_str("fake"),
            SmpMode::Real => f.write_str("real"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmpConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_company_id")]
    pub company_id: String,
    #[serde(default = "default_gds_code")]
    pub gds_code: String,
    #[serde(default = "default_office_id")]
    pub office_id: String,
    #[serde(default)]
    pub mode: SmpMode,
    pub echo_token: Option<String>,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_api_base_url() -> String { DEFAULT_API_BASE_URL.to_string() }
fn default_company_id() -> String { DEFAULT_COMPANY_ID.to_string() }
fn default_gds_code() -> String { DEFAULT_GDS_CODE.to_string() }
fn default_office_id() -> String { DEFAULT_OFFICE_ID.to_string() }
fn default_log_dir() -> PathBuf { PathBuf::from("logs") }

impl Default for SmpConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            company_id: default_company_id(),
            gds_code: default_gds_code(),
            office_id: default_office_id(),
            mode: SmpMode::default(),
            echo_token: None,
            log_dir: default_log_dir(),
        }
    }
}

impl SmpConfig {
    /// Load from the process environment (`SMP_API_BASE_URL`, `SMP_MODE`, ...).
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX))
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from_source(config::Environment::with_prefix(ENV_PREFIX).source(Some(map)))
    }

    fn from_source(env: config::Environment) -> Result<Self, ConfigError> {
        let settings = config::Config::builder().add_source(env).build()?;
        let config: SmpConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| ConfigError::BaseUrl {
            url: self.api_base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::BaseUrl {
                url: self.api_base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }

        for (name, value) in [
            ("SMP_COMPANY_ID", &self.company_id),
            ("SMP_GDS_CODE", &self.gds_code),
            ("SMP_OFFICE_ID", &self.office_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(name));
            }
        }
        Ok(())
    }

    /// The configured echo token, or a fresh `mcp-smp-{millis}-{suffix}` one.
    pub fn echo_token(&self) -> String {
        match &self.echo_token {
            Some(token) if !token.is_empty() => token.clone(),
            _ => {
                let suffix: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(9)
                    .map(|b| char::from(b).to_ascii_lowercase())
                    .collect();
                format!("{}-{}-{}", ECHO_TOKEN_PREFIX, Utc::now().timestamp_millis(), suffix)
            }
        }
    }
}

//! Configuration loader and validator for the SkillHub client core.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema exactly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub app: App,
    pub api: Api,
    pub payment: Payment,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct App {
    pub request_timeout_seconds: u64,
}

/// Backend REST settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Api {
    pub base_url: String,
}

/// Payment-gateway widget settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Payment {
    pub key: String,
    pub merchant_name: String,
    pub description: String,
    pub theme_color: String,
    pub prefill: Prefill,
}

/// Contact fields prefilled into the payment widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prefill {
    pub name: String,
    pub email: String,
    pub contact: String,
}

/// Load configuration from a YAML file and validate it.
/// - If `path` is None, uses `config.yaml` in the current working directory.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or_else(|| Path::new("config.yaml"));
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Validate a configuration instance.
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.request_timeout_seconds == 0 {
        return Err(ConfigError::Invalid(
            "app.request_timeout_seconds must be > 0",
        ));
    }

    if cfg.api.base_url.trim().is_empty() {
        return Err(ConfigError::Invalid("api.base_url must be non-empty"));
    }
    if reqwest::Url::parse(&cfg.api.base_url).is_err() {
        return Err(ConfigError::Invalid("api.base_url must be a valid URL"));
    }

    if cfg.payment.key.trim().is_empty() {
        return Err(ConfigError::Invalid("payment.key must be non-empty"));
    }
    if cfg.payment.merchant_name.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "payment.merchant_name must be non-empty",
        ));
    }
    if cfg.payment.theme_color.trim().is_empty() {
        return Err(ConfigError::Invalid("payment.theme_color must be non-empty"));
    }

    Ok(())
}

/// Example configuration, also used as the test fixture.
pub fn example() -> &'static str {
    r##"app:
  request_timeout_seconds: 30

api:
  base_url: "http://localhost:5000"

payment:
  key: "rzp_test_BQZeGK1Esi5rzS"
  merchant_name: "SkillHub Learning"
  description: "Payment for courses"
  theme_color: "#3399cc"
  prefill:
    name: "User Name"
    email: "user@example.com"
    contact: "9999999999"
"##
}

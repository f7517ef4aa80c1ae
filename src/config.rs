use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

const TOKEN_ENV: &str = "CLOUDFLARE_API_TOKEN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub cloudflare: CloudflareConfig,
    pub ip: IpConfig,
    pub records: Vec<String>,
    #[serde(default)]
    pub on_duplicate: DuplicatePolicy,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

#[derive(Clone, Deserialize)]
pub struct CloudflareConfig {
    #[serde(default)]
    pub email: Option<String>, // 设置后使用 Global API Key 鉴权
    #[serde(default)]
    pub api_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

// api_token 不能出现在日志里
impl fmt::Debug for CloudflareConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloudflareConfig")
            .field("email", &self.email)
            .field("api_token", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpConfig {
    pub url: String,
    #[serde(default)]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,
    #[serde(default = "default_ip_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotifyConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub to: String,
    #[serde(default = "default_sender")]
    pub from: String,
}

/// What to do when a zone holds more than one record with the watched name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Take the last matching record and log a warning.
    #[default]
    Last,
    /// Refuse to touch the record.
    Error,
}

fn default_api_base() -> String {
    "https://api.cloudflare.com/client/v4".to_string()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_retry_delay() -> u64 {
    2
}

fn default_ip_timeout() -> u64 {
    10
}

fn default_smtp_port() -> u16 {
    25
}

fn default_sender() -> String {
    "ddns-updater@localhost".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let mut config = Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.is_empty() {
                config.cloudflare.api_token = token;
            }
        }

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cloudflare.api_token.trim().is_empty() {
            anyhow::bail!("cloudflare.api_token is empty (or set {})", TOKEN_ENV);
        }
        if self.ip.url.trim().is_empty() {
            anyhow::bail!("ip.url is empty");
        }
        if self.records.is_empty() {
            anyhow::bail!("records list is empty");
        }
        if let Some(record) = self.records.iter().find(|r| r.trim().is_empty()) {
            anyhow::bail!("records contains an empty name: {:?}", record);
        }
        if let Some(ref notify) = self.notify {
            if notify.smtp_host.trim().is_empty() {
                anyhow::bail!("notify.smtp_host is empty");
            }
            if notify.to.trim().is_empty() {
                anyhow::bail!("notify.to is empty");
            }
        }
        Ok(())
    }
}

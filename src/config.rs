use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub portal: PortalConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    pub store: StoreConfig,
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub poll: PollConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PortalConfig {
    pub target_url: String,
    pub login_email: String,
    #[serde(default = "default_email_selector")]
    pub email_selector: String,
    #[serde(default = "default_password_selector")]
    pub password_selector: String,
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,
    /// Container that is visible once the listing has rendered.
    #[serde(default = "default_listing_selector")]
    pub listing_selector: String,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_s: u64,
}

fn default_email_selector() -> String { "#email".to_string() }
fn default_password_selector() -> String { "#password".to_string() }
fn default_submit_selector() -> String { "button[type='submit']".to_string() }
fn default_listing_selector() -> String { r#"[data-testid="cards-grid"]"#.to_string() }
fn default_wait_timeout() -> u64 { 30 }

impl PortalConfig {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_secs(self.wait_timeout_s)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowserConfig {
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    #[serde(default = "default_headless")]
    pub headless: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    #[serde(default = "default_window_height")]
    pub window_height: u32,
}

fn default_webdriver_url() -> String { "http://localhost:9515".to_string() }
fn default_headless() -> bool { true }
fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36".to_string()
}
fn default_window_width() -> u32 { 1920 }
fn default_window_height() -> u32 { 1080 }

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            user_agent: default_user_agent(),
            window_width: default_window_width(),
            window_height: default_window_height(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub spreadsheet_id: String,
    /// A1 range covering the data rows, e.g. `dealBroker!A2:I`.
    pub range: String,
    /// Path to the service-account JSON key.
    pub credentials_file: String,
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
    #[serde(default = "default_store_timeout")]
    pub request_timeout_ms: u64,
}

fn default_sheets_api_base() -> String { "https://sheets.googleapis.com".to_string() }
fn default_store_timeout() -> u64 { 15_000 }

#[derive(Debug, Deserialize, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub recipient: String,
    pub instance_id: String,
    #[serde(default = "default_webhook_timeout")]
    pub timeout_ms: u64,
}

fn default_webhook_timeout() -> u64 { 10_000 }

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval")]
    pub interval_s: u64,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_s: u64,
}

fn default_poll_interval() -> u64 { 5 }
fn default_retry_delay() -> u64 { 5 }

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_s: default_poll_interval(),
            retry_delay_s: default_retry_delay(),
        }
    }
}

/// Whether notifications depend on the append succeeding.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum NotifyGating {
    /// Dispatch for every new lead whatever the append outcome.
    #[default]
    Independent,
    /// Dispatch only after a successful append.
    AfterPersist,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    #[serde(default = "default_high_revenue_keywords")]
    pub high_revenue_keywords: Vec<String>,
    #[serde(default)]
    pub gating: NotifyGating,
}

fn default_high_revenue_keywords() -> Vec<String> {
    vec!["400 mil".to_string(), "milhões".to_string()]
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            high_revenue_keywords: default_high_revenue_keywords(),
            gating: NotifyGating::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Log to this file instead of stderr.
    #[serde(default)]
    pub file: Option<String>,
}

fn default_log_filter() -> String { "lead_watch=info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse config TOML")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll.interval_s)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.poll.retry_delay_s)
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let path = Path::new(ENV_FILE);
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return,
        };
        // Strip BOM if present (common on Windows-created files)
        let content = content.strip_prefix('\u{feff}').unwrap_or(&content);
        for (key, value) in parse_env_lines(content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }

    /// Portal password, from `LEAD_WATCH_LOGIN_PASSWORD`.
    pub fn login_password() -> Result<String> {
        required_env("LEAD_WATCH_LOGIN_PASSWORD")
    }

    /// Bearer token for the messaging webhook, from `LEAD_WATCH_WEBHOOK_TOKEN`.
    pub fn webhook_token() -> Result<String> {
        required_env("LEAD_WATCH_WEBHOOK_TOKEN")
    }
}

fn required_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !sanitize_secret(&value).is_empty() => Ok(sanitize_secret(&value)),
        _ => anyhow::bail!("{} is not set (environment or {})", key, ENV_FILE),
    }
}

/// `KEY=VALUE` pairs from .env content; comments and blank lines skipped,
/// surrounding quotes stripped.
fn parse_env_lines(content: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for line in content.lines() {
        let line = line.trim().trim_matches('\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim().trim_matches('"').trim_matches('\'');
            out.push((key.to_string(), value.to_string()));
        }
    }
    out
}

/// Strip carriage returns, BOM, and other invisible chars from a secret.
fn sanitize_secret(raw: &str) -> String {
    raw.replace(['\r', '\u{feff}', '\u{200b}'], "")
        .trim()
        .to_string()
}

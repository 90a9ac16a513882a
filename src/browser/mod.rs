pub mod login;
pub mod webdriver;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// The single long-lived browser page. Owned by the loop controller and
/// never shared, so methods take `&self` only for adapter convenience.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()>;
    async fn send_keys(&self, selector: &str, text: &str) -> Result<()>;
    async fn click(&self, selector: &str) -> Result<()>;
    /// Evaluate `script` in the page and return its JSON result.
    async fn evaluate(&self, script: &str) -> Result<Value>;
    async fn reload(&self) -> Result<()>;
}

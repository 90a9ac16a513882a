use super::PageSession;
use crate::config::BrowserConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thirtyfour::prelude::ElementQueryable;
use thirtyfour::{By, ChromiumLikeCapabilities, DesiredCapabilities, WebDriver};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chrome page driven over the W3C WebDriver protocol (chromedriver).
pub struct WebDriverPage {
    driver: WebDriver,
}

impl WebDriverPage {
    pub async fn start(config: &BrowserConfig) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        if config.headless {
            caps.set_headless().context("failed to set headless")?;
            caps.add_arg("--disable-gpu").context("failed to add chrome arg")?;
        }
        caps.add_arg(&format!("--user-agent={}", config.user_agent))
            .context("failed to set user agent")?;
        caps.add_arg(&format!(
            "--window-size={},{}",
            config.window_width, config.window_height
        ))
        .context("failed to set window size")?;

        let driver = WebDriver::new(&config.webdriver_url, caps)
            .await
            .with_context(|| format!("failed to start WebDriver session at {}", config.webdriver_url))?;

        tracing::info!(url = %config.webdriver_url, headless = config.headless, "browser session started");
        Ok(Self { driver })
    }

    /// End the browser session.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await.context("failed to quit WebDriver session")
    }
}

#[async_trait]
impl PageSession for WebDriverPage {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.driver
            .goto(url)
            .await
            .with_context(|| format!("navigate to {} failed", url))
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.driver
            .query(By::Css(selector))
            .wait(timeout, WAIT_POLL_INTERVAL)
            .and_displayed()
            .first()
            .await
            .with_context(|| format!("{} not visible within {:?}", selector, timeout))?;
        Ok(())
    }

    async fn send_keys(&self, selector: &str, text: &str) -> Result<()> {
        let element = self
            .driver
            .find(By::Css(selector))
            .await
            .with_context(|| format!("element {} not found", selector))?;
        element
            .send_keys(text)
            .await
            .with_context(|| format!("typing into {} failed", selector))
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self
            .driver
            .query(By::Css(selector))
            .and_displayed()
            .first()
            .await
            .with_context(|| format!("element {} not visible", selector))?;
        element
            .click()
            .await
            .with_context(|| format!("click on {} failed", selector))
    }

    async fn evaluate(&self, script: &str) -> Result<Value> {
        let ret = self
            .driver
            .execute(script, Vec::new())
            .await
            .context("script evaluation failed")?;
        Ok(ret.json().clone())
    }

    async fn reload(&self) -> Result<()> {
        self.driver.refresh().await.context("page reload failed")
    }
}

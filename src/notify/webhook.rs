use super::message::OutboundMessage;
use super::MessageSink;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Messaging API reached by a bearer-authenticated JSON POST.
pub struct WebhookClient {
    client: Client,
    url: String,
    token: String,
}

impl WebhookClient {
    pub fn new(url: &str, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build webhook HTTP client")?;
        Ok(Self {
            client,
            url: url.to_string(),
            token,
        })
    }
}

#[async_trait]
impl MessageSink for WebhookClient {
    async fn send(&self, message: &OutboundMessage) -> Result<()> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(message)
            .send()
            .await
            .context("webhook request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("webhook rejected message ({}): {}", status, body);
        }
        Ok(())
    }
}

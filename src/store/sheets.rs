use super::auth::ServiceAccountAuth;
use super::types::{AppendBody, AppendResponse, ValueRange};
use super::LeadStore;
use crate::config::StoreConfig;
use crate::lead::types::PersistedRow;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Google Sheets v4 `spreadsheets.values` client for one sheet range.
pub struct SheetsStore {
    client: Client,
    auth: Arc<ServiceAccountAuth>,
    base_url: String,
    spreadsheet_id: String,
    range: String,
}

/// `{base}/v4/spreadsheets/{id}/values/{range}{suffix}` with each segment
/// percent-encoded.
fn values_url(base: &str, spreadsheet_id: &str, range: &str, suffix: &str) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("invalid store api_base: {}", base))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("store api_base cannot be a base URL: {}", base))?
        .pop_if_empty()
        .extend(["v4", "spreadsheets", spreadsheet_id, "values"])
        .push(&format!("{}{}", range, suffix));
    Ok(url)
}

impl SheetsStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .context("failed to build store HTTP client")?;
        let auth = ServiceAccountAuth::from_file(Path::new(&config.credentials_file), client.clone())?;
        Ok(Self::with_auth(config, client, Arc::new(auth)))
    }

    pub fn with_auth(config: &StoreConfig, client: Client, auth: Arc<ServiceAccountAuth>) -> Self {
        Self {
            client,
            auth,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            range: config.range.clone(),
        }
    }

    /// Pre-flight check: credentials work and the range is readable.
    pub async fn preflight_check(&self) -> Result<usize> {
        let rows = self
            .read_rows()
            .await
            .context("store pre-flight read failed")?;
        Ok(rows.len())
    }
}

#[async_trait]
impl LeadStore for SheetsStore {
    async fn read_rows(&self) -> Result<Vec<Vec<Value>>> {
        let url = values_url(&self.base_url, &self.spreadsheet_id, &self.range, "")?;
        let token = self.auth.access_token().await?;

        let resp = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .context("GET values failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("GET values {} failed ({}): {}", self.range, status, body);
        }

        let parsed: ValueRange = resp.json().await.context("failed to parse values response")?;
        Ok(parsed.values)
    }

    async fn append_rows(&self, rows: Vec<PersistedRow>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let mut url = values_url(&self.base_url, &self.spreadsheet_id, &self.range, ":append")?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let token = self.auth.access_token().await?;

        let body = AppendBody {
            values: rows.into_iter().map(PersistedRow::into_cells).collect(),
        };
        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .context("append request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("append to {} failed ({}): {}", self.range, status, body);
        }

        let parsed: AppendResponse = resp.json().await.context("failed to parse append response")?;
        if let Some(updates) = parsed.updates {
            tracing::debug!(
                range = %updates.updated_range,
                rows = updates.updated_rows,
                "store append acknowledged"
            );
        }
        Ok(())
    }
}

use super::types::{ServiceAccountKey, TokenResponse};
use anyhow::{Context, Result};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const TOKEN_LIFETIME_S: u64 = 3600;
/// Refresh this long before the cached token expires.
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Claims of the self-signed assertion exchanged for an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// OAuth2 access tokens for a service account, minted from an RS256 JWT
/// assertion and cached until shortly before expiry.
pub struct ServiceAccountAuth {
    client: Client,
    client_email: String,
    token_uri: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn from_file(path: &Path, client: Client) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
        let key: ServiceAccountKey =
            serde_json::from_str(&content).context("Failed to parse service-account JSON")?;
        Self::new(key, client)
    }

    pub fn new(key: ServiceAccountKey, client: Client) -> Result<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .context("Failed to parse service-account RSA key")?;
        Ok(Self {
            client,
            client_email: key.client_email,
            token_uri: key.token_uri,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    pub fn timestamp_s() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    /// Current access token, fetching a new one when needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(ref c) = *cached {
            if Instant::now() + REFRESH_MARGIN < c.expires_at {
                return Ok(c.token.clone());
            }
        }

        let fresh = self.fetch_token().await?;
        let token = fresh.access_token.clone();
        *cached = Some(CachedToken {
            token: fresh.access_token,
            expires_at: Instant::now() + Duration::from_secs(fresh.expires_in),
        });
        tracing::debug!(expires_in = fresh.expires_in, "store access token refreshed");
        Ok(token)
    }

    async fn fetch_token(&self) -> Result<TokenResponse> {
        let assertion = self.sign_assertion(Self::timestamp_s())?;
        let resp = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .context("token request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("token exchange failed ({}): {}", status, body);
        }
        resp.json().await.context("failed to parse token response")
    }

    fn claims(&self, issued_at: u64) -> AssertionClaims {
        AssertionClaims {
            iss: self.client_email.clone(),
            scope: SHEETS_SCOPE.to_string(),
            aud: self.token_uri.clone(),
            iat: issued_at,
            exp: issued_at + TOKEN_LIFETIME_S,
        }
    }

    /// Signed JWT assertion for the token endpoint.
    fn sign_assertion(&self, issued_at: u64) -> Result<String> {
        encode(
            &Header::new(Algorithm::RS256),
            &self.claims(issued_at),
            &self.encoding_key,
        )
        .context("Failed to sign token assertion")
    }
}

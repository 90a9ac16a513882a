use super::PageSession;
use crate::config::PortalConfig;
use anyhow::{Context, Result};

/// Sign in to the portal and wait for the listing to render.
/// Any failure here is fatal for the process.
pub async fn login(page: &dyn PageSession, portal: &PortalConfig, password: &str) -> Result<()> {
    let timeout = portal.wait_timeout();

    page.navigate(&portal.target_url).await?;
    page.wait_visible(&portal.email_selector, timeout)
        .await
        .context("login form did not appear")?;
    page.send_keys(&portal.email_selector, &portal.login_email).await?;
    page.send_keys(&portal.password_selector, password).await?;
    page.click(&portal.submit_selector).await?;
    page.wait_visible(&portal.listing_selector, timeout)
        .await
        .context("listing did not appear after login (bad credentials?)")?;

    tracing::info!(email = %portal.login_email, "logged in");
    Ok(())
}

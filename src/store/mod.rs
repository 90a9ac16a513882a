pub mod auth;
pub mod sheets;
pub mod types;

use crate::lead::types::{PersistedRow, NAME_COLUMN};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;

/// Names already persisted, rebuilt from a full read every cycle.
pub type KnownIdentitySet = HashSet<String>;

/// Append-only row store.
///
/// Correctness of deduplication assumes this process is the only writer:
/// nothing guards the gap between `read_rows` and `append_rows`.
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Every row in the configured range, as raw cells.
    async fn read_rows(&self) -> Result<Vec<Vec<Value>>>;

    /// Append all rows in one call. Either all arrive or none do.
    async fn append_rows(&self, rows: Vec<PersistedRow>) -> Result<()>;

    /// Name projection of the current rows.
    async fn read_identities(&self) -> Result<KnownIdentitySet> {
        Ok(identities_from_rows(&self.read_rows().await?))
    }
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Names from column 1, verbatim (matched against `Lead::name` as is);
/// rows too short to have one are ignored.
pub fn identities_from_rows(rows: &[Vec<Value>]) -> KnownIdentitySet {
    rows.iter()
        .filter_map(|row| row.get(NAME_COLUMN))
        .map(cell_text)
        .collect()
}

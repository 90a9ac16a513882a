pub mod auction_cards;
pub mod extractor;
pub mod types;

use anyhow::Result;
use serde_json::Value;
use types::RawLeadFields;

/// A page-scraping script plus the parser for what it returns. Selectors
/// track external markup, so strategies are versioned and swappable
/// independently of the pipeline.
pub trait ExtractionStrategy: Send + Sync {
    /// Stable identifier, e.g. `auction-cards/v1`, for logs.
    fn id(&self) -> &str;

    /// Script evaluated in the page. Must return a JSON array.
    fn script(&self) -> &str;

    /// Turn the evaluated snapshot into per-card fields. An `Err` means the
    /// snapshot itself is unusable; individual bad cards are skipped.
    fn parse(&self, snapshot: &Value) -> Result<Vec<RawLeadFields>>;
}

//! Auction-card listing extraction.
//!
//! Cards: `div[data-testid="auction-card"]` inside the `cards-grid` container.
//! Labeled fields are read from the sibling after a marker `<span>`; price,
//! remaining time, name and type are located by class/attribute signature.

use super::types::RawLeadFields;
use super::ExtractionStrategy;
use anyhow::Result;
use serde_json::{Map, Value};

const STRATEGY_ID: &str = "auction-cards/v1";

/// Returns an array of objects; fields the card lacks are `null`.
const EXTRACTION_SCRIPT: &str = r#"
return (function() {
    const cards = document.querySelectorAll('div[data-testid="auction-card"]');
    const results = [];

    cards.forEach(card => {
        const textOf = (selector) => {
            const el = card.querySelector(selector);
            return el ? el.innerText : null;
        };

        const byLabel = (label) => {
            for (const span of card.getElementsByTagName('span')) {
                if (span.textContent.trim() === label) {
                    return span.nextElementSibling ? span.nextElementSibling.textContent : null;
                }
            }
            return null;
        };

        const title = card.querySelector('p[title]');
        const badge = card.querySelector('div.rounded-md span.text-neutral-50')
            || card.querySelector("div[class*='bg-'] span.text-xs");

        results.push({
            name: title ? title.getAttribute('title') : null,
            type: badge ? badge.innerText : null,
            revenue_bracket: byLabel('Faturamento'),
            segment: byLabel('Segmento'),
            product: byLabel('Tipo de produto'),
            channel: byLabel('Canal'),
            price: textOf('div.rounded-bl-xl'),
            remaining_time: textOf('div.rounded-br-xl span.tabular-nums'),
        });
    });

    return results;
})();
"#;

#[derive(Debug, Default, Clone, Copy)]
pub struct AuctionCards;

impl AuctionCards {
    pub fn new() -> Self {
        Self
    }
}

/// Scalar JSON as text; anything else counts as absent.
fn text_field(card: &Map<String, Value>, key: &str) -> Option<String> {
    match card.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Parse the script's return value into per-card fields.
/// Public for unit testing with fixtures.
pub fn parse_auction_cards(snapshot: &Value) -> Result<Vec<RawLeadFields>> {
    let Some(cards) = snapshot.as_array() else {
        anyhow::bail!("extraction snapshot is not an array: {}", snapshot);
    };

    let mut out = Vec::with_capacity(cards.len());
    for (index, card) in cards.iter().enumerate() {
        let Some(card) = card.as_object() else {
            tracing::warn!(index, "skipping card that is not an object");
            continue;
        };
        out.push(RawLeadFields {
            name: text_field(card, "name"),
            kind: text_field(card, "type"),
            revenue_bracket: text_field(card, "revenue_bracket"),
            segment: text_field(card, "segment"),
            product: text_field(card, "product"),
            channel: text_field(card, "channel"),
            price: text_field(card, "price"),
            remaining_time: text_field(card, "remaining_time"),
        });
    }
    Ok(out)
}

impl ExtractionStrategy for AuctionCards {
    fn id(&self) -> &str {
        STRATEGY_ID
    }

    fn script(&self) -> &str {
        EXTRACTION_SCRIPT
    }

    fn parse(&self, snapshot: &Value) -> Result<Vec<RawLeadFields>> {
        parse_auction_cards(snapshot)
    }
}

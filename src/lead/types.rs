//! Normalized lead records used by the pipeline (strategy-agnostic).

pub const UNKNOWN_NAME: &str = "Desconhecido";
pub const DEFAULT_KIND: &str = "Lead";
pub const NOT_AVAILABLE: &str = "N/A";

/// One listing card as seen at extraction time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lead {
    /// Identity key. Kept exactly as scraped (no trimming or whitespace
    /// collapse) so it compares equal to the name column written by any
    /// earlier run. Only a missing or all-blank name becomes
    /// [`UNKNOWN_NAME`].
    pub name: String,
    pub kind: String,
    pub revenue_bracket: String,
    pub segment: String,
    pub product: String,
    pub channel: String,
    pub price: String,
    pub remaining_time: String,
}

/// Per-card fields as returned by an extraction strategy. Anything the
/// strategy could not locate on the card is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLeadFields {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub revenue_bracket: Option<String>,
    pub segment: Option<String>,
    pub product: Option<String>,
    pub channel: Option<String>,
    pub price: Option<String>,
    pub remaining_time: Option<String>,
}

/// Collapse inner whitespace (line breaks from `innerText`) and trim.
/// Blank values become `None`.
fn clean(value: Option<String>) -> Option<String> {
    let value = value?;
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

impl From<RawLeadFields> for Lead {
    fn from(raw: RawLeadFields) -> Self {
        let or_na = |v: Option<String>| clean(v).unwrap_or_else(|| NOT_AVAILABLE.to_string());
        Self {
            name: raw
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            kind: clean(raw.kind).unwrap_or_else(|| DEFAULT_KIND.to_string()),
            revenue_bracket: or_na(raw.revenue_bracket),
            segment: or_na(raw.segment),
            product: or_na(raw.product),
            channel: or_na(raw.channel),
            price: or_na(raw.price),
            remaining_time: or_na(raw.remaining_time),
        }
    }
}

/// Format of the first store column.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Append-only store row. Field order mirrors the sheet's column order,
/// which other consumers of the sheet depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRow {
    pub timestamp: String,
    pub name: String,
    pub kind: String,
    pub segment: String,
    pub revenue_bracket: String,
    pub product: String,
    pub channel: String,
    pub price: String,
    pub remaining_time: String,
}

/// Column holding the identity key in a persisted row.
pub const NAME_COLUMN: usize = 1;

impl PersistedRow {
    pub fn from_lead(lead: &Lead, timestamp: &str) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            name: lead.name.clone(),
            kind: lead.kind.clone(),
            segment: lead.segment.clone(),
            revenue_bracket: lead.revenue_bracket.clone(),
            product: lead.product.clone(),
            channel: lead.channel.clone(),
            price: lead.price.clone(),
            remaining_time: lead.remaining_time.clone(),
        }
    }

    /// Cells in wire order:
    /// `[timestamp, name, type, segment, revenue_bracket, product, channel, price, remaining_time]`.
    pub fn into_cells(self) -> Vec<String> {
        vec![
            self.timestamp,
            self.name,
            self.kind,
            self.segment,
            self.revenue_bracket,
            self.product,
            self.channel,
            self.price,
            self.remaining_time,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_raw() -> RawLeadFields {
        RawLeadFields {
            name: Some("Ana Silva".to_string()),
            kind: Some("Leilão".to_string()),
            revenue_bracket: Some("De 400 mil a 1 milhão".to_string()),
            segment: Some("Varejo".to_string()),
            product: Some("Assessoria".to_string()),
            channel: Some("Inbound".to_string()),
            price: Some("R$ 1.200".to_string()),
            remaining_time: Some("00:12:30".to_string()),
        }
    }

    #[test]
    fn test_missing_labeled_field_only_affects_that_field() {
        let raw = RawLeadFields {
            segment: None,
            ..full_raw()
        };
        let lead = Lead::from(raw);
        assert_eq!(lead.segment, NOT_AVAILABLE);
        assert_eq!(lead.name, "Ana Silva");
        assert_eq!(lead.revenue_bracket, "De 400 mil a 1 milhão");
        assert_eq!(lead.channel, "Inbound");
        assert_eq!(lead.price, "R$ 1.200");
    }

    #[test]
    fn test_missing_name_and_type_use_their_own_sentinels() {
        let lead = Lead::from(RawLeadFields::default());
        assert_eq!(lead.name, UNKNOWN_NAME);
        assert_eq!(lead.kind, DEFAULT_KIND);
        assert_eq!(lead.remaining_time, NOT_AVAILABLE);
    }

    #[test]
    fn test_blank_values_count_as_missing() {
        let raw = RawLeadFields {
            price: Some("  \n ".to_string()),
            ..full_raw()
        };
        assert_eq!(Lead::from(raw).price, NOT_AVAILABLE);
    }

    #[test]
    fn test_inner_line_breaks_collapse() {
        let raw = RawLeadFields {
            price: Some("R$\n 1.200 ".to_string()),
            ..full_raw()
        };
        assert_eq!(Lead::from(raw).price, "R$ 1.200");
    }

    #[test]
    fn test_name_is_kept_verbatim() {
        let raw = RawLeadFields {
            name: Some(" Ana  Silva".to_string()),
            ..full_raw()
        };
        assert_eq!(Lead::from(raw).name, " Ana  Silva");

        let raw = RawLeadFields {
            name: Some(" \n ".to_string()),
            ..full_raw()
        };
        assert_eq!(Lead::from(raw).name, UNKNOWN_NAME);
    }

    #[test]
    fn test_row_cells_follow_column_contract() {
        let lead = Lead::from(full_raw());
        let cells = PersistedRow::from_lead(&lead, "01/01/2024 10:00").into_cells();
        assert_eq!(
            cells,
            vec![
                "01/01/2024 10:00",
                "Ana Silva",
                "Leilão",
                "Varejo",
                "De 400 mil a 1 milhão",
                "Assessoria",
                "Inbound",
                "R$ 1.200",
                "00:12:30",
            ]
        );
        assert_eq!(cells[NAME_COLUMN], "Ana Silva");
    }
}

//! Sales analytics query filters.
//!
//! [`SalesFilter`] serializes directly into the query string of the sales
//! endpoints. Absent fields are omitted entirely so the backend applies its
//! own defaults. Fetches are keyed off a settled (debounced) filter, never a
//! raw in-flight edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range. Expands to the `from`/`to` query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

/// Filter parameters accepted by the sales analytics endpoints
/// (`/sales/insights`, `/sales/aggregates/{dimension}`, `/sales/distinct-skus`).
///
/// Kept flat (no nested structs) so it can serialize through a query-string
/// encoder, which only handles primitive values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_gmv: Option<f64>,
}

/// Grouping dimension for `GET /sales/aggregates/{dimension}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateDimension {
    Sku,
    Region,
    State,
    Pincode,
}

impl AggregateDimension {
    #[must_use]
    pub const fn as_path_segment(self) -> &'static str {
        match self {
            Self::Sku => "sku",
            Self::Region => "region",
            Self::State => "state",
            Self::Pincode => "pincode",
        }
    }
}

/// Response of `GET /api/v1/seller/sales/insights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesInsights {
    pub total_gmv: f64,
    pub total_orders: u64,
    pub total_units: u64,
    #[serde(default)]
    pub top_skus: Vec<AggregateRow>,
}

/// Response of `GET /api/v1/seller/sales/freshness`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesFreshness {
    pub last_ingested_at: chrono::DateTime<chrono::Utc>,
    #[serde(default)]
    pub stale: bool,
}

/// One row of an aggregate breakdown (key is the dimension value).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateRow {
    pub key: String,
    pub gmv: f64,
    pub orders: u64,
}

impl SalesFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    #[must_use]
    pub fn with_dates(mut self, range: DateRange) -> Self {
        self.from = Some(range.from);
        self.to = Some(range.to);
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: u32) -> Self {
        self.top_n = Some(top_n);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_serializes_to_nothing() {
        let filter = SalesFilter::default();
        assert!(filter.is_empty());
        let json = serde_json::to_value(&filter).expect("serialize");
        assert_eq!(json, serde_json::json!({}));
    }

    #[test]
    fn date_range_expands_to_from_and_to() {
        let filter = SalesFilter::default().with_dates(DateRange {
            from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            to: NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
        });
        let json = serde_json::to_value(&filter).expect("serialize");
        assert_eq!(json["from"], "2025-01-01");
        assert_eq!(json["to"], "2025-01-31");
    }

    #[test]
    fn set_fields_appear() {
        let filter = SalesFilter::default().with_sku("SKU-9").with_top_n(10);
        let json = serde_json::to_value(&filter).expect("serialize");
        assert_eq!(json["sku"], "SKU-9");
        assert_eq!(json["top_n"], 10);
        assert!(json.get("min_gmv").is_none());
    }
}

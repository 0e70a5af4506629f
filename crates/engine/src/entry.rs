//! The module contains the ledger entry types.
//!
//! Both income and expense events are represented by [`LedgerEntry`]. Rows
//! coming back from the remote data service are deserialized leniently:
//! a missing or non-numeric `quantity`/`price_per_quantity` reads as zero
//! instead of failing the whole row set, and unrecognized `item_type`
//! values are kept verbatim so the aggregators can skip them.
use core::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::EngineError;

/// The kind of a ledger entry.
///
/// Parsing is case-insensitive; anything other than income/expense is not a
/// kind and is excluded from every aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Parse a stored `item_type` value. Returns `None` for unknown kinds.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Canonical lowercase form stored at the create boundary.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded income or expense event.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub item_name: String,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub price_per_quantity: f64,
    #[serde(default)]
    pub item_type: String,
    #[serde(default)]
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub processed: bool,
}

impl LedgerEntry {
    /// Derived total of the entry; never stored.
    pub fn amount(&self) -> f64 {
        self.quantity as f64 * self.price_per_quantity
    }

    pub fn kind(&self) -> Option<EntryKind> {
        EntryKind::parse(&self.item_type)
    }
}

/// A validated entry ready for insertion.
///
/// Built through [`EntryDraft::validate`]; `processed` is always false at
/// creation, it belongs to a downstream consumer.
#[derive(Clone, Debug, Serialize)]
pub struct NewEntry {
    pub item_name: String,
    pub quantity: i64,
    pub price_per_quantity: f64,
    pub item_type: String,
    pub category: String,
    pub date: NaiveDate,
    pub processed: bool,
}

/// An unvalidated entry as submitted by a client.
#[derive(Clone, Debug, Default)]
pub struct EntryDraft {
    pub item_name: Option<String>,
    pub quantity: Option<Value>,
    pub price_per_quantity: Option<Value>,
    pub item_type: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl EntryDraft {
    /// Validate the draft, collecting every offending field name.
    ///
    /// Numeric fields accept JSON numbers and numeric strings. The kind is
    /// matched case-insensitively and normalized to lowercase.
    pub fn validate(self) -> Result<NewEntry, EngineError> {
        let mut invalid = Vec::new();

        let item_name = match self.item_name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                invalid.push("item_name");
                String::new()
            }
        };

        let quantity = match self.quantity.as_ref().and_then(coerce_i64) {
            Some(quantity) if quantity > 0 => quantity,
            _ => {
                invalid.push("quantity");
                0
            }
        };

        let price_per_quantity = match self.price_per_quantity.as_ref().and_then(coerce_f64) {
            Some(price) if price >= 0.0 => price,
            _ => {
                invalid.push("price_per_quantity");
                0.0
            }
        };

        let kind = self.item_type.as_deref().and_then(EntryKind::parse);
        if kind.is_none() {
            invalid.push("item_type");
        }

        let category = match self.category {
            Some(category) if !category.trim().is_empty() => category,
            _ => {
                invalid.push("category");
                String::new()
            }
        };

        let date = match self.date.as_deref().map(parse_iso_date) {
            Some(Some(date)) => date,
            _ => {
                invalid.push("date");
                NaiveDate::default()
            }
        };

        if !invalid.is_empty() {
            return Err(EngineError::Validation(invalid));
        }

        Ok(NewEntry {
            item_name,
            quantity,
            price_per_quantity,
            // `invalid` is empty, so the kind parsed.
            item_type: kind.map(EntryKind::as_str).unwrap_or_default().to_string(),
            category,
            date,
            processed: false,
        })
    }
}

/// Strict `YYYY-MM-DD` parse; rejects timestamps and out-of-range dates.
fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub(crate) fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                // Reject fractional quantities, accept integral floats.
                n.as_f64()
                    .filter(|f| f.fract() == 0.0)
                    .map(|f| f as i64)
            }
        }
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

pub(crate) fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_i64).unwrap_or(0))
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_f64).unwrap_or(0.0))
}

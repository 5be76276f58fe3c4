use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read-only snapshot of one issue as returned by search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Ticket {
    /// Display text for the field stored under `remote_id`. Dates are cut to `YYYY-MM-DD`.
    pub fn text(&self, remote_id: &str) -> Option<String> {
        if remote_id == "key" {
            return Some(self.key.clone());
        }
        self.fields.get(remote_id).and_then(FieldValue::display_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Text(String),
    Named(NamedValue),
    Other(Value),
}

/// Jira's structured option/status objects carry either a `name` or a `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl FieldValue {
    pub fn display_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(text) => Some(date_prefix(text).unwrap_or(text).to_string()),
            FieldValue::Named(named) => named
                .name
                .clone()
                .or_else(|| named.value.clone())
                .or_else(|| serde_json::to_string(&named.extra).ok()),
            FieldValue::Other(value) => Some(value.to_string()),
        }
    }
}

/// `2024-05-01T10:00:00.000+0000` → `2024-05-01`.
fn date_prefix(text: &str) -> Option<&str> {
    let (date, _) = text.split_once('T')?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok().map(|_| date)
}

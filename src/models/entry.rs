use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const LICENSE_PLATE_MAX_LEN: usize = 20;
pub const HOUSE_NUMBER_MAX_LEN: usize = 50;

/// One vehicle passing the checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct VisitorEntry {
    pub id: i64,
    pub license_plate: String,
    pub house_number: String,
    pub timestamp: String,
}

/// Fields to overwrite on an existing entry. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryChanges {
    pub license_plate: Option<String>,
    pub house_number: Option<String>,
}

impl EntryChanges {
    pub fn is_empty(&self) -> bool {
        self.license_plate.is_none() && self.house_number.is_none()
    }
}

/// Substring filters for search. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub license_plate: Option<String>,
    pub house_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryPage {
    pub entries: Vec<VisitorEntry>,
    pub total: i64,
    pub pages: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Fixed-width UTC timestamp so that text ordering matches time ordering.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Trim a raw field, returning `None` if nothing is left.
pub fn normalize_field(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

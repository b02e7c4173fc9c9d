//! Entry and value models.
//!
//! Entries and values are created once at submission time and are
//! immutable afterwards, so there are no update DTOs.

use serde::Serialize;
use sqlx::FromRow;

use formhub_core::types::{DbId, Timestamp};

/// A row from the `form_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormEntry {
    pub id: DbId,
    pub form_id: DbId,
    pub submitter_id: Option<DbId>,
    pub ip: Option<String>,
    pub meta: serde_json::Value,
    pub created_at: Timestamp,
}

/// A row from the `form_values` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FormValue {
    pub id: DbId,
    pub entry_id: DbId,
    pub field_id: DbId,
    pub value: String,
    pub created_at: Timestamp,
}

/// Metadata captured at submission time for a new entry.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub form_id: DbId,
    pub submitter_id: Option<DbId>,
    pub ip: Option<String>,
    pub meta: serde_json::Value,
}

/// An entry with its recorded values, in creation order.
#[derive(Debug, Clone, Serialize)]
pub struct EntryWithValues {
    #[serde(flatten)]
    pub entry: FormEntry,
    pub values: Vec<FormValue>,
}

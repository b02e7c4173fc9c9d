//! Repository for the `form_entries` and `form_values` tables.
//!
//! Entries are insert-only: one entry plus all of its values commit in a
//! single transaction, and nothing here mutates them afterwards.

use sqlx::PgPool;

use formhub_core::forms::submission::StoredValue;
use formhub_core::types::DbId;

use crate::models::entry::{EntryWithValues, FormEntry, FormValue, NewEntry};

const ENTRY_COLUMNS: &str = "id, form_id, submitter_id, ip, meta, created_at";
const VALUE_COLUMNS: &str = "id, entry_id, field_id, value, created_at";

/// Provides creation and listing for form entries.
pub struct EntryRepo;

impl EntryRepo {
    /// Insert one entry and all of its values atomically.
    ///
    /// Either the entry and every value persist, or nothing does.
    pub async fn create_with_values(
        pool: &PgPool,
        input: &NewEntry,
        values: &[StoredValue],
    ) -> Result<FormEntry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let insert_entry = format!(
            "INSERT INTO form_entries (form_id, submitter_id, ip, meta) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {ENTRY_COLUMNS}"
        );
        let entry = sqlx::query_as::<_, FormEntry>(&insert_entry)
            .bind(input.form_id)
            .bind(input.submitter_id)
            .bind(&input.ip)
            .bind(&input.meta)
            .fetch_one(&mut *tx)
            .await?;

        for stored in values {
            sqlx::query("INSERT INTO form_values (entry_id, field_id, value) VALUES ($1, $2, $3)")
                .bind(entry.id)
                .bind(stored.field_id)
                .bind(&stored.value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(entry)
    }

    /// Find an entry with its values.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<EntryWithValues>, sqlx::Error> {
        let entry_query = format!("SELECT {ENTRY_COLUMNS} FROM form_entries WHERE id = $1");
        let Some(entry) = sqlx::query_as::<_, FormEntry>(&entry_query)
            .bind(id)
            .fetch_optional(pool)
            .await?
        else {
            return Ok(None);
        };

        let value_query =
            format!("SELECT {VALUE_COLUMNS} FROM form_values WHERE entry_id = $1 ORDER BY id ASC");
        let values = sqlx::query_as::<_, FormValue>(&value_query)
            .bind(id)
            .fetch_all(pool)
            .await?;

        Ok(Some(EntryWithValues { entry, values }))
    }

    /// List a form's entries with their values, newest entry first.
    pub async fn list_by_form(
        pool: &PgPool,
        form_id: DbId,
    ) -> Result<Vec<EntryWithValues>, sqlx::Error> {
        let entry_query = format!(
            "SELECT {ENTRY_COLUMNS} FROM form_entries \
             WHERE form_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let entries = sqlx::query_as::<_, FormEntry>(&entry_query)
            .bind(form_id)
            .fetch_all(pool)
            .await?;

        let value_query = format!(
            "SELECT {VALUE_COLUMNS} FROM form_values \
             WHERE entry_id IN (SELECT id FROM form_entries WHERE form_id = $1) \
             ORDER BY id ASC"
        );
        let values = sqlx::query_as::<_, FormValue>(&value_query)
            .bind(form_id)
            .fetch_all(pool)
            .await?;

        Ok(entries
            .into_iter()
            .map(|entry| {
                let values = values
                    .iter()
                    .filter(|v| v.entry_id == entry.id)
                    .cloned()
                    .collect();
                EntryWithValues { entry, values }
            })
            .collect())
    }

    /// Count an entry's values (used by atomicity tests).
    pub async fn count_values(pool: &PgPool, form_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM form_values WHERE entry_id IN \
                (SELECT id FROM form_entries WHERE form_id = $1)",
        )
        .bind(form_id)
        .fetch_one(pool)
        .await
    }

    /// Count a form's entries.
    pub async fn count_entries(pool: &PgPool, form_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM form_entries WHERE form_id = $1")
            .bind(form_id)
            .fetch_one(pool)
            .await
    }
}

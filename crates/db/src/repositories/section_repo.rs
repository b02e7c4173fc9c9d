//! Repository for the `form_sections` table.

use sqlx::PgPool;

use formhub_core::types::DbId;

use crate::models::form::{CreateSection, FormSection, UpdateSection};

const COLUMNS: &str = "id, form_id, title, description, sort_order, \
     conditional, is_active, created_at, updated_at";

/// Provides CRUD operations for form sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Insert a new section. When `sort_order` is omitted it defaults to
    /// one past the current maximum within the form.
    pub async fn create(
        pool: &PgPool,
        form_id: DbId,
        input: &CreateSection,
    ) -> Result<FormSection, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_sections \
                (form_id, title, description, sort_order, conditional, is_active) \
             VALUES ($1, $2, $3, \
                     COALESCE($4, (SELECT COALESCE(MAX(sort_order), 0) + 1 \
                                   FROM form_sections WHERE form_id = $1)), \
                     $5, COALESCE($6, true)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormSection>(&query)
            .bind(form_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(&input.conditional)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a section by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormSection>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_sections WHERE id = $1");
        sqlx::query_as::<_, FormSection>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a section. Omitted fields keep their values; an explicit
    /// null `conditional` clears the stored rule.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<FormSection>, sqlx::Error> {
        let query = format!(
            "UPDATE form_sections SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                sort_order = COALESCE($4, sort_order), \
                conditional = CASE WHEN $5 THEN $6 ELSE conditional END, \
                is_active = COALESCE($7, is_active), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormSection>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.sort_order)
            .bind(input.conditional.is_some())
            .bind(input.conditional.clone().flatten())
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a section and its fields in one transaction.
    ///
    /// Values recorded against the deleted fields are left untouched;
    /// entries are historical records.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM form_fields WHERE section_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM form_sections WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }
}

//! Repository for the `form_fields` table.

use sqlx::PgPool;

use formhub_core::types::DbId;

use crate::models::form::{CreateField, FormField, UpdateField};

const COLUMNS: &str = "id, section_id, form_id, name, label, field_type, \
     placeholder, options, validation, sort_order, conditional, is_active, \
     created_at, updated_at";

/// Provides CRUD operations for form fields.
pub struct FieldRepo;

impl FieldRepo {
    /// Whether a field name is already taken within a form, excluding
    /// `exclude_id` (so renaming a field to its own name passes).
    pub async fn name_taken(
        pool: &PgPool,
        form_id: DbId,
        name: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM form_fields \
             WHERE form_id = $1 AND name = $2 AND ($3::bigint IS NULL OR id <> $3))",
        )
        .bind(form_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Insert a new field. When `sort_order` is omitted it defaults to
    /// one past the current maximum within the section.
    pub async fn create(
        pool: &PgPool,
        section_id: DbId,
        form_id: DbId,
        input: &CreateField,
    ) -> Result<FormField, sqlx::Error> {
        let query = format!(
            "INSERT INTO form_fields \
                (section_id, form_id, name, label, field_type, placeholder, \
                 options, validation, sort_order, conditional, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, \
                     COALESCE($8, '{{}}'::jsonb), \
                     COALESCE($9, (SELECT COALESCE(MAX(sort_order), 0) + 1 \
                                   FROM form_fields WHERE section_id = $1)), \
                     $10, COALESCE($11, true)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormField>(&query)
            .bind(section_id)
            .bind(form_id)
            .bind(&input.name)
            .bind(&input.label)
            .bind(&input.field_type)
            .bind(&input.placeholder)
            .bind(&input.options)
            .bind(&input.validation)
            .bind(input.sort_order)
            .bind(&input.conditional)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a field by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<FormField>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM form_fields WHERE id = $1");
        sqlx::query_as::<_, FormField>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a field. Omitted fields keep their values; an explicit
    /// null `conditional` clears the stored rule.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateField,
    ) -> Result<Option<FormField>, sqlx::Error> {
        let query = format!(
            "UPDATE form_fields SET \
                name = COALESCE($2, name), \
                label = COALESCE($3, label), \
                field_type = COALESCE($4, field_type), \
                placeholder = COALESCE($5, placeholder), \
                options = COALESCE($6, options), \
                validation = COALESCE($7, validation), \
                sort_order = COALESCE($8, sort_order), \
                conditional = CASE WHEN $9 THEN $10 ELSE conditional END, \
                is_active = COALESCE($11, is_active), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FormField>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.label)
            .bind(&input.field_type)
            .bind(&input.placeholder)
            .bind(&input.options)
            .bind(&input.validation)
            .bind(input.sort_order)
            .bind(input.conditional.is_some())
            .bind(input.conditional.clone().flatten())
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete a field. Historical values keep their copy of its answers.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM form_fields WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

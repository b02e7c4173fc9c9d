//! Repository for the `forms` table, including slug generation and
//! full-tree loading.

use sqlx::PgPool;

use formhub_core::slug;
use formhub_core::types::DbId;

use crate::models::form::{
    CreateForm, Form, FormField, FormSection, FormTree, SectionTree, UpdateForm,
};

const COLUMNS: &str = "id, owner_id, title, slug, description, settings, \
     is_active, is_public, created_at, updated_at";

const SECTION_COLUMNS: &str = "id, form_id, title, description, sort_order, \
     conditional, is_active, created_at, updated_at";

const FIELD_COLUMNS: &str = "id, section_id, form_id, name, label, field_type, \
     placeholder, options, validation, sort_order, conditional, is_active, \
     created_at, updated_at";

/// Provides CRUD operations for forms.
pub struct FormRepo;

impl FormRepo {
    /// Insert a new form, deriving a unique slug from the title.
    ///
    /// Collisions resolve with numeric suffixes: `my-form`, `my-form-1`,
    /// `my-form-2`. The `uq_forms_slug` index backstops the rare race
    /// between the existence check and the insert.
    pub async fn create(
        pool: &PgPool,
        owner_id: DbId,
        input: &CreateForm,
    ) -> Result<Form, sqlx::Error> {
        let base = slug::slugify(&input.title);
        let mut candidate = base.clone();
        let mut suffix = 0u32;
        loop {
            let taken: bool =
                sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM forms WHERE slug = $1)")
                    .bind(&candidate)
                    .fetch_one(pool)
                    .await?;
            if !taken {
                break;
            }
            suffix += 1;
            candidate = slug::with_suffix(&base, suffix);
            tracing::debug!(base = %base, candidate = %candidate, "Slug taken, trying suffix");
        }

        let query = format!(
            "INSERT INTO forms \
                (owner_id, title, slug, description, settings, is_active, is_public) \
             VALUES ($1, $2, $3, $4, COALESCE($5, '{{}}'::jsonb), \
                     COALESCE($6, true), COALESCE($7, false)) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(owner_id)
            .bind(&input.title)
            .bind(&candidate)
            .bind(&input.description)
            .bind(&input.settings)
            .bind(input.is_active)
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    /// Find a form by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE id = $1");
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a form by slug.
    pub async fn find_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Form>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM forms WHERE slug = $1");
        sqlx::query_as::<_, Form>(&query)
            .bind(slug)
            .fetch_optional(pool)
            .await
    }

    /// Find a form by slug, or by ID when the reference parses as one.
    pub async fn find_by_slug_or_id(
        pool: &PgPool,
        reference: &str,
    ) -> Result<Option<Form>, sqlx::Error> {
        match reference.parse::<DbId>() {
            Ok(id) => Self::find_by_id(pool, id).await,
            Err(_) => Self::find_by_slug(pool, reference).await,
        }
    }

    /// List all forms belonging to an owner, newest first.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<Form>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM forms WHERE owner_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Form>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a form. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateForm,
    ) -> Result<Option<Form>, sqlx::Error> {
        let query = format!(
            "UPDATE forms SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                settings = COALESCE($4, settings), \
                is_active = COALESCE($5, is_active), \
                is_public = COALESCE($6, is_public), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Form>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.settings)
            .bind(input.is_active)
            .bind(input.is_public)
            .fetch_optional(pool)
            .await
    }

    /// Delete a form and its entire subtree: values, entries, fields,
    /// sections, then the form itself, all in one transaction.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "DELETE FROM form_values WHERE entry_id IN \
                (SELECT id FROM form_entries WHERE form_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM form_entries WHERE form_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM form_fields WHERE form_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM form_sections WHERE form_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Load a form with its full section/field tree in sort order.
    ///
    /// With `only_active`, inactive sections and fields are filtered out;
    /// this is the public rendering path. The owner path loads everything.
    pub async fn load_tree(
        pool: &PgPool,
        form: Form,
        only_active: bool,
    ) -> Result<FormTree, sqlx::Error> {
        let active_clause = if only_active { "AND is_active = true" } else { "" };

        let section_query = format!(
            "SELECT {SECTION_COLUMNS} FROM form_sections \
             WHERE form_id = $1 {active_clause} \
             ORDER BY sort_order ASC, id ASC"
        );
        let sections = sqlx::query_as::<_, FormSection>(&section_query)
            .bind(form.id)
            .fetch_all(pool)
            .await?;

        let field_query = format!(
            "SELECT {FIELD_COLUMNS} FROM form_fields \
             WHERE form_id = $1 {active_clause} \
             ORDER BY sort_order ASC, id ASC"
        );
        let fields = sqlx::query_as::<_, FormField>(&field_query)
            .bind(form.id)
            .fetch_all(pool)
            .await?;

        let sections = sections
            .into_iter()
            .map(|section| {
                let fields = fields
                    .iter()
                    .filter(|f| f.section_id == section.id)
                    .cloned()
                    .collect();
                SectionTree { section, fields }
            })
            .collect();

        Ok(FormTree { form, sections })
    }
}

//! Handlers for fields within a section.
//!
//! Field names are the answer keys of submissions, so they must stay
//! unique within their form; creates and renames are checked here and
//! backstopped by the `uq_form_fields_form_name` index.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use formhub_core::error::CoreError;
use formhub_core::types::DbId;
use formhub_db::models::form::{CreateField, FormField, UpdateField};
use formhub_db::repositories::FieldRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::sections::ensure_section_owned;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submission::{decode_conditional, parse_field_type};

/// Load a field and verify the acting user owns its form.
async fn ensure_field_owned(
    pool: &sqlx::PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<FormField> {
    let field = FieldRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Field",
            reference: id.to_string(),
        })
    })?;
    ensure_section_owned(pool, field.section_id, user_id).await?;
    Ok(field)
}

/// Authoring-time checks on the pieces that the submission pipeline will
/// later decode: the type discriminator, rule blobs, and option lists.
/// On updates the caller passes the effective type and options, not just
/// the patched ones.
fn check_definition(
    field_type: Option<&str>,
    options: Option<&serde_json::Value>,
    validation: Option<&serde_json::Value>,
    conditional: Option<&serde_json::Value>,
) -> AppResult<()> {
    let parsed = match field_type {
        Some(raw) => Some(parse_field_type(raw).map_err(|_| {
            AppError::Core(CoreError::Validation(format!("Unknown field type '{raw}'")))
        })?),
        None => None,
    };

    if let Some(value) = options {
        serde_json::from_value::<Vec<String>>(value.clone()).map_err(|_| {
            AppError::Core(CoreError::Validation(
                "Options must be an array of strings".into(),
            ))
        })?;
    }

    // Choice fields need something to choose from.
    if let Some(t) = parsed {
        if t.has_options() {
            let empty = options
                .and_then(|v| v.as_array())
                .is_none_or(|opts| opts.is_empty());
            if empty {
                return Err(AppError::Core(CoreError::Validation(format!(
                    "Field type '{}' requires a non-empty options list",
                    field_type.unwrap_or_default()
                ))));
            }
        }
    }

    if let Some(value) = validation {
        serde_json::from_value::<formhub_core::forms::ValidationRules>(value.clone()).map_err(
            |e| {
                AppError::Core(CoreError::Validation(format!(
                    "Validation rules are malformed: {e}"
                )))
            },
        )?;
    }

    decode_conditional(conditional).map_err(|_| {
        AppError::Core(CoreError::Validation(
            "Conditional rule is malformed: expected \
             {depends_on_field_id, operator, value, action}"
                .into(),
        ))
    })?;

    Ok(())
}

// ---------------------------------------------------------------------------
// POST /sections/{section_id}/fields
// ---------------------------------------------------------------------------

/// Create a field in a section the user owns.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(section_id): Path<DbId>,
    Json(input): Json<CreateField>,
) -> AppResult<impl IntoResponse> {
    let section = ensure_section_owned(&state.pool, section_id, auth.user_id).await?;

    check_definition(
        Some(&input.field_type),
        input.options.as_ref(),
        input.validation.as_ref(),
        input.conditional.as_ref(),
    )?;

    if FieldRepo::name_taken(&state.pool, section.form_id, &input.name, None).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A field named '{}' already exists in this form",
            input.name
        ))));
    }

    let created = FieldRepo::create(&state.pool, section_id, section.form_id, &input).await?;
    tracing::info!(id = created.id, section_id, name = %created.name, "Field created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// PUT /fields/{id}
// ---------------------------------------------------------------------------

/// Merge-patch a field. Renames keep the per-form uniqueness invariant.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateField>,
) -> AppResult<impl IntoResponse> {
    let field = ensure_field_owned(&state.pool, id, auth.user_id).await?;

    // Check the patch against the effective definition, falling back to
    // the stored type and options for whatever the patch omits. A patch
    // may not leave a choice field without options, whether by emptying
    // the list or by switching the type.
    check_definition(
        Some(input.field_type.as_deref().unwrap_or(&field.field_type)),
        input.options.as_ref().or(field.options.as_ref()),
        input.validation.as_ref(),
        input.conditional.as_ref().and_then(Option::as_ref),
    )?;

    if let Some(name) = &input.name {
        if FieldRepo::name_taken(&state.pool, field.form_id, name, Some(id)).await? {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "A field named '{name}' already exists in this form"
            ))));
        }
    }

    let updated = FieldRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Field",
                reference: id.to_string(),
            })
        })?;
    tracing::info!(id = updated.id, "Field updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// DELETE /fields/{id}
// ---------------------------------------------------------------------------

/// Delete a field. Recorded entry values keep their historical answers.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_field_owned(&state.pool, id, auth.user_id).await?;

    FieldRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Field deleted");
    Ok(StatusCode::NO_CONTENT)
}

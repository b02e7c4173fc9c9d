//! Handlers for sections within a form.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use formhub_core::error::CoreError;
use formhub_core::types::DbId;
use formhub_db::models::form::{CreateSection, FormSection, UpdateSection};
use formhub_db::repositories::SectionRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::forms::ensure_form_owned;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submission::decode_conditional;

/// Load a section and verify the acting user owns its form.
pub async fn ensure_section_owned(
    pool: &sqlx::PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<FormSection> {
    let section = SectionRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Section",
            reference: id.to_string(),
        })
    })?;
    ensure_form_owned(pool, section.form_id, user_id).await?;
    Ok(section)
}

/// Reject conditional rule blobs that do not decode, with an authoring-
/// friendly message instead of the submission path's internal error.
fn check_conditional(raw: Option<&serde_json::Value>) -> AppResult<()> {
    decode_conditional(raw).map_err(|_| {
        AppError::Core(CoreError::Validation(
            "Conditional rule is malformed: expected \
             {depends_on_field_id, operator, value, action}"
                .into(),
        ))
    })?;
    Ok(())
}

// ---------------------------------------------------------------------------
// POST /forms/{form_id}/sections
// ---------------------------------------------------------------------------

/// Create a section in a form the user owns.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
    Json(input): Json<CreateSection>,
) -> AppResult<impl IntoResponse> {
    ensure_form_owned(&state.pool, form_id, auth.user_id).await?;
    check_conditional(input.conditional.as_ref())?;

    let created = SectionRepo::create(&state.pool, form_id, &input).await?;
    tracing::info!(id = created.id, form_id, "Section created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// PUT /sections/{id}
// ---------------------------------------------------------------------------

/// Merge-patch a section.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSection>,
) -> AppResult<impl IntoResponse> {
    ensure_section_owned(&state.pool, id, auth.user_id).await?;
    // An explicit null clears the rule and needs no decoding.
    check_conditional(input.conditional.as_ref().and_then(Option::as_ref))?;

    let updated = SectionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Section",
                reference: id.to_string(),
            })
        })?;
    tracing::info!(id = updated.id, "Section updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// DELETE /sections/{id}
// ---------------------------------------------------------------------------

/// Delete a section and its fields. Recorded entry values are untouched.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_section_owned(&state.pool, id, auth.user_id).await?;

    SectionRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Section deleted");
    Ok(StatusCode::NO_CONTENT)
}

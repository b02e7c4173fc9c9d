//! Handlers for owner-side form management.
//!
//! Every route here requires a Bearer token, and every mutation checks
//! that the acting user owns the form being touched.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use formhub_core::error::CoreError;
use formhub_core::types::DbId;
use formhub_db::models::form::{CreateForm, Form, UpdateForm};
use formhub_db::repositories::FormRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Load a form and verify the acting user owns it.
pub async fn ensure_form_owned(
    pool: &sqlx::PgPool,
    id: DbId,
    user_id: DbId,
) -> AppResult<Form> {
    let form = FormRepo::find_by_id(pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Form",
            reference: id.to_string(),
        })
    })?;
    if form.owner_id != user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the form's owner may manage it".into(),
        )));
    }
    Ok(form)
}

// ---------------------------------------------------------------------------
// GET /forms
// ---------------------------------------------------------------------------

/// List the authenticated user's forms, newest first.
pub async fn list(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let items = FormRepo::list_by_owner(&state.pool, auth.user_id).await?;
    tracing::debug!(count = items.len(), "Listed forms");
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// POST /forms
// ---------------------------------------------------------------------------

/// Create a new form owned by the authenticated user.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateForm>,
) -> AppResult<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Form title must not be empty".into(),
        )));
    }

    let created = FormRepo::create(&state.pool, auth.user_id, &input).await?;
    tracing::info!(id = created.id, slug = %created.slug, "Form created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

// ---------------------------------------------------------------------------
// GET /forms/{id}
// ---------------------------------------------------------------------------

/// Get the full form tree, unfiltered (inactive nodes included).
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let form = ensure_form_owned(&state.pool, id, auth.user_id).await?;
    let tree = FormRepo::load_tree(&state.pool, form, false).await?;
    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// PUT /forms/{id}
// ---------------------------------------------------------------------------

/// Merge-patch a form. The slug is fixed at creation and never changes.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateForm>,
) -> AppResult<impl IntoResponse> {
    ensure_form_owned(&state.pool, id, auth.user_id).await?;

    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Form title must not be empty".into(),
            )));
        }
    }

    let updated = FormRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Form",
                reference: id.to_string(),
            })
        })?;
    tracing::info!(id = updated.id, "Form updated");
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// DELETE /forms/{id}
// ---------------------------------------------------------------------------

/// Delete a form and its entire subtree (sections, fields, entries, values).
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_form_owned(&state.pool, id, auth.user_id).await?;

    FormRepo::delete(&state.pool, id).await?;
    tracing::info!(id, "Form deleted");
    Ok(StatusCode::NO_CONTENT)
}

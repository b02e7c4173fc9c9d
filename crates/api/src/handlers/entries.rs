//! Handlers for reading submitted entries.
//!
//! Entries are immutable: there are no update or delete endpoints, only
//! listing and retrieval by the form's owner.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;

use formhub_core::error::CoreError;
use formhub_core::types::DbId;
use formhub_db::repositories::EntryRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::forms::ensure_form_owned;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /forms/{form_id}/entries
// ---------------------------------------------------------------------------

/// List a form's entries with their values, newest first.
pub async fn list_by_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(form_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_form_owned(&state.pool, form_id, auth.user_id).await?;

    let items = EntryRepo::list_by_form(&state.pool, form_id).await?;
    tracing::debug!(form_id, count = items.len(), "Listed entries");
    Ok(Json(DataResponse { data: items }))
}

// ---------------------------------------------------------------------------
// GET /entries/{id}
// ---------------------------------------------------------------------------

/// Get one entry with its values.
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entry = EntryRepo::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::Core(CoreError::NotFound {
            entity: "Entry",
            reference: id.to_string(),
        })
    })?;
    ensure_form_owned(&state.pool, entry.entry.form_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: entry }))
}

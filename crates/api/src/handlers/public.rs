//! Public (unauthenticated) form endpoints: fetch a published form's
//! definition and submit answers against it.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use formhub_core::error::CoreError;
use formhub_core::types::DbId;
use formhub_db::repositories::FormRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::submission::{submit, SubmissionMeta};

/// Successful submission payload.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub entry_id: DbId,
}

// ---------------------------------------------------------------------------
// GET /public/forms/{slug_or_id}
// ---------------------------------------------------------------------------

/// Fetch a published form's tree, filtered to active sections and fields.
pub async fn get_form(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<impl IntoResponse> {
    let form = FormRepo::find_by_slug_or_id(&state.pool, &reference)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Form",
                reference: reference.clone(),
            })
        })?;

    if !form.is_active || !form.is_public {
        return Err(AppError::Core(CoreError::Unavailable(
            "This form is not available".into(),
        )));
    }

    let tree = FormRepo::load_tree(&state.pool, form, true).await?;
    Ok(Json(DataResponse { data: tree }))
}

// ---------------------------------------------------------------------------
// POST /public/forms/{slug_or_id}/submissions
// ---------------------------------------------------------------------------

/// Submit answers against a published form.
///
/// Anonymous submissions are allowed; when a valid Bearer token is
/// present the submitter is recorded. Request metadata (IP from
/// `x-forwarded-for`, user agent, referrer) is captured into the entry's
/// meta blob.
pub async fn submit_form(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    submitter: Option<AuthUser>,
    headers: HeaderMap,
    Json(payload): Json<serde_json::Map<String, serde_json::Value>>,
) -> AppResult<impl IntoResponse> {
    let meta = SubmissionMeta {
        submitter_id: submitter.map(|u| u.user_id),
        ip: header_string(&headers, "x-forwarded-for")
            .map(|v| v.split(',').next().unwrap_or(&v).trim().to_string()),
        user_agent: header_string(&headers, "user-agent"),
        referrer: header_string(&headers, "referer"),
    };

    let entry = submit(&state.pool, &reference, &payload, &meta).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmitResponse { entry_id: entry.id },
        }),
    ))
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

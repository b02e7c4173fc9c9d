//! Route definitions for the public (unauthenticated) form surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::public;
use crate::state::AppState;

/// Routes mounted at `/public`.
///
/// ```text
/// GET  /forms/{slug_or_id}               -> get_form
/// POST /forms/{slug_or_id}/submissions   -> submit_form
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forms/{reference}", get(public::get_form))
        .route(
            "/forms/{reference}/submissions",
            post(public::submit_form),
        )
}

//! Route definitions for owner-side form management.
//!
//! Section and field mutation routes hang off their own id rather than
//! the full parent path; ownership is resolved transitively
//! (field -> section -> form -> owner) in the handlers.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{entries, fields, forms, sections};
use crate::state::AppState;

/// Routes mounted at the API root (all require Bearer auth).
///
/// ```text
/// GET    /forms                        -> list
/// POST   /forms                        -> create
/// GET    /forms/{id}                   -> get_by_id (full tree)
/// PUT    /forms/{id}                   -> update
/// DELETE /forms/{id}                   -> delete
///
/// POST   /forms/{form_id}/sections     -> sections::create
/// GET    /forms/{form_id}/entries      -> entries::list_by_form
///
/// PUT    /sections/{id}                -> sections::update
/// DELETE /sections/{id}                -> sections::delete
/// POST   /sections/{section_id}/fields -> fields::create
///
/// PUT    /fields/{id}                  -> fields::update
/// DELETE /fields/{id}                  -> fields::delete
///
/// GET    /entries/{id}                 -> entries::get_by_id
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forms", get(forms::list).post(forms::create))
        .route(
            "/forms/{id}",
            get(forms::get_by_id)
                .put(forms::update)
                .delete(forms::delete),
        )
        .route("/forms/{form_id}/sections", post(sections::create))
        .route("/forms/{form_id}/entries", get(entries::list_by_form))
        .route(
            "/sections/{id}",
            put(sections::update).delete(sections::delete),
        )
        .route("/sections/{section_id}/fields", post(fields::create))
        .route("/fields/{id}", put(fields::update).delete(fields::delete))
        .route("/entries/{id}", get(entries::get_by_id))
}

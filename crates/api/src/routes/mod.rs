pub mod forms;
pub mod health;
pub mod public;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /public/forms/{slug_or_id}               fetch published form (GET)
/// /public/forms/{slug_or_id}/submissions   submit answers (POST)
///
/// /forms                                   list, create (owner auth)
/// /forms/{id}                              get tree, update, delete
/// /forms/{form_id}/sections                create section (POST)
/// /forms/{form_id}/entries                 list entries (GET)
/// /sections/{id}                           update, delete
/// /sections/{section_id}/fields            create field (POST)
/// /fields/{id}                             update, delete
/// /entries/{id}                            get entry (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/public", public::router())
        .merge(forms::router())
}

//! Domain logic for the form builder: error taxonomy, slug generation,
//! and the pure condition/validation/submission engine.
//!
//! Nothing in this crate touches the database; persistence lives in
//! `formhub-db` and orchestration in `formhub-api`.

pub mod error;
pub mod forms;
pub mod slug;
pub mod types;

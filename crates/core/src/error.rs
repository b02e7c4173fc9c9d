#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `reference` is the id or slug the caller looked up.
    #[error("Entity not found: {entity} '{reference}'")]
    NotFound {
        entity: &'static str,
        reference: String,
    },

    /// The entity exists but is not publicly available
    /// (e.g. a form that is inactive or not published).
    #[error("Unavailable: {0}")]
    Unavailable(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

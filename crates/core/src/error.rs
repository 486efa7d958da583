use crate::status::AssignmentStatus;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A guard on the requested action is not satisfied yet. The caller can
    /// retry once the guard holds (e.g. after checking the remaining items).
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// The action is not permitted from the assignment's current status.
    #[error("Cannot {action} an assignment in status '{from}'")]
    InvalidStateTransition {
        from: AssignmentStatus,
        action: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for [`CoreError::InvalidStateTransition`].
    pub fn invalid_transition(from: AssignmentStatus, action: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition {
            from,
            action: action.into(),
        }
    }
}

//! Route definitions for the payroll ledger.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::payments;
use crate::state::AppState;

/// Routes mounted at `/payments`.
///
/// ```text
/// GET    /                           -> list
/// POST   /{assignment_id}/mark-paid  -> mark_paid
/// DELETE /{assignment_id}            -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::list))
        .route("/{assignment_id}", delete(payments::delete))
        .route("/{assignment_id}/mark-paid", post(payments::mark_paid))
}

/// Routes mounted at `/salary-stats`.
///
/// ```text
/// GET / -> salary_stats
/// ```
pub fn stats_router() -> Router<AppState> {
    Router::new().route("/", get(payments::salary_stats))
}

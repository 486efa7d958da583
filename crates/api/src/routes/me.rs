//! Route definitions for the `/me` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
///
/// ```text
/// GET /assignments     -> assignments
/// GET /salary-history  -> salary_history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/assignments", get(me::assignments))
        .route("/salary-history", get(me::salary_history))
}

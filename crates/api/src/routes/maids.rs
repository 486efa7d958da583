//! Route definitions for the `/maids` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::maids;
use crate::state::AppState;

/// Routes mounted at `/maids`.
///
/// ```text
/// GET    /       -> list
/// POST   /       -> create
/// PUT    /{id}   -> update
/// DELETE /{id}   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(maids::list).post(maids::create))
        .route("/{id}", put(maids::update).delete(maids::delete))
}

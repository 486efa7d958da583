use axum::routing::get;
use axum::Router;

use crate::handlers::templates;
use crate::state::AppState;

/// Routes mounted at `/checklist-templates`.
pub fn router() -> Router<AppState> {
    Router::new().route("/{service_type}", get(templates::get))
}

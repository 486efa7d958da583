//! Route definitions for the `/assignments` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{assignments, inspection};
use crate::state::AppState;

/// Routes mounted at `/assignments`.
///
/// ```text
/// GET    /                                    -> list
/// POST   /                                    -> create
/// GET    /{id}                                -> get
/// PUT    /{id}                                -> update
/// DELETE /{id}                                -> delete
/// POST   /{id}/assign                         -> assign
/// POST   /{id}/cancel                         -> cancel
/// POST   /{id}/status                         -> set_status
/// POST   /{id}/verify                         -> verify
/// POST   /{id}/photos                         -> upload_photos
/// PUT    /{id}/checklist                      -> update_checklist
/// POST   /{id}/checklist/items/{item_id}/toggle -> toggle_checklist_item
/// POST   /{id}/inspection/start               -> inspection::start
/// PUT    /{id}/inspection/checklist           -> inspection::update_checklist
/// POST   /{id}/inspection/complete            -> inspection::complete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assignments::list).post(assignments::create))
        .route(
            "/{id}",
            get(assignments::get)
                .put(assignments::update)
                .delete(assignments::delete),
        )
        .route("/{id}/assign", post(assignments::assign))
        .route("/{id}/cancel", post(assignments::cancel))
        .route("/{id}/status", post(assignments::set_status))
        .route("/{id}/verify", post(assignments::verify))
        .route("/{id}/photos", post(assignments::upload_photos))
        .route("/{id}/checklist", put(assignments::update_checklist))
        .route(
            "/{id}/checklist/items/{item_id}/toggle",
            post(assignments::toggle_checklist_item),
        )
        .route("/{id}/inspection/start", post(inspection::start))
        .route("/{id}/inspection/checklist", put(inspection::update_checklist))
        .route("/{id}/inspection/complete", post(inspection::complete))
}

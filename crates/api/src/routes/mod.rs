pub mod assignments;
pub mod auth;
pub mod health;
pub mod maids;
pub mod me;
pub mod payments;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                                          login (public)
///
/// /assignments                                         list, create (admin)
/// /assignments/{id}                                    get, update, delete
/// /assignments/{id}/assign                             assign / reassign (admin)
/// /assignments/{id}/cancel                             cancel (admin)
/// /assignments/{id}/status                             guarded status change
/// /assignments/{id}/verify                             verify (admin)
/// /assignments/{id}/photos                             upload photos (maid)
/// /assignments/{id}/checklist                          replace cleaning checks (maid)
/// /assignments/{id}/checklist/items/{item_id}/toggle   toggle one item (maid)
/// /assignments/{id}/inspection/start                   start inspection (senior cleaner)
/// /assignments/{id}/inspection/checklist               replace inspection checks
/// /assignments/{id}/inspection/complete                complete inspection
///
/// /payments                                            list (admin)
/// /payments/{assignment_id}                            delete record (admin)
/// /payments/{assignment_id}/mark-paid                  mark paid (admin)
/// /salary-stats                                        per-worker earnings (admin)
///
/// /maids                                               list, create (admin)
/// /maids/{id}                                          update, delete (admin)
///
/// /me/assignments                                      caller's jobs
/// /me/salary-history                                   caller's ledger lines
///
/// /checklist-templates/{service_type}?kind=            template catalog view
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication.
        .nest("/auth", auth::router())
        // Assignment CRUD, lifecycle and inspection.
        .nest("/assignments", assignments::router())
        // Payroll ledger.
        .nest("/payments", payments::router())
        .nest("/salary-stats", payments::stats_router())
        // Worker roster.
        .nest("/maids", maids::router())
        // Worker self-service.
        .nest("/me", me::router())
        // Checklist catalogs.
        .nest("/checklist-templates", templates::router())
}

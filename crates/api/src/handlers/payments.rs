//! Handlers for the payroll ledger: payment records and salary statistics.
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. There is no
//! route that marks a payment unpaid.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use tidyhome_core::payroll::{PaymentFilter, PaymentList, SalaryStats};
use tidyhome_core::types::DbId;
use tidyhome_db::models::assignment::VersionQuery;
use tidyhome_db::models::payroll::PaymentListQuery;
use tidyhome_db::repositories::{AssignmentRepo, PayrollRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/payments?paid=&date_from=&date_to=
///
/// Payment records newest first, with the grand total of the listed records.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<PaymentListQuery>,
) -> AppResult<Json<DataResponse<PaymentList>>> {
    let filter = PaymentFilter::from(query);
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(AppError::BadRequest(format!(
                "date_from ({from}) is after date_to ({to})"
            )));
        }
    }
    let payments = PayrollRepo::payments(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: payments }))
}

/// POST /api/v1/payments/{assignment_id}/mark-paid?expected_version=
///
/// One-way: a paid record stays paid. Repeating the call is a no-op.
/// Returns 204 No Content.
pub async fn mark_paid(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(assignment_id): Path<DbId>,
    Query(version): Query<VersionQuery>,
) -> AppResult<StatusCode> {
    let actor = admin.principal();
    let now = Utc::now();
    let (assignment, ()) =
        AssignmentRepo::apply(&state.pool, assignment_id, version.expected_version, |a| {
            a.mark_paid(&actor, now)
        })
        .await?;

    tracing::info!(
        user_id = admin.user_id,
        assignment_id,
        total = assignment.total_salary(),
        "Payment marked paid",
    );
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/payments/{assignment_id}
///
/// Permanently drop the assignment's payment record from the ledger. The
/// assignment itself is kept. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(assignment_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let actor = admin.principal();
    let now = Utc::now();
    AssignmentRepo::apply(&state.pool, assignment_id, None, |a| {
        a.remove_payment_record(&actor, now)
    })
    .await?;

    tracing::info!(user_id = admin.user_id, assignment_id, "Payment record deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/salary-stats
///
/// Per-worker earnings, with the current month taken from the server clock.
pub async fn salary_stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<SalaryStats>>> {
    let today = Utc::now().date_naive();
    let stats = PayrollRepo::salary_stats(&state.pool, today).await?;
    Ok(Json(DataResponse { data: stats }))
}

//! Handlers for the `/me` resource: the calling worker's own jobs and pay.

use axum::extract::State;
use axum::Json;
use tidyhome_core::payroll::SalaryHistory;
use tidyhome_db::repositories::{AssignmentRepo, PayrollRepo};

use super::assignments::{respond_list, AssignmentView};
use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me/assignments
///
/// Assignments on which the caller is the maid or the inspector.
pub async fn assignments(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    let assignments = AssignmentRepo::list_for_worker(&state.pool, user.user_id).await?;
    Ok(respond_list(assignments))
}

/// GET /api/v1/me/salary-history
pub async fn salary_history(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> AppResult<Json<DataResponse<SalaryHistory>>> {
    let history = PayrollRepo::salary_history(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: history }))
}

//! Handlers for the senior cleaner's inspection of a completed assignment.
//!
//! Allowed for the assigned senior cleaner and for admins.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use tidyhome_core::types::DbId;
use tidyhome_db::models::assignment::{ChecklistUpdateRequest, VersionQuery};
use tidyhome_db::repositories::AssignmentRepo;

use super::assignments::{respond, AssignmentResponse};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// POST /api/v1/assignments/{id}/inspection/start?expected_version=
///
/// Creates the inspection checklist for the assignment's service type.
pub async fn start(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(version): Query<VersionQuery>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let now = Utc::now();
    let (assignment, ()) =
        AssignmentRepo::apply(&state.pool, id, version.expected_version, |a| {
            a.start_inspection(&actor, now)
        })
        .await?;

    tracing::info!(user_id = user.user_id, assignment_id = id, "Inspection started");
    Ok(respond(assignment))
}

/// PUT /api/v1/assignments/{id}/inspection/checklist
pub async fn update_checklist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ChecklistUpdateRequest>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let (assignment, ()) = AssignmentRepo::apply(&state.pool, id, input.expected_version, |a| {
        a.update_inspection_checklist(&actor, &input.items)
    })
    .await?;

    tracing::info!(user_id = user.user_id, assignment_id = id, "Inspection checklist updated");
    Ok(respond(assignment))
}

/// POST /api/v1/assignments/{id}/inspection/complete?expected_version=
///
/// Requires every inspection item checked. Does not verify the assignment;
/// the completion time dates the inspector's payroll line.
pub async fn complete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Query(version): Query<VersionQuery>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let now = Utc::now();
    let (assignment, ()) =
        AssignmentRepo::apply(&state.pool, id, version.expected_version, |a| {
            a.complete_inspection(&actor, now)
        })
        .await?;

    tracing::info!(user_id = user.user_id, assignment_id = id, "Inspection completed");
    Ok(respond(assignment))
}

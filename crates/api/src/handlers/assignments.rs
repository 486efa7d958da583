//! Handlers for the `/assignments` resource.
//!
//! Every mutation goes through [`AssignmentRepo::apply`] (or `assign`),
//! which locks the row, runs the core lifecycle method with the caller's
//! principal and writes the result back in one transaction. Authorisation
//! beyond "is admin" (the assigned maid, the assigned inspector) is decided
//! by the lifecycle itself.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tidyhome_core::assignment::Assignment;
use tidyhome_core::checklist::{CategoryGroup, Checklist, ChecklistState};
use tidyhome_core::error::CoreError;
use tidyhome_core::types::{Amount, DbId};
use tidyhome_db::models::assignment::{
    AssignWorkerRequest, AssignmentListQuery, ChecklistUpdateRequest, CreateAssignment,
    PhotosRequest, StatusRequest, UpdateAssignment, VersionQuery,
};
use tidyhome_db::repositories::AssignmentRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// An assignment with its derived progress fields.
#[derive(Debug, Serialize)]
pub struct AssignmentView {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub checklist_progress: u8,
    /// Cleaning checklist progress per category.
    pub checklist_groups: Vec<CategoryGroup>,
    pub inspection_groups: Vec<CategoryGroup>,
    pub cleaning_state: ChecklistState,
    pub inspection_state: ChecklistState,
    pub awaiting_verification: bool,
    pub total_salary: Amount,
}

impl From<Assignment> for AssignmentView {
    fn from(assignment: Assignment) -> Self {
        Self {
            checklist_progress: assignment.checklist_progress(),
            checklist_groups: assignment
                .checklist
                .as_ref()
                .map(Checklist::by_category)
                .unwrap_or_default(),
            inspection_groups: assignment
                .inspection
                .as_ref()
                .map(|i| i.checklist.by_category())
                .unwrap_or_default(),
            cleaning_state: assignment.cleaning_state(),
            inspection_state: assignment.inspection_state(),
            awaiting_verification: assignment.awaiting_verification(),
            total_salary: assignment.total_salary(),
            assignment,
        }
    }
}

pub type AssignmentResponse = Json<DataResponse<AssignmentView>>;

pub(crate) fn respond(assignment: Assignment) -> AssignmentResponse {
    Json(DataResponse {
        data: assignment.into(),
    })
}

pub(crate) fn respond_list(
    assignments: Vec<Assignment>,
) -> Json<DataResponse<Vec<AssignmentView>>> {
    Json(DataResponse {
        data: assignments.into_iter().map(AssignmentView::from).collect(),
    })
}

// ---------------------------------------------------------------------------
// Admin CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/assignments?status=
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<AssignmentListQuery>,
) -> AppResult<Json<DataResponse<Vec<AssignmentView>>>> {
    let status = query.parsed_status()?;
    let assignments = AssignmentRepo::list(&state.pool, status).await?;
    Ok(respond_list(assignments))
}

/// POST /api/v1/assignments
///
/// Create a pending assignment. Returns 201 Created.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateAssignment>,
) -> AppResult<(StatusCode, AssignmentResponse)> {
    input.validate()?;
    if input.address.trim().is_empty() || input.client_name.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Address and client name must not be blank".into(),
        )));
    }

    let assignment = AssignmentRepo::create(&state.pool, &input).await?;

    tracing::info!(
        user_id = admin.user_id,
        assignment_id = assignment.id,
        service_type = %assignment.service_type,
        scheduled_date = %assignment.scheduled_date,
        "Assignment created",
    );

    Ok((StatusCode::CREATED, respond(assignment)))
}

/// GET /api/v1/assignments/{id}
///
/// Visible to admins and to the workers on the assignment.
pub async fn get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<AssignmentResponse> {
    let assignment = AssignmentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Assignment",
            id,
        }))?;

    if !assignment.visible_to(&user.principal()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Not assigned to this job".into(),
        )));
    }
    Ok(respond(assignment))
}

/// PUT /api/v1/assignments/{id}
///
/// Edit scheduling fields; rejected once verified or cancelled.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAssignment>,
) -> AppResult<AssignmentResponse> {
    let actor = admin.principal();
    let (assignment, ()) = AssignmentRepo::apply(&state.pool, id, input.expected_version, |a| {
        a.update_details(&actor, input.patch)
    })
    .await?;

    tracing::info!(user_id = admin.user_id, assignment_id = id, "Assignment updated");
    Ok(respond(assignment))
}

/// DELETE /api/v1/assignments/{id}
///
/// Hard delete; verified assignments are kept for payroll. Returns 204.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    AssignmentRepo::delete(&state.pool, id, &admin.principal()).await?;
    tracing::info!(user_id = admin.user_id, assignment_id = id, "Assignment deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Lifecycle transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/assignments/{id}/assign
///
/// Assign (from pending) or reassign (before verification) the maid and the
/// optional senior-cleaner inspector with their salaries.
pub async fn assign(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<AssignWorkerRequest>,
) -> AppResult<AssignmentResponse> {
    input.validate()?;
    let plan = input.to_plan()?;

    let assignment = AssignmentRepo::assign(
        &state.pool,
        id,
        input.expected_version,
        &admin.principal(),
        &plan,
        Utc::now(),
    )
    .await?;

    tracing::info!(
        user_id = admin.user_id,
        assignment_id = id,
        maid_id = plan.maid_id,
        salary = plan.salary,
        senior_cleaner_id = ?plan.senior_cleaner_id,
        "Workers assigned",
    );
    Ok(respond(assignment))
}

/// POST /api/v1/assignments/{id}/cancel?expected_version=
pub async fn cancel(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Query(version): Query<VersionQuery>,
) -> AppResult<AssignmentResponse> {
    let actor = admin.principal();
    let (assignment, ()) =
        AssignmentRepo::apply(&state.pool, id, version.expected_version, |a| a.cancel(&actor))
            .await?;

    tracing::info!(user_id = admin.user_id, assignment_id = id, "Assignment cancelled");
    Ok(respond(assignment))
}

/// POST /api/v1/assignments/{id}/status
///
/// Generic guarded status change (`in_progress`, `completed`, `verified`,
/// `cancelled`).
pub async fn set_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<StatusRequest>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let now = Utc::now();
    let (assignment, ()) = AssignmentRepo::apply(&state.pool, id, input.expected_version, |a| {
        a.set_status(&actor, input.status, now)
    })
    .await?;

    tracing::info!(
        user_id = user.user_id,
        assignment_id = id,
        status = %assignment.status,
        "Assignment status changed",
    );
    Ok(respond(assignment))
}

/// POST /api/v1/assignments/{id}/verify?expected_version=
///
/// Admin sign-off of a completed assignment; accrues payroll.
pub async fn verify(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Query(version): Query<VersionQuery>,
) -> AppResult<AssignmentResponse> {
    let actor = admin.principal();
    let now = Utc::now();
    let (assignment, ()) =
        AssignmentRepo::apply(&state.pool, id, version.expected_version, |a| {
            a.verify(&actor, now)
        })
        .await?;

    tracing::info!(
        user_id = admin.user_id,
        assignment_id = id,
        total_salary = assignment.total_salary(),
        "Assignment verified",
    );
    Ok(respond(assignment))
}

// ---------------------------------------------------------------------------
// Maid work
// ---------------------------------------------------------------------------

/// POST /api/v1/assignments/{id}/photos
///
/// Store the before and/or after photo. Absent photos keep their old value.
pub async fn upload_photos(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<PhotosRequest>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let upload = input.to_upload();
    let now = Utc::now();
    let (assignment, ()) = AssignmentRepo::apply(&state.pool, id, input.expected_version, |a| {
        a.upload_photos(&actor, upload, now)
    })
    .await?;

    tracing::info!(
        user_id = user.user_id,
        assignment_id = id,
        before = assignment.photos.before.is_some(),
        after = assignment.photos.after.is_some(),
        "Photos uploaded",
    );
    Ok(respond(assignment))
}

/// PUT /api/v1/assignments/{id}/checklist
///
/// Replace the checked flags of the whole cleaning checklist.
pub async fn update_checklist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<ChecklistUpdateRequest>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let (assignment, ()) = AssignmentRepo::apply(&state.pool, id, input.expected_version, |a| {
        a.update_checklist(&actor, &input.items)
    })
    .await?;

    tracing::info!(
        user_id = user.user_id,
        assignment_id = id,
        progress = assignment.checklist_progress(),
        "Cleaning checklist updated",
    );
    Ok(respond(assignment))
}

/// POST /api/v1/assignments/{id}/checklist/items/{item_id}/toggle?expected_version=
pub async fn toggle_checklist_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(DbId, String)>,
    Query(version): Query<VersionQuery>,
) -> AppResult<AssignmentResponse> {
    let actor = user.principal();
    let (assignment, checked) =
        AssignmentRepo::apply(&state.pool, id, version.expected_version, |a| {
            a.toggle_checklist_item(&actor, &item_id)
        })
        .await?;

    tracing::debug!(
        user_id = user.user_id,
        assignment_id = id,
        item_id = %item_id,
        checked,
        "Checklist item toggled",
    );
    Ok(respond(assignment))
}

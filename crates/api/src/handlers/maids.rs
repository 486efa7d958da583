//! Handlers for the `/maids` resource (worker roster).
//!
//! All handlers require the `admin` role via [`RequireAdmin`]. The roster
//! covers both worker roles: maids and senior cleaners.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use tidyhome_core::error::CoreError;
use tidyhome_core::types::DbId;
use tidyhome_db::models::user::{
    CreateUser, CreateWorker, UpdateUser, UpdateWorker, UserResponse, WorkerSummary,
};
use tidyhome_db::repositories::UserRepo;
use validator::Validate;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// GET /api/v1/maids
///
/// Workers ordered by name, with per-status assignment counts.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<Vec<WorkerSummary>>>> {
    let workers = UserRepo::list_workers(&state.pool).await?;
    Ok(Json(DataResponse { data: workers }))
}

/// POST /api/v1/maids
///
/// Create a worker account (role `maid` unless `senior_cleaner` is given).
/// Returns 201 Created.
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateWorker>,
) -> AppResult<(StatusCode, Json<DataResponse<UserResponse>>)> {
    input.validate()?;
    let role = input.worker_role()?;

    let dto = CreateUser {
        full_name: input.full_name.trim().to_string(),
        email: input.email.trim().to_string(),
        phone: input.phone,
        password_hash: hash(&input.password)?,
        role,
    };
    let user = UserRepo::create(&state.pool, &dto).await?;

    tracing::info!(user_id = admin.user_id, worker_id = user.id, role = %role, "Worker created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: user.into() })))
}

/// PUT /api/v1/maids/{id}
///
/// Update profile fields, password or active flag. Deactivated workers
/// cannot log in or be assigned.
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateWorker>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    input.validate()?;

    let not_found = || AppError::Core(CoreError::NotFound { entity: "Worker", id });
    let existing = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(not_found)?;
    if !existing.parsed_role()?.is_worker() {
        return Err(not_found());
    }

    let password_hash = input.password.as_deref().map(hash).transpose()?;
    let dto = UpdateUser {
        full_name: input.full_name.map(|n| n.trim().to_string()),
        email: input.email.map(|e| e.trim().to_string()),
        phone: input.phone,
        password_hash,
        is_active: input.is_active,
    };
    let user = UserRepo::update(&state.pool, id, &dto)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(user_id = admin.user_id, worker_id = id, "Worker updated");
    Ok(Json(DataResponse { data: user.into() }))
}

/// DELETE /api/v1/maids/{id}
///
/// Rejected with 409 while any assignment names the worker; deactivate
/// instead. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    UserRepo::delete_worker(&state.pool, id).await?;
    tracing::info!(user_id = admin.user_id, worker_id = id, "Worker deleted");
    Ok(StatusCode::NO_CONTENT)
}

//! User entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tidyhome_core::error::CoreError;
use tidyhome_core::payroll::WorkerRef;
use tidyhome_core::roles::Role;
use tidyhome_core::types::{DbId, Timestamp};
use validator::Validate;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub failed_login_count: i32,
    pub locked_until: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn parsed_role(&self) -> Result<Role, CoreError> {
        self.role
            .parse()
            .map_err(|_| CoreError::Internal(format!("User {} has unknown role", self.id)))
    }
}

/// Safe user representation for API responses (no password hash).
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            phone: u.phone,
            role: u.role,
            is_active: u.is_active,
            last_login_at: u.last_login_at,
            created_at: u.created_at,
        }
    }
}

/// Roster row: a worker with assignment counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkerSummary {
    pub id: DbId,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub assigned_count: i64,
    pub in_progress_count: i64,
    pub completed_count: i64,
    pub total_assignments: i64,
}

/// Id, name and role of a worker, for labelling payroll output.
#[derive(Debug, Clone, FromRow)]
pub struct WorkerRefRow {
    pub id: DbId,
    pub full_name: String,
    pub role: String,
}

impl TryFrom<WorkerRefRow> for WorkerRef {
    type Error = CoreError;

    fn try_from(row: WorkerRefRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse()
            .map_err(|_| CoreError::Internal(format!("User {} has unknown role", row.id)))?;
        Ok(WorkerRef {
            id: row.id,
            full_name: row.full_name,
            role,
        })
    }
}

/// Insert DTO; the password is already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Update DTO. All fields are optional.
#[derive(Debug, Default)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

/// Body of `POST /maids`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorker {
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// Defaults to `maid`.
    pub role: Option<Role>,
}

impl CreateWorker {
    /// The requested role, which must be a worker role.
    pub fn worker_role(&self) -> Result<Role, CoreError> {
        let role = self.role.unwrap_or(Role::Maid);
        if role.is_worker() {
            Ok(role)
        } else {
            Err(CoreError::Validation(format!(
                "Role '{role}' is not a worker role"
            )))
        }
    }
}

/// Body of `PUT /maids/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorker {
    #[validate(length(min = 1, max = 200))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(min = 8, max = 128))]
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

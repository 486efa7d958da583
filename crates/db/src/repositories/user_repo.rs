//! Repository for the `users` table.

use sqlx::{PgConnection, PgPool};
use tidyhome_core::error::CoreError;
use tidyhome_core::payroll::WorkerRef;
use tidyhome_core::roles::{Role, ROLE_MAID, ROLE_SENIOR_CLEANER};
use tidyhome_core::status::AssignmentStatus;
use tidyhome_core::types::{DbId, Timestamp};

use crate::models::user::{CreateUser, UpdateUser, User, WorkerRefRow, WorkerSummary};
use crate::DbError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, full_name, email, phone, password_hash, role, is_active, \
                       last_login_at, failed_login_count, locked_until, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (full_name, email, phone, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.password_hash)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Workers (maids and senior cleaners) with per-status assignment counts,
    /// ordered by name.
    pub async fn list_workers(pool: &PgPool) -> Result<Vec<WorkerSummary>, sqlx::Error> {
        sqlx::query_as::<_, WorkerSummary>(
            "SELECT u.id, u.full_name, u.email, u.phone, u.role, u.is_active, u.created_at,
                    COUNT(a.id) FILTER (WHERE a.status_id = $3) AS assigned_count,
                    COUNT(a.id) FILTER (WHERE a.status_id = $4) AS in_progress_count,
                    COUNT(a.id) FILTER (WHERE a.status_id IN ($5, $6)) AS completed_count,
                    COUNT(a.id) AS total_assignments
             FROM users u
             LEFT JOIN assignments a
                    ON a.maid_id = u.id OR a.senior_cleaner_id = u.id
             WHERE u.role IN ($1, $2)
             GROUP BY u.id
             ORDER BY u.full_name, u.id",
        )
        .bind(ROLE_MAID)
        .bind(ROLE_SENIOR_CLEANER)
        .bind(AssignmentStatus::Assigned.id())
        .bind(AssignmentStatus::InProgress.id())
        .bind(AssignmentStatus::Completed.id())
        .bind(AssignmentStatus::Verified.id())
        .fetch_all(pool)
        .await
    }

    /// Id, name and role of every worker, active or not.
    pub async fn worker_refs(pool: &PgPool) -> Result<Vec<WorkerRef>, DbError> {
        let rows = sqlx::query_as::<_, WorkerRefRow>(
            "SELECT id, full_name, role FROM users WHERE role IN ($1, $2) ORDER BY id",
        )
        .bind(ROLE_MAID)
        .bind(ROLE_SENIOR_CLEANER)
        .fetch_all(pool)
        .await?;
        let refs = rows
            .into_iter()
            .map(WorkerRef::try_from)
            .collect::<Result<Vec<_>, CoreError>>()?;
        Ok(refs)
    }

    /// Resolve an active worker inside an open transaction.
    ///
    /// Fails with `NotFound` when the id is unknown, inactive or not a worker,
    /// and with `Validation` when the worker lacks `required` role.
    pub async fn require_worker(
        conn: &mut PgConnection,
        id: DbId,
        required: Option<Role>,
    ) -> Result<WorkerRef, DbError> {
        let row = sqlx::query_as::<_, WorkerRefRow>(
            "SELECT id, full_name, role FROM users
             WHERE id = $1 AND is_active = TRUE AND role IN ($2, $3)",
        )
        .bind(id)
        .bind(ROLE_MAID)
        .bind(ROLE_SENIOR_CLEANER)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Worker",
            id,
        })?;
        let worker = WorkerRef::try_from(row)?;
        if let Some(role) = required {
            if worker.role != role {
                return Err(CoreError::Validation(format!(
                    "Worker {id} is not a {role}"
                ))
                .into());
            }
        }
        Ok(worker)
    }

    /// Update a user. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateUser,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                full_name = COALESCE($2, full_name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                password_hash = COALESCE($5, password_hash),
                is_active = COALESCE($6, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(&input.full_name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.password_hash)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Number of assignments naming the user as maid or inspector.
    pub async fn count_assignments(pool: &PgPool, id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM assignments WHERE maid_id = $1 OR senior_cleaner_id = $1",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Hard-delete a worker that no assignment refers to.
    ///
    /// Fails with `NotFound` for unknown ids (or non-workers) and with
    /// `Conflict` while any assignment still names the worker.
    pub async fn delete_worker(pool: &PgPool, id: DbId) -> Result<(), DbError> {
        if Self::count_assignments(pool, id).await? > 0 {
            return Err(CoreError::Conflict(format!(
                "Worker {id} is referenced by assignments; deactivate instead"
            ))
            .into());
        }
        let result = sqlx::query("DELETE FROM users WHERE id = $1 AND role IN ($2, $3)")
            .bind(id)
            .bind(ROLE_MAID)
            .bind(ROLE_SENIOR_CLEANER)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound {
                entity: "Worker",
                id,
            }
            .into());
        }
        Ok(())
    }

    /// Increment the failed login counter by 1.
    pub async fn increment_failed_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET failed_login_count = failed_login_count + 1 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Lock a user account until the specified timestamp.
    pub async fn lock_account(
        pool: &PgPool,
        id: DbId,
        until: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET locked_until = $2 WHERE id = $1")
            .bind(id)
            .bind(until)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Record a successful login: reset `failed_login_count` to 0, clear `locked_until`,
    /// and set `last_login_at` to now.
    pub async fn record_successful_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET
                failed_login_count = 0,
                locked_until = NULL,
                last_login_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(())
    }
}

//! Repository for the `assignments` table.
//!
//! Reads return domain [`Assignment`]s. Writes after creation go through
//! [`AssignmentRepo::apply`] (or [`AssignmentRepo::assign`]), which lock the
//! row, run the lifecycle method and write the whole assignment back in one
//! transaction, bumping `version`.

use sqlx::{PgConnection, PgPool};
use tidyhome_core::assignment::Assignment;
use tidyhome_core::error::CoreError;
use tidyhome_core::lifecycle::AssignmentPlan;
use tidyhome_core::roles::{Principal, Role};
use tidyhome_core::status::AssignmentStatus;
use tidyhome_core::types::{DbId, Timestamp};

use crate::models::assignment::{encode_checklist, AssignmentRow, CreateAssignment};
use crate::repositories::UserRepo;
use crate::DbError;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, address, client_name, client_phone, service_type, area, price, \
    scheduled_date, scheduled_time, notes, status_id, maid_id, salary, senior_cleaner_id, \
    senior_cleaner_salary, photo_before, photo_after, photos_uploaded_at, checklist_data, \
    inspection_checklist_data, inspection_started_at, inspection_completed_at, assigned_at, \
    completed_at, verified_at, paid, paid_at, payment_removed_at, version, created_at, updated_at";

/// Newest schedule first.
const ORDER: &str = "ORDER BY scheduled_date DESC, scheduled_time DESC, id DESC";

fn to_domain(rows: Vec<AssignmentRow>) -> Result<Vec<Assignment>, CoreError> {
    rows.into_iter().map(Assignment::try_from).collect()
}

/// Provides persistence and transactional lifecycle updates for assignments.
pub struct AssignmentRepo;

impl AssignmentRepo {
    /// Insert a new pending assignment.
    pub async fn create(pool: &PgPool, input: &CreateAssignment) -> Result<Assignment, DbError> {
        let query = format!(
            "INSERT INTO assignments
                (address, client_name, client_phone, service_type, area, price,
                 scheduled_date, scheduled_time, notes, status_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(&input.address)
            .bind(&input.client_name)
            .bind(&input.client_phone)
            .bind(input.service_type.as_str())
            .bind(input.area)
            .bind(input.price)
            .bind(input.scheduled_date)
            .bind(input.scheduled_time)
            .bind(input.notes.as_deref().filter(|n| !n.trim().is_empty()))
            .bind(AssignmentStatus::Pending.id())
            .fetch_one(pool)
            .await?;
        Ok(Assignment::try_from(row)?)
    }

    /// Find an assignment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Assignment>, DbError> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE id = $1");
        let row = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Assignment::try_from).transpose()?)
    }

    /// List assignments, optionally only those in `status`.
    pub async fn list(
        pool: &PgPool,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments
             WHERE ($1::SMALLINT IS NULL OR status_id = $1)
             {ORDER}"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(status.map(AssignmentStatus::id))
            .fetch_all(pool)
            .await?;
        Ok(to_domain(rows)?)
    }

    /// Assignments on which the worker is the maid or the inspector.
    pub async fn list_for_worker(
        pool: &PgPool,
        worker_id: DbId,
    ) -> Result<Vec<Assignment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments
             WHERE maid_id = $1 OR senior_cleaner_id = $1
             {ORDER}"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(worker_id)
            .fetch_all(pool)
            .await?;
        Ok(to_domain(rows)?)
    }

    /// Verified or inspected assignments that still carry a payment record.
    pub async fn list_payroll_candidates(pool: &PgPool) -> Result<Vec<Assignment>, DbError> {
        let query = format!(
            "SELECT {COLUMNS} FROM assignments
             WHERE (verified_at IS NOT NULL OR inspection_completed_at IS NOT NULL)
               AND payment_removed_at IS NULL
             {ORDER}"
        );
        let rows = sqlx::query_as::<_, AssignmentRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(to_domain(rows)?)
    }

    /// Run one lifecycle operation as an atomic read-modify-write.
    ///
    /// Locks the row, rejects a stale `expected_version` with `Conflict`,
    /// runs `op` on the domain assignment and persists the result. When `op`
    /// fails nothing is written.
    pub async fn apply<T, F>(
        pool: &PgPool,
        id: DbId,
        expected_version: Option<i32>,
        op: F,
    ) -> Result<(Assignment, T), DbError>
    where
        F: FnOnce(&mut Assignment) -> Result<T, CoreError>,
    {
        let mut tx = pool.begin().await?;
        let mut assignment = Self::lock(&mut tx, id, expected_version).await?;
        let output = op(&mut assignment)?;
        let saved = Self::write_back(&mut tx, &assignment).await?;
        tx.commit().await?;
        Ok((saved, output))
    }

    /// Assign or reassign workers. Workers are resolved inside the same
    /// transaction; unknown ids fail with `NotFound`.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        expected_version: Option<i32>,
        actor: &Principal,
        plan: &AssignmentPlan,
        now: Timestamp,
    ) -> Result<Assignment, DbError> {
        let mut tx = pool.begin().await?;
        let mut assignment = Self::lock(&mut tx, id, expected_version).await?;
        assignment.assign(actor, plan, now)?;

        UserRepo::require_worker(&mut tx, plan.maid_id, None).await?;
        if let Some(senior_id) = plan.senior_cleaner_id {
            UserRepo::require_worker(&mut tx, senior_id, Some(Role::SeniorCleaner)).await?;
        }

        let saved = Self::write_back(&mut tx, &assignment).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Hard-delete an assignment (refused once verified).
    pub async fn delete(pool: &PgPool, id: DbId, actor: &Principal) -> Result<(), DbError> {
        let mut tx = pool.begin().await?;
        let assignment = Self::lock(&mut tx, id, None).await?;
        assignment.ensure_deletable(actor)?;
        sqlx::query("DELETE FROM assignments WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn lock(
        conn: &mut PgConnection,
        id: DbId,
        expected_version: Option<i32>,
    ) -> Result<Assignment, DbError> {
        let query = format!("SELECT {COLUMNS} FROM assignments WHERE id = $1 FOR UPDATE");
        let row = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Assignment",
                id,
            })?;
        if let Some(expected) = expected_version {
            if expected != row.version {
                return Err(CoreError::Conflict(format!(
                    "Assignment {id} was modified concurrently (expected version {expected}, \
                     current {})",
                    row.version
                ))
                .into());
            }
        }
        Ok(Assignment::try_from(row)?)
    }

    async fn write_back(conn: &mut PgConnection, a: &Assignment) -> Result<Assignment, DbError> {
        let checklist = a.checklist.as_ref().map(encode_checklist).transpose()?;
        let inspection_checklist = a
            .inspection
            .as_ref()
            .map(|i| encode_checklist(&i.checklist))
            .transpose()?;

        let query = format!(
            "UPDATE assignments SET
                address = $2, client_name = $3, client_phone = $4, service_type = $5,
                area = $6, price = $7, scheduled_date = $8, scheduled_time = $9, notes = $10,
                status_id = $11, maid_id = $12, salary = $13, senior_cleaner_id = $14,
                senior_cleaner_salary = $15, photo_before = $16, photo_after = $17,
                photos_uploaded_at = $18, checklist_data = $19, inspection_checklist_data = $20,
                inspection_started_at = $21, inspection_completed_at = $22, assigned_at = $23,
                completed_at = $24, verified_at = $25, paid = $26, paid_at = $27,
                payment_removed_at = $28, version = version + 1
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AssignmentRow>(&query)
            .bind(a.id)
            .bind(&a.address)
            .bind(&a.client_name)
            .bind(&a.client_phone)
            .bind(a.service_type.as_str())
            .bind(a.area)
            .bind(a.price)
            .bind(a.scheduled_date)
            .bind(a.scheduled_time)
            .bind(&a.notes)
            .bind(a.status.id())
            .bind(a.maid_id)
            .bind(a.salary)
            .bind(a.senior_cleaner_id)
            .bind(a.senior_cleaner_salary)
            .bind(&a.photos.before)
            .bind(&a.photos.after)
            .bind(a.photos.uploaded_at)
            .bind(checklist)
            .bind(inspection_checklist)
            .bind(a.inspection.as_ref().map(|i| i.started_at))
            .bind(a.inspection_completed_at())
            .bind(a.assigned_at)
            .bind(a.completed_at)
            .bind(a.verified_at)
            .bind(a.paid)
            .bind(a.paid_at)
            .bind(a.payment_removed_at)
            .fetch_one(&mut *conn)
            .await?;
        Ok(Assignment::try_from(row)?)
    }
}

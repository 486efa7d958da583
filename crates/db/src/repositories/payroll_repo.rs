//! Payroll views derived from assignments.
//!
//! Nothing here is stored: each call loads the relevant assignments and
//! runs the ledger derivation from `tidyhome_core::payroll`.

use chrono::NaiveDate;
use sqlx::PgPool;
use tidyhome_core::payroll::{self, PaymentFilter, PaymentList, SalaryHistory, SalaryStats};
use tidyhome_core::types::DbId;

use crate::repositories::{AssignmentRepo, UserRepo};
use crate::DbError;

pub struct PayrollRepo;

impl PayrollRepo {
    /// Per-worker earnings with `today` selecting the current month.
    pub async fn salary_stats(pool: &PgPool, today: NaiveDate) -> Result<SalaryStats, DbError> {
        let assignments = AssignmentRepo::list_payroll_candidates(pool).await?;
        let workers = UserRepo::worker_refs(pool).await?;
        Ok(payroll::salary_stats(&assignments, &workers, today))
    }

    pub async fn payments(pool: &PgPool, filter: &PaymentFilter) -> Result<PaymentList, DbError> {
        let assignments = AssignmentRepo::list_payroll_candidates(pool).await?;
        let workers = UserRepo::worker_refs(pool).await?;
        Ok(payroll::payment_records(&assignments, &workers, filter))
    }

    pub async fn salary_history(pool: &PgPool, worker_id: DbId) -> Result<SalaryHistory, DbError> {
        let assignments = AssignmentRepo::list_for_worker(pool, worker_id).await?;
        Ok(payroll::salary_history(&assignments, worker_id))
    }
}

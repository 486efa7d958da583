//! Payroll ledger: a read model derived from assignments on demand.
//!
//! An assignment contributes one ledger line per salaried worker once it is
//! verified. The maid's line accrues at `verified_at`; the senior cleaner's
//! line accrues when the inspection was completed, falling back to
//! `verified_at`.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::roles::Role;
use crate::service_type::ServiceType;
use crate::types::{Amount, DbId, Timestamp};

/// One worker's earning from one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerLine {
    pub assignment_id: DbId,
    pub worker_id: DbId,
    /// Capacity the worker earned in: maid or senior cleaner.
    pub role: Role,
    pub amount: Amount,
    pub accrued_at: Timestamp,
    pub paid: bool,
}

/// Ledger lines contributed by one assignment (zero, one or two).
pub fn ledger_lines(a: &Assignment) -> Vec<LedgerLine> {
    let Some(verified_at) = a.verified_at else {
        return Vec::new();
    };
    if a.payment_removed_at.is_some() {
        return Vec::new();
    }

    let mut lines = Vec::with_capacity(2);
    if let (Some(worker_id), Some(amount)) = (a.maid_id, a.salary) {
        lines.push(LedgerLine {
            assignment_id: a.id,
            worker_id,
            role: Role::Maid,
            amount,
            accrued_at: verified_at,
            paid: a.paid,
        });
    }
    if let (Some(worker_id), Some(amount)) = (a.senior_cleaner_id, a.senior_cleaner_salary) {
        lines.push(LedgerLine {
            assignment_id: a.id,
            worker_id,
            role: Role::SeniorCleaner,
            amount,
            accrued_at: a.inspection_completed_at().unwrap_or(verified_at),
            paid: a.paid,
        });
    }
    lines
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Minimal worker identity needed to label ledger output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerRef {
    pub id: DbId,
    pub full_name: String,
    pub role: Role,
}

struct Directory<'a>(HashMap<DbId, &'a WorkerRef>);

impl<'a> Directory<'a> {
    fn new(workers: &'a [WorkerRef]) -> Self {
        Self(workers.iter().map(|w| (w.id, w)).collect())
    }

    fn name(&self, id: DbId) -> String {
        self.0
            .get(&id)
            .map(|w| w.full_name.clone())
            .unwrap_or_else(|| format!("Worker #{id}"))
    }
}

/* --------------------------------------------------------------------------
Salary statistics
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerStats {
    pub worker_id: DbId,
    pub worker_name: String,
    pub role: Role,
    pub total_earned: Amount,
    pub completed_count: u32,
    pub current_month_earned: Amount,
    pub current_month_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalaryStats {
    pub stats: Vec<WorkerStats>,
    /// Sum of every paid ledger line.
    pub total_paid: Amount,
}

/// Per-worker earnings, all time and for the calendar month of `today`.
///
/// Every worker in `workers` gets a row, even with no earnings. Workers that
/// appear only on ledger lines are appended with a placeholder name.
pub fn salary_stats(
    assignments: &[Assignment],
    workers: &[WorkerRef],
    today: NaiveDate,
) -> SalaryStats {
    let directory = Directory::new(workers);
    let mut stats: Vec<WorkerStats> = workers
        .iter()
        .filter(|w| w.role.is_worker())
        .map(|w| WorkerStats {
            worker_id: w.id,
            worker_name: w.full_name.clone(),
            role: w.role,
            total_earned: 0,
            completed_count: 0,
            current_month_earned: 0,
            current_month_count: 0,
        })
        .collect();
    let mut total_paid = 0;

    for line in assignments.iter().flat_map(ledger_lines) {
        if line.paid {
            total_paid += line.amount;
        }
        let idx = match stats.iter().position(|s| s.worker_id == line.worker_id) {
            Some(idx) => idx,
            None => {
                stats.push(WorkerStats {
                    worker_id: line.worker_id,
                    worker_name: directory.name(line.worker_id),
                    role: line.role,
                    total_earned: 0,
                    completed_count: 0,
                    current_month_earned: 0,
                    current_month_count: 0,
                });
                stats.len() - 1
            }
        };
        let row = &mut stats[idx];
        row.total_earned += line.amount;
        row.completed_count += 1;
        if same_month(line.accrued_at.date_naive(), today) {
            row.current_month_earned += line.amount;
            row.current_month_count += 1;
        }
    }

    stats.sort_by(|a, b| {
        b.total_earned
            .cmp(&a.total_earned)
            .then_with(|| a.worker_name.cmp(&b.worker_name))
    });
    SalaryStats { stats, total_paid }
}

/* --------------------------------------------------------------------------
Payment records
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentFilter {
    pub paid: Option<bool>,
    /// Inclusive lower bound on the accrual date.
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the accrual date.
    pub date_to: Option<NaiveDate>,
}

impl PaymentFilter {
    fn matches(&self, paid: bool, accrued_on: NaiveDate) -> bool {
        self.paid.is_none_or(|p| p == paid)
            && self.date_from.is_none_or(|from| accrued_on >= from)
            && self.date_to.is_none_or(|to| accrued_on <= to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    pub assignment_id: DbId,
    pub address: String,
    pub client_name: String,
    pub scheduled_date: NaiveDate,
    pub service_type: ServiceType,
    pub area: f64,
    pub maid_id: Option<DbId>,
    pub maid_name: Option<String>,
    pub salary: Option<Amount>,
    pub senior_cleaner_id: Option<DbId>,
    pub senior_cleaner_name: Option<String>,
    pub senior_cleaner_salary: Option<Amount>,
    pub verified_at: Option<Timestamp>,
    pub inspection_completed_at: Option<Timestamp>,
    pub paid: bool,
    pub paid_at: Option<Timestamp>,
    /// Salary plus senior cleaner salary.
    pub total: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentList {
    pub records: Vec<PaymentRecord>,
    pub total: Amount,
}

/// Verified or inspected assignments with their payout, newest first.
pub fn payment_records(
    assignments: &[Assignment],
    workers: &[WorkerRef],
    filter: &PaymentFilter,
) -> PaymentList {
    let directory = Directory::new(workers);
    let mut dated: Vec<(Timestamp, PaymentRecord)> = assignments
        .iter()
        .filter(|a| a.has_payment_record())
        .filter_map(|a| {
            let accrued_at = a.verified_at.or_else(|| a.inspection_completed_at())?;
            if !filter.matches(a.paid, accrued_at.date_naive()) {
                return None;
            }
            let record = PaymentRecord {
                assignment_id: a.id,
                address: a.address.clone(),
                client_name: a.client_name.clone(),
                scheduled_date: a.scheduled_date,
                service_type: a.service_type,
                area: a.area,
                maid_id: a.maid_id,
                maid_name: a.maid_id.map(|id| directory.name(id)),
                salary: a.salary,
                senior_cleaner_id: a.senior_cleaner_id,
                senior_cleaner_name: a.senior_cleaner_id.map(|id| directory.name(id)),
                senior_cleaner_salary: a.senior_cleaner_salary,
                verified_at: a.verified_at,
                inspection_completed_at: a.inspection_completed_at(),
                paid: a.paid,
                paid_at: a.paid_at,
                total: a.total_salary(),
            };
            Some((accrued_at, record))
        })
        .collect();

    dated.sort_by(|(a, ra), (b, rb)| b.cmp(a).then(rb.assignment_id.cmp(&ra.assignment_id)));
    let records: Vec<PaymentRecord> = dated.into_iter().map(|(_, r)| r).collect();
    let total = records.iter().map(|r| r.total).sum();
    PaymentList { records, total }
}

/* --------------------------------------------------------------------------
Salary history
-------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryHistoryRecord {
    pub assignment_id: DbId,
    pub address: String,
    pub service_type: ServiceType,
    pub scheduled_date: NaiveDate,
    pub role: Role,
    pub amount: Amount,
    pub accrued_at: Timestamp,
    pub paid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalaryHistory {
    pub records: Vec<SalaryHistoryRecord>,
    pub total_earned: Amount,
}

/// One worker's accrued ledger lines, newest first.
pub fn salary_history(assignments: &[Assignment], worker_id: DbId) -> SalaryHistory {
    let mut records: Vec<SalaryHistoryRecord> = assignments
        .iter()
        .flat_map(|a| {
            ledger_lines(a)
                .into_iter()
                .filter(|l| l.worker_id == worker_id)
                .map(move |l| SalaryHistoryRecord {
                    assignment_id: a.id,
                    address: a.address.clone(),
                    service_type: a.service_type,
                    scheduled_date: a.scheduled_date,
                    role: l.role,
                    amount: l.amount,
                    accrued_at: l.accrued_at,
                    paid: l.paid,
                })
        })
        .collect();
    records.sort_by(|a, b| b.accrued_at.cmp(&a.accrued_at));
    let total_earned = records.iter().map(|r| r.amount).sum();
    SalaryHistory {
        records,
        total_earned,
    }
}

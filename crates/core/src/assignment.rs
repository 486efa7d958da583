//! The assignment entity and its owned sub-entities.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::checklist::{Checklist, ChecklistState};
use crate::roles::Principal;
use crate::service_type::ServiceType;
use crate::status::AssignmentStatus;
use crate::types::{Amount, DbId, Timestamp};

/// Photo evidence uploaded by the maid. Values are opaque references
/// (URLs or data URIs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoEvidence {
    pub before: Option<String>,
    pub after: Option<String>,
    pub uploaded_at: Option<Timestamp>,
}

impl PhotoEvidence {
    /// At least one of before/after is present.
    pub fn has_any(&self) -> bool {
        self.before.is_some() || self.after.is_some()
    }
}

/// The senior cleaner's inspection of a completed assignment.
///
/// Exists only once the inspection has been started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    pub checklist: Checklist,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
}

impl Inspection {
    pub fn state(&self) -> ChecklistState {
        if self.completed_at.is_some() {
            ChecklistState::Complete
        } else {
            ChecklistState::InProgress
        }
    }
}

/// One scheduled cleaning job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: DbId,

    pub address: String,
    pub client_name: String,
    pub client_phone: String,
    pub service_type: ServiceType,
    /// Area in square metres; always positive.
    pub area: f64,
    /// Price quoted to the client, if recorded.
    pub price: Option<Amount>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub notes: Option<String>,

    pub status: AssignmentStatus,

    pub maid_id: Option<DbId>,
    pub salary: Option<Amount>,
    pub senior_cleaner_id: Option<DbId>,
    pub senior_cleaner_salary: Option<Amount>,

    pub photos: PhotoEvidence,
    /// Present iff the assignment has been assigned.
    pub checklist: Option<Checklist>,
    pub inspection: Option<Inspection>,

    pub assigned_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub verified_at: Option<Timestamp>,

    pub paid: bool,
    pub paid_at: Option<Timestamp>,
    /// Set when an admin removed the payment record; the assignment then
    /// no longer contributes to the payroll ledger.
    pub payment_removed_at: Option<Timestamp>,

    /// Optimistic concurrency token, bumped by every persisted write.
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Assignment {
    /// Completed by the maid, not yet verified by an admin.
    pub fn awaiting_verification(&self) -> bool {
        self.status == AssignmentStatus::Completed && self.verified_at.is_none()
    }

    /// Cleaning checklist progress; 0 before assignment.
    pub fn checklist_progress(&self) -> u8 {
        self.checklist.as_ref().map_or(0, Checklist::progress_percent)
    }

    pub fn cleaning_state(&self) -> ChecklistState {
        match &self.checklist {
            None => ChecklistState::NotStarted,
            Some(list) => list.state(),
        }
    }

    pub fn inspection_state(&self) -> ChecklistState {
        match &self.inspection {
            None => ChecklistState::NotStarted,
            Some(inspection) => inspection.state(),
        }
    }

    pub fn inspection_completed_at(&self) -> Option<Timestamp> {
        self.inspection.as_ref().and_then(|i| i.completed_at)
    }

    /// Whether the assignment carries a payroll entry: verified by an admin
    /// or inspected by the senior cleaner, not cancelled and not removed.
    pub fn has_payment_record(&self) -> bool {
        self.payment_removed_at.is_none()
            && self.status != AssignmentStatus::Cancelled
            && (self.verified_at.is_some() || self.inspection_completed_at().is_some())
    }

    /// Sum of both salaries, treating absent ones as zero.
    pub fn total_salary(&self) -> Amount {
        self.salary.unwrap_or(0) + self.senior_cleaner_salary.unwrap_or(0)
    }

    pub fn is_maid(&self, actor: &Principal) -> bool {
        self.maid_id == Some(actor.user_id)
    }

    pub fn is_inspector(&self, actor: &Principal) -> bool {
        self.senior_cleaner_id == Some(actor.user_id)
    }

    /// Admins see everything; workers see assignments they are on.
    pub fn visible_to(&self, actor: &Principal) -> bool {
        actor.is_admin() || self.is_maid(actor) || self.is_inspector(actor)
    }
}

//! # Assignment Lifecycle
//!
//! Every mutation of an [`Assignment`] goes through one of the methods in
//! this module. Each method checks, in order:
//!
//! 1. who is acting (`Forbidden` for anyone but the permitted actors),
//! 2. whether the action is legal from the current status
//!    (`InvalidStateTransition`),
//! 3. the action's own guards (`PreconditionFailed` / `Validation`),
//!
//! and only then mutates the assignment. A failed call leaves the assignment
//! exactly as it was.
//!
//! ```text
//!            assign                start              complete             verify
//! pending ──────────▶ assigned ──────────▶ in_progress ──────────▶ completed ──────────▶ verified
//!                       │  ▲                   │                       │
//!                       │  └─ reassign ────────┴───────────────────────┤
//!                       │                                              │
//!                       └──────────── cancel ──────────────────────────┴──▶ cancelled
//! ```
//!
//! The inspection sub-workflow (start / update / complete) runs alongside
//! `completed` and never changes the status.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::assignment::{Assignment, Inspection};
use crate::checklist::{Checklist, ChecklistItemUpdate, ChecklistKind};
use crate::error::CoreError;
use crate::roles::Principal;
use crate::service_type::ServiceType;
use crate::status::AssignmentStatus;
use crate::types::{Amount, DbId, Timestamp};

/// Workers and salaries chosen by an admin when assigning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssignmentPlan {
    pub maid_id: DbId,
    pub salary: Amount,
    pub senior_cleaner_id: Option<DbId>,
    pub senior_cleaner_salary: Option<Amount>,
}

impl AssignmentPlan {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.salary < 0 {
            return Err(CoreError::Validation("Salary must not be negative".into()));
        }
        if self.senior_cleaner_salary.is_some_and(|s| s < 0) {
            return Err(CoreError::Validation(
                "Senior cleaner salary must not be negative".into(),
            ));
        }
        if self.senior_cleaner_salary.is_some() && self.senior_cleaner_id.is_none() {
            return Err(CoreError::Validation(
                "Senior cleaner salary requires a senior cleaner".into(),
            ));
        }
        if self.senior_cleaner_id == Some(self.maid_id) {
            return Err(CoreError::Validation(
                "The inspector must be a different worker than the maid".into(),
            ));
        }
        Ok(())
    }
}

/// Admin edit of the scheduling fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AssignmentPatch {
    pub address: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub service_type: Option<ServiceType>,
    pub area: Option<f64>,
    pub price: Option<Amount>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    /// An empty string clears the notes.
    pub notes: Option<String>,
}

/// Which photos to store. Absent fields keep the previous photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PhotoUpload {
    pub before: Option<String>,
    pub after: Option<String>,
}

impl Assignment {
    /* ----------------------------------------------------------------------
    Actors
    ---------------------------------------------------------------------- */

    fn ensure_admin(actor: &Principal) -> Result<(), CoreError> {
        actor.require_admin()
    }

    /// Admin, or the maid assigned to this job.
    fn ensure_assignee(&self, actor: &Principal) -> Result<(), CoreError> {
        if actor.is_admin() || self.is_maid(actor) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Only the assigned maid or an admin can do this".into(),
            ))
        }
    }

    /// Admin, or the senior cleaner assigned to inspect this job.
    fn ensure_inspector(&self, actor: &Principal) -> Result<(), CoreError> {
        if actor.is_admin() || self.is_inspector(actor) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Only the assigned senior cleaner or an admin can do this".into(),
            ))
        }
    }

    fn ensure_transition(&self, to: AssignmentStatus, action: &str) -> Result<(), CoreError> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(CoreError::invalid_transition(self.status, action))
        }
    }

    /// A paid job keeps the workers and salaries it was paid for.
    fn ensure_unpaid(&self, what: &str) -> Result<(), CoreError> {
        if self.paid {
            return Err(CoreError::Conflict(format!(
                "Assignment {} is already paid and cannot be {what}",
                self.id
            )));
        }
        Ok(())
    }

    /// Statuses in which the maid works on the job.
    fn ensure_workable(&self, action: &str) -> Result<(), CoreError> {
        match self.status {
            AssignmentStatus::Assigned | AssignmentStatus::InProgress => Ok(()),
            from => Err(CoreError::invalid_transition(from, action)),
        }
    }

    /* ----------------------------------------------------------------------
    Status transitions
    ---------------------------------------------------------------------- */

    /// Assign workers and salaries.
    ///
    /// From `pending` this moves to `assigned` and creates the cleaning
    /// checklist. From `assigned`, `in_progress` or `completed` it is a
    /// reassignment: ids and salaries are replaced, status and checklist
    /// progress are kept. Paid jobs cannot be reassigned.
    pub fn assign(
        &mut self,
        actor: &Principal,
        plan: &AssignmentPlan,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        match self.status {
            AssignmentStatus::Pending
            | AssignmentStatus::Assigned
            | AssignmentStatus::InProgress
            | AssignmentStatus::Completed => {}
            from => return Err(CoreError::invalid_transition(from, "assign")),
        }
        self.ensure_unpaid("reassigned")?;
        plan.validate()?;

        if self.status == AssignmentStatus::Pending {
            self.status = AssignmentStatus::Assigned;
            self.checklist = Some(Checklist::from_template(
                ChecklistKind::Cleaning,
                self.service_type,
            ));
            self.assigned_at = Some(now);
        }
        self.maid_id = Some(plan.maid_id);
        self.salary = Some(plan.salary);
        self.senior_cleaner_id = plan.senior_cleaner_id;
        self.senior_cleaner_salary = plan.senior_cleaner_salary;
        Ok(())
    }

    /// `assigned → in_progress`, by the assigned maid.
    pub fn start(&mut self, actor: &Principal) -> Result<(), CoreError> {
        self.ensure_assignee(actor)?;
        self.ensure_transition(AssignmentStatus::InProgress, "start")?;
        self.status = AssignmentStatus::InProgress;
        Ok(())
    }

    /// `in_progress → completed`, by the assigned maid, once the cleaning
    /// checklist is done and at least one photo is uploaded.
    pub fn complete(&mut self, actor: &Principal, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_assignee(actor)?;
        self.ensure_transition(AssignmentStatus::Completed, "complete")?;

        if let Some(list) = &self.checklist {
            if !list.is_complete() {
                return Err(CoreError::PreconditionFailed(format!(
                    "Cleaning checklist is not finished: {} of {} items unchecked",
                    list.unchecked_count(),
                    list.total()
                )));
            }
        }
        if !self.photos.has_any() {
            return Err(CoreError::PreconditionFailed(
                "Upload at least one photo (before or after) to complete".into(),
            ));
        }

        self.status = AssignmentStatus::Completed;
        self.completed_at = Some(now);
        Ok(())
    }

    /// `completed → verified`, by an admin. Freezes the salaries.
    pub fn verify(&mut self, actor: &Principal, now: Timestamp) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        self.ensure_transition(AssignmentStatus::Verified, "verify")?;
        self.status = AssignmentStatus::Verified;
        self.verified_at = Some(now);
        Ok(())
    }

    /// Cancel from `assigned`, `in_progress` or `completed` (not yet
    /// verified) and not paid, by an admin. Worker ids are kept for the
    /// record.
    pub fn cancel(&mut self, actor: &Principal) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        self.ensure_transition(AssignmentStatus::Cancelled, "cancel")?;
        self.ensure_unpaid("cancelled")?;
        self.status = AssignmentStatus::Cancelled;
        Ok(())
    }

    /// Generic status change, dispatched to the dedicated transition.
    pub fn set_status(
        &mut self,
        actor: &Principal,
        to: AssignmentStatus,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        match to {
            AssignmentStatus::InProgress => self.start(actor),
            AssignmentStatus::Completed => self.complete(actor, now),
            AssignmentStatus::Verified => self.verify(actor, now),
            AssignmentStatus::Cancelled => self.cancel(actor),
            AssignmentStatus::Pending | AssignmentStatus::Assigned => Err(
                CoreError::invalid_transition(self.status, format!("set status '{to}' on")),
            ),
        }
    }

    /* ----------------------------------------------------------------------
    Maid work: photos and cleaning checklist
    ---------------------------------------------------------------------- */

    pub fn upload_photos(
        &mut self,
        actor: &Principal,
        upload: PhotoUpload,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        self.ensure_assignee(actor)?;
        self.ensure_workable("upload photos to")?;

        let PhotoUpload { before, after } = upload;
        let before = before.filter(|p| !p.trim().is_empty());
        let after = after.filter(|p| !p.trim().is_empty());
        if before.is_none() && after.is_none() {
            return Err(CoreError::Validation(
                "At least one photo (before or after) is required".into(),
            ));
        }

        if before.is_some() {
            self.photos.before = before;
        }
        if after.is_some() {
            self.photos.after = after;
        }
        self.photos.uploaded_at = Some(now);
        Ok(())
    }

    fn cleaning_checklist_mut(&mut self) -> Result<&mut Checklist, CoreError> {
        self.checklist
            .as_mut()
            .ok_or_else(|| CoreError::Internal("Assigned job has no cleaning checklist".into()))
    }

    /// Replace the cleaning checklist's checked flags.
    pub fn update_checklist(
        &mut self,
        actor: &Principal,
        updates: &[ChecklistItemUpdate],
    ) -> Result<(), CoreError> {
        self.ensure_assignee(actor)?;
        self.ensure_workable("update the checklist of")?;
        self.cleaning_checklist_mut()?.replace_checks(updates)
    }

    /// Flip one cleaning checklist item; returns its new checked flag.
    pub fn toggle_checklist_item(
        &mut self,
        actor: &Principal,
        item_id: &str,
    ) -> Result<bool, CoreError> {
        self.ensure_assignee(actor)?;
        self.ensure_workable("update the checklist of")?;
        self.cleaning_checklist_mut()?.toggle(item_id)
    }

    /* ----------------------------------------------------------------------
    Inspection
    ---------------------------------------------------------------------- */

    pub fn start_inspection(&mut self, actor: &Principal, now: Timestamp) -> Result<(), CoreError> {
        self.ensure_inspector(actor)?;
        if self.status != AssignmentStatus::Completed {
            return Err(CoreError::invalid_transition(self.status, "start inspection of"));
        }
        if self.senior_cleaner_id.is_none() {
            return Err(CoreError::PreconditionFailed(
                "No senior cleaner is assigned to inspect this job".into(),
            ));
        }
        if self.inspection.is_some() {
            return Err(CoreError::Conflict("Inspection already started".into()));
        }

        self.inspection = Some(Inspection {
            checklist: Checklist::from_template(ChecklistKind::Inspection, self.service_type),
            started_at: now,
            completed_at: None,
        });
        Ok(())
    }

    fn open_inspection_mut(&mut self) -> Result<&mut Inspection, CoreError> {
        match self.inspection.as_mut() {
            None => Err(CoreError::PreconditionFailed(
                "Inspection has not been started".into(),
            )),
            Some(i) if i.completed_at.is_some() => {
                Err(CoreError::Conflict("Inspection is already completed".into()))
            }
            Some(i) => Ok(i),
        }
    }

    pub fn update_inspection_checklist(
        &mut self,
        actor: &Principal,
        updates: &[ChecklistItemUpdate],
    ) -> Result<(), CoreError> {
        self.ensure_inspector(actor)?;
        self.open_inspection_mut()?.checklist.replace_checks(updates)
    }

    /// Finish the inspection once every inspection item is checked. Does not
    /// change the assignment status.
    pub fn complete_inspection(
        &mut self,
        actor: &Principal,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        self.ensure_inspector(actor)?;
        let inspection = self.open_inspection_mut()?;
        if !inspection.checklist.is_complete() {
            return Err(CoreError::PreconditionFailed(format!(
                "Inspection checklist is not finished: {} of {} items unchecked",
                inspection.checklist.unchecked_count(),
                inspection.checklist.total()
            )));
        }
        inspection.completed_at = Some(now);
        Ok(())
    }

    /* ----------------------------------------------------------------------
    Admin edits
    ---------------------------------------------------------------------- */

    /// Apply an admin edit of the scheduling fields. Rejected once the job
    /// is verified or cancelled.
    pub fn update_details(
        &mut self,
        actor: &Principal,
        patch: AssignmentPatch,
    ) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        if self.status.is_terminal() {
            return Err(CoreError::invalid_transition(self.status, "edit"));
        }
        if let Some(area) = patch.area {
            if !(area.is_finite() && area > 0.0) {
                return Err(CoreError::Validation("Area must be positive".into()));
            }
        }
        if patch.price.is_some_and(|p| p < 0) {
            return Err(CoreError::Validation("Price must not be negative".into()));
        }
        for (field, value) in [
            ("address", &patch.address),
            ("client_name", &patch.client_name),
            ("client_phone", &patch.client_phone),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(CoreError::Validation(format!("{field} must not be empty")));
            }
        }
        if let Some(st) = patch.service_type {
            if st != self.service_type && self.checklist.is_some() {
                return Err(CoreError::Validation(
                    "Service type cannot change once the cleaning checklist exists".into(),
                ));
            }
        }

        let AssignmentPatch {
            address,
            client_name,
            client_phone,
            service_type,
            area,
            price,
            scheduled_date,
            scheduled_time,
            notes,
        } = patch;
        if let Some(v) = address {
            self.address = v;
        }
        if let Some(v) = client_name {
            self.client_name = v;
        }
        if let Some(v) = client_phone {
            self.client_phone = v;
        }
        if let Some(v) = service_type {
            self.service_type = v;
        }
        if let Some(v) = area {
            self.area = v;
        }
        if price.is_some() {
            self.price = price;
        }
        if let Some(v) = scheduled_date {
            self.scheduled_date = v;
        }
        if let Some(v) = scheduled_time {
            self.scheduled_time = v;
        }
        if let Some(v) = notes {
            self.notes = if v.trim().is_empty() { None } else { Some(v) };
        }
        Ok(())
    }

    /// Admin hard delete is refused for verified jobs.
    pub fn ensure_deletable(&self, actor: &Principal) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        if self.status == AssignmentStatus::Verified {
            return Err(CoreError::invalid_transition(self.status, "delete"));
        }
        Ok(())
    }

    /* ----------------------------------------------------------------------
    Payments
    ---------------------------------------------------------------------- */

    /// One-way `paid: false → true`. Repeating it is a no-op.
    pub fn mark_paid(&mut self, actor: &Principal, now: Timestamp) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        if self.payment_removed_at.is_some() {
            return Err(CoreError::NotFound {
                entity: "PaymentRecord",
                id: self.id,
            });
        }
        if self.paid {
            return Ok(());
        }
        if !matches!(
            self.status,
            AssignmentStatus::Completed | AssignmentStatus::Verified
        ) {
            return Err(CoreError::PreconditionFailed(format!(
                "Only completed or verified jobs can be paid (status '{}')",
                self.status
            )));
        }
        if self.salary.is_none() && self.senior_cleaner_salary.is_none() {
            return Err(CoreError::PreconditionFailed(
                "No salary is set for this job".into(),
            ));
        }
        self.paid = true;
        self.paid_at = Some(now);
        Ok(())
    }

    /// Remove the job's payment record from the payroll ledger for good.
    pub fn remove_payment_record(
        &mut self,
        actor: &Principal,
        now: Timestamp,
    ) -> Result<(), CoreError> {
        Self::ensure_admin(actor)?;
        if !self.has_payment_record() {
            return Err(CoreError::NotFound {
                entity: "PaymentRecord",
                id: self.id,
            });
        }
        self.payment_removed_at = Some(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::assignment::fixtures::{pending, ts};
    use crate::checklist::{ChecklistItem, ChecklistState};
    use crate::payroll::{payment_records, PaymentFilter};
    use crate::roles::Role;
    use AssignmentStatus::*;

    const MAID: DbId = 10;
    const SENIOR: DbId = 20;

    fn admin() -> Principal {
        Principal::new(1, Role::Admin)
    }

    fn maid() -> Principal {
        Principal::new(MAID, Role::Maid)
    }

    fn senior() -> Principal {
        Principal::new(SENIOR, Role::SeniorCleaner)
    }

    fn plan(salary: Amount) -> AssignmentPlan {
        AssignmentPlan {
            maid_id: MAID,
            salary,
            senior_cleaner_id: None,
            senior_cleaner_salary: None,
        }
    }

    fn plan_with_inspector(salary: Amount, senior_salary: Amount) -> AssignmentPlan {
        AssignmentPlan {
            maid_id: MAID,
            salary,
            senior_cleaner_id: Some(SENIOR),
            senior_cleaner_salary: Some(senior_salary),
        }
    }

    fn check_all(a: &mut Assignment, actor: &Principal) {
        let updates: Vec<ChecklistItemUpdate> = a
            .checklist
            .as_ref()
            .unwrap()
            .items
            .iter()
            .map(|i| ChecklistItemUpdate {
                id: i.id.clone(),
                checked: true,
            })
            .collect();
        a.update_checklist(actor, &updates).unwrap();
    }

    fn photo_after() -> PhotoUpload {
        PhotoUpload {
            before: None,
            after: Some("https://cdn.example/after.jpg".into()),
        }
    }

    /// An in-progress job with a small three-item checklist.
    fn in_progress_with_three_items() -> Assignment {
        let mut a = pending(ServiceType::Basic);
        a.assign(&admin(), &plan(5000), ts(2, 9)).unwrap();
        a.checklist = Some(Checklist {
            template_version: 1,
            items: ["a", "b", "c"]
                .into_iter()
                .map(|id| ChecklistItem {
                    id: id.into(),
                    text: id.to_uppercase(),
                    category: "Test".into(),
                    checked: false,
                })
                .collect(),
        });
        a.start(&maid()).unwrap();
        a
    }

    fn completed(plan: &AssignmentPlan) -> Assignment {
        let mut a = pending(ServiceType::Basic);
        a.assign(&admin(), plan, ts(2, 9)).unwrap();
        a.start(&maid()).unwrap();
        a.upload_photos(&maid(), photo_after(), ts(3, 10)).unwrap();
        check_all(&mut a, &maid());
        a.complete(&maid(), ts(3, 11)).unwrap();
        a
    }

    // ------------------------------------------------------------------
    // Transition graph
    // ------------------------------------------------------------------

    #[test]
    fn pending_cannot_jump_to_verified() {
        let mut a = pending(ServiceType::Basic);
        let err = a.set_status(&admin(), Verified, ts(2, 9)).unwrap_err();
        assert_matches!(err, CoreError::InvalidStateTransition { from: Pending, .. });
        assert_eq!(a.status, Pending);
        assert!(a.verified_at.is_none());
    }

    #[test]
    fn set_status_cannot_target_pending_or_assigned() {
        let mut a = in_progress_with_three_items();
        for to in [Pending, Assigned] {
            assert_matches!(
                a.set_status(&admin(), to, ts(3, 9)),
                Err(CoreError::InvalidStateTransition { from: InProgress, .. })
            );
        }
    }

    #[test]
    fn start_requires_assigned() {
        let mut a = pending(ServiceType::Basic);
        assert_matches!(
            a.start(&admin()),
            Err(CoreError::InvalidStateTransition { from: Pending, .. })
        );
    }

    #[test]
    fn verify_requires_completed() {
        let mut a = in_progress_with_three_items();
        assert_matches!(
            a.verify(&admin(), ts(4, 9)),
            Err(CoreError::InvalidStateTransition { from: InProgress, .. })
        );
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    #[test]
    fn assign_creates_cleaning_checklist() {
        let mut a = pending(ServiceType::Deep);
        assert!(a.checklist.is_none());
        a.assign(&admin(), &plan(5000), ts(2, 9)).unwrap();

        assert_eq!(a.status, Assigned);
        assert_eq!(a.maid_id, Some(MAID));
        assert_eq!(a.salary, Some(5000));
        assert_eq!(a.assigned_at, Some(ts(2, 9)));
        let list = a.checklist.as_ref().unwrap();
        assert_eq!(
            list.total(),
            ChecklistKind::Cleaning.template_for(ServiceType::Deep).len()
        );
        assert_eq!(list.checked_count(), 0);
    }

    #[test]
    fn assign_rejects_negative_salary() {
        let mut a = pending(ServiceType::Basic);
        assert_matches!(
            a.assign(&admin(), &plan(-1), ts(2, 9)),
            Err(CoreError::Validation(_))
        );
        assert_eq!(a.status, Pending);
        assert!(a.checklist.is_none());
    }

    #[test]
    fn assign_rejects_inspector_salary_without_inspector() {
        let mut a = pending(ServiceType::Basic);
        let p = AssignmentPlan {
            senior_cleaner_salary: Some(100),
            ..plan(1000)
        };
        assert_matches!(a.assign(&admin(), &p, ts(2, 9)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn assign_rejects_same_worker_as_inspector() {
        let mut a = pending(ServiceType::Basic);
        let p = AssignmentPlan {
            senior_cleaner_id: Some(MAID),
            ..plan(1000)
        };
        assert_matches!(a.assign(&admin(), &p, ts(2, 9)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn only_admin_assigns() {
        let mut a = pending(ServiceType::Basic);
        assert_matches!(
            a.assign(&maid(), &plan(1000), ts(2, 9)),
            Err(CoreError::Forbidden(_))
        );
    }

    #[test]
    fn reassign_keeps_checklist_progress() {
        let mut a = in_progress_with_three_items();
        a.toggle_checklist_item(&maid(), "a").unwrap();

        let other = AssignmentPlan {
            maid_id: 11,
            salary: 6000,
            senior_cleaner_id: Some(SENIOR),
            senior_cleaner_salary: Some(1500),
        };
        a.assign(&admin(), &other, ts(3, 9)).unwrap();

        assert_eq!(a.status, InProgress);
        assert_eq!(a.maid_id, Some(11));
        assert_eq!(a.salary, Some(6000));
        assert_eq!(a.senior_cleaner_salary, Some(1500));
        assert_eq!(a.checklist.as_ref().unwrap().checked_count(), 1);
        assert_eq!(a.assigned_at, Some(ts(2, 9)));
    }

    #[test]
    fn reassign_allowed_while_awaiting_verification() {
        let mut a = completed(&plan(5000));
        assert!(a.awaiting_verification());
        a.assign(&admin(), &plan(5500), ts(4, 9)).unwrap();
        assert_eq!(a.salary, Some(5500));
        assert_eq!(a.status, Completed);
    }

    #[test]
    fn verified_salary_is_frozen() {
        let mut a = completed(&plan(5000));
        a.verify(&admin(), ts(4, 9)).unwrap();
        assert_eq!(a.verified_at, Some(ts(4, 9)));

        assert_matches!(
            a.assign(&admin(), &plan(9000), ts(5, 9)),
            Err(CoreError::InvalidStateTransition { from: Verified, .. })
        );
        let patch = AssignmentPatch {
            notes: Some("late edit".into()),
            ..Default::default()
        };
        assert_matches!(
            a.update_details(&admin(), patch),
            Err(CoreError::InvalidStateTransition { from: Verified, .. })
        );
        assert_eq!(a.salary, Some(5000));
        assert!(a.notes.is_none());
    }

    // ------------------------------------------------------------------
    // Completion guards
    // ------------------------------------------------------------------

    #[test]
    fn completion_waits_for_last_checklist_item() {
        let mut a = in_progress_with_three_items();
        a.upload_photos(&maid(), photo_after(), ts(3, 9)).unwrap();
        a.toggle_checklist_item(&maid(), "a").unwrap();
        a.toggle_checklist_item(&maid(), "b").unwrap();

        assert_matches!(
            a.complete(&maid(), ts(3, 10)),
            Err(CoreError::PreconditionFailed(_))
        );
        assert_eq!(a.status, InProgress);
        assert!(a.completed_at.is_none());

        a.toggle_checklist_item(&maid(), "c").unwrap();
        a.complete(&maid(), ts(3, 11)).unwrap();
        assert_eq!(a.status, Completed);
        assert_eq!(a.completed_at, Some(ts(3, 11)));
    }

    #[test]
    fn empty_checklist_is_vacuously_complete() {
        let mut a = in_progress_with_three_items();
        a.checklist = Some(Checklist {
            template_version: 1,
            items: Vec::new(),
        });
        a.upload_photos(&maid(), photo_after(), ts(3, 9)).unwrap();
        a.complete(&maid(), ts(3, 10)).unwrap();
        assert_eq!(a.status, Completed);
    }

    #[test]
    fn completion_requires_a_photo() {
        let mut a = in_progress_with_three_items();
        check_all(&mut a, &maid());
        assert_matches!(
            a.complete(&maid(), ts(3, 10)),
            Err(CoreError::PreconditionFailed(_))
        );

        let before_only = PhotoUpload {
            before: Some("before.jpg".into()),
            after: None,
        };
        a.upload_photos(&maid(), before_only, ts(3, 11)).unwrap();
        a.complete(&maid(), ts(3, 12)).unwrap();
        assert_eq!(a.status, Completed);
    }

    #[test]
    fn other_maid_cannot_complete() {
        let mut a = in_progress_with_three_items();
        let stranger = Principal::new(99, Role::Maid);
        assert_matches!(a.complete(&stranger, ts(3, 9)), Err(CoreError::Forbidden(_)));
        assert_matches!(a.toggle_checklist_item(&stranger, "a"), Err(CoreError::Forbidden(_)));
    }

    // ------------------------------------------------------------------
    // Photos and checklist
    // ------------------------------------------------------------------

    #[test]
    fn upload_requires_at_least_one_photo() {
        let mut a = in_progress_with_three_items();
        assert_matches!(
            a.upload_photos(&maid(), PhotoUpload::default(), ts(3, 9)),
            Err(CoreError::Validation(_))
        );
        let blank = PhotoUpload {
            before: Some("  ".into()),
            after: None,
        };
        assert_matches!(
            a.upload_photos(&maid(), blank, ts(3, 9)),
            Err(CoreError::Validation(_))
        );
        assert!(a.photos.uploaded_at.is_none());
    }

    #[test]
    fn upload_keeps_previous_photo() {
        let mut a = in_progress_with_three_items();
        let before = PhotoUpload {
            before: Some("before.jpg".into()),
            after: None,
        };
        a.upload_photos(&maid(), before, ts(3, 9)).unwrap();
        a.upload_photos(&maid(), photo_after(), ts(3, 10)).unwrap();
        assert_eq!(a.photos.before.as_deref(), Some("before.jpg"));
        assert!(a.photos.after.is_some());
        assert_eq!(a.photos.uploaded_at, Some(ts(3, 10)));
    }

    #[test]
    fn no_photos_after_completion() {
        let mut a = completed(&plan(5000));
        assert_matches!(
            a.upload_photos(&maid(), photo_after(), ts(4, 9)),
            Err(CoreError::InvalidStateTransition { from: Completed, .. })
        );
    }

    #[test]
    fn toggle_twice_restores_state() {
        let mut a = in_progress_with_three_items();
        let before = a.checklist.clone();
        assert!(a.toggle_checklist_item(&maid(), "b").unwrap());
        assert!(!a.toggle_checklist_item(&maid(), "b").unwrap());
        assert_eq!(a.checklist, before);
    }

    #[test]
    fn checklist_frozen_after_completion() {
        let mut a = completed(&plan(5000));
        let first = a.checklist.as_ref().unwrap().items[0].id.clone();
        assert_matches!(
            a.toggle_checklist_item(&maid(), &first),
            Err(CoreError::InvalidStateTransition { from: Completed, .. })
        );
    }

    #[test]
    fn partial_checklist_update_is_rejected_untouched() {
        let mut a = in_progress_with_three_items();
        let partial = [ChecklistItemUpdate {
            id: "a".into(),
            checked: true,
        }];
        assert_matches!(
            a.update_checklist(&maid(), &partial),
            Err(CoreError::Validation(_))
        );
        assert_eq!(a.checklist.as_ref().unwrap().checked_count(), 0);
    }

    // ------------------------------------------------------------------
    // Cancellation
    // ------------------------------------------------------------------

    #[test]
    fn cancel_from_working_states() {
        let mut a = in_progress_with_three_items();
        a.cancel(&admin()).unwrap();
        assert_eq!(a.status, Cancelled);
        assert_eq!(a.maid_id, Some(MAID));

        let mut c = completed(&plan(5000));
        c.cancel(&admin()).unwrap();
        assert_eq!(c.status, Cancelled);
    }

    #[test]
    fn cancel_rejected_from_pending_and_terminal() {
        let mut a = pending(ServiceType::Basic);
        assert_matches!(
            a.cancel(&admin()),
            Err(CoreError::InvalidStateTransition { from: Pending, .. })
        );

        let mut v = completed(&plan(5000));
        v.verify(&admin(), ts(4, 9)).unwrap();
        assert_matches!(
            v.cancel(&admin()),
            Err(CoreError::InvalidStateTransition { from: Verified, .. })
        );
    }

    #[test]
    fn maid_cannot_cancel() {
        let mut a = in_progress_with_three_items();
        assert_matches!(a.cancel(&maid()), Err(CoreError::Forbidden(_)));
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    #[test]
    fn inspection_only_on_completed_jobs() {
        let mut a = pending(ServiceType::Basic);
        a.assign(&admin(), &plan_with_inspector(5000, 2000), ts(2, 9))
            .unwrap();
        assert_matches!(
            a.start_inspection(&senior(), ts(2, 10)),
            Err(CoreError::InvalidStateTransition { from: Assigned, .. })
        );
    }

    #[test]
    fn inspection_needs_an_inspector() {
        let mut a = completed(&plan(5000));
        assert_matches!(
            a.start_inspection(&admin(), ts(4, 9)),
            Err(CoreError::PreconditionFailed(_))
        );
    }

    #[test]
    fn inspection_runs_to_completion_without_verifying() {
        let mut a = completed(&plan_with_inspector(5000, 2000));
        assert_eq!(a.inspection_state(), ChecklistState::NotStarted);

        a.start_inspection(&senior(), ts(4, 9)).unwrap();
        assert_eq!(a.inspection_state(), ChecklistState::InProgress);
        assert_matches!(
            a.start_inspection(&senior(), ts(4, 9)),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            a.complete_inspection(&senior(), ts(4, 10)),
            Err(CoreError::PreconditionFailed(_))
        );

        let updates: Vec<ChecklistItemUpdate> = a
            .inspection
            .as_ref()
            .unwrap()
            .checklist
            .items
            .iter()
            .map(|i| ChecklistItemUpdate {
                id: i.id.clone(),
                checked: true,
            })
            .collect();
        a.update_inspection_checklist(&senior(), &updates).unwrap();
        a.complete_inspection(&senior(), ts(4, 11)).unwrap();

        assert_eq!(a.inspection_state(), ChecklistState::Complete);
        assert_eq!(a.inspection_completed_at(), Some(ts(4, 11)));
        assert_eq!(a.status, Completed);
        assert!(a.verified_at.is_none());

        assert_matches!(
            a.update_inspection_checklist(&senior(), &updates),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn inspection_checklist_before_start_fails() {
        let mut a = completed(&plan_with_inspector(5000, 2000));
        assert_matches!(
            a.update_inspection_checklist(&senior(), &[]),
            Err(CoreError::PreconditionFailed(_))
        );
    }

    #[test]
    fn maid_cannot_inspect() {
        let mut a = completed(&plan_with_inspector(5000, 2000));
        assert_matches!(
            a.start_inspection(&maid(), ts(4, 9)),
            Err(CoreError::Forbidden(_))
        );
    }

    // ------------------------------------------------------------------
    // Admin edits
    // ------------------------------------------------------------------

    #[test]
    fn service_type_locked_once_checklist_exists() {
        let mut p = pending(ServiceType::Basic);
        p.update_details(
            &admin(),
            AssignmentPatch {
                service_type: Some(ServiceType::Office),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(p.service_type, ServiceType::Office);

        let mut a = in_progress_with_three_items();
        assert_matches!(
            a.update_details(
                &admin(),
                AssignmentPatch {
                    service_type: Some(ServiceType::Deep),
                    ..Default::default()
                }
            ),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn update_details_validates_fields() {
        let mut a = pending(ServiceType::Basic);
        let bad_area = AssignmentPatch {
            area: Some(0.0),
            ..Default::default()
        };
        assert_matches!(a.update_details(&admin(), bad_area), Err(CoreError::Validation(_)));
        let blank = AssignmentPatch {
            address: Some(" ".into()),
            ..Default::default()
        };
        assert_matches!(a.update_details(&admin(), blank), Err(CoreError::Validation(_)));
        assert_eq!(a.area, 50.0);
    }

    #[test]
    fn update_details_clears_notes_with_empty_string() {
        let mut a = pending(ServiceType::Basic);
        a.notes = Some("ring twice".into());
        a.update_details(
            &admin(),
            AssignmentPatch {
                notes: Some(String::new()),
                area: Some(75.5),
                ..Default::default()
            },
        )
        .unwrap();
        assert!(a.notes.is_none());
        assert_eq!(a.area, 75.5);
    }

    #[test]
    fn verified_job_cannot_be_deleted() {
        let mut a = completed(&plan(5000));
        a.ensure_deletable(&admin()).unwrap();
        a.verify(&admin(), ts(4, 9)).unwrap();
        assert_matches!(
            a.ensure_deletable(&admin()),
            Err(CoreError::InvalidStateTransition { from: Verified, .. })
        );
        assert_matches!(a.ensure_deletable(&maid()), Err(CoreError::Forbidden(_)));
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    #[test]
    fn mark_paid_is_one_way_and_idempotent() {
        let mut a = completed(&plan(5000));
        a.verify(&admin(), ts(4, 9)).unwrap();
        a.mark_paid(&admin(), ts(5, 9)).unwrap();
        assert!(a.paid);
        assert_eq!(a.paid_at, Some(ts(5, 9)));

        a.mark_paid(&admin(), ts(6, 9)).unwrap();
        assert!(a.paid);
        assert_eq!(a.paid_at, Some(ts(5, 9)));
    }

    #[test]
    fn mark_paid_requires_completed_job() {
        let mut a = in_progress_with_three_items();
        assert_matches!(
            a.mark_paid(&admin(), ts(4, 9)),
            Err(CoreError::PreconditionFailed(_))
        );
        assert!(!a.paid);

        let mut c = completed(&plan(5000));
        c.salary = None;
        assert_matches!(
            c.mark_paid(&admin(), ts(4, 9)),
            Err(CoreError::PreconditionFailed(_))
        );
    }

    #[test]
    fn removed_payment_record_is_gone() {
        let mut a = completed(&plan(5000));
        assert_matches!(
            a.remove_payment_record(&admin(), ts(4, 9)),
            Err(CoreError::NotFound { entity: "PaymentRecord", .. })
        );

        a.verify(&admin(), ts(4, 9)).unwrap();
        assert!(a.has_payment_record());
        a.remove_payment_record(&admin(), ts(5, 9)).unwrap();
        assert!(!a.has_payment_record());
        assert_matches!(
            a.mark_paid(&admin(), ts(6, 9)),
            Err(CoreError::NotFound { .. })
        );
        assert_eq!(a.status, Verified);
    }

    #[test]
    fn cancelled_job_drops_out_of_payments() {
        let mut a = completed(&plan_with_inspector(5000, 2000));
        a.start_inspection(&senior(), ts(4, 9)).unwrap();
        let updates: Vec<ChecklistItemUpdate> = a
            .inspection
            .as_ref()
            .unwrap()
            .checklist
            .items
            .iter()
            .map(|i| ChecklistItemUpdate {
                id: i.id.clone(),
                checked: true,
            })
            .collect();
        a.update_inspection_checklist(&senior(), &updates).unwrap();
        a.complete_inspection(&senior(), ts(4, 10)).unwrap();
        assert!(a.has_payment_record());

        a.cancel(&admin()).unwrap();
        assert!(!a.has_payment_record());

        let unpaid = PaymentFilter {
            paid: Some(false),
            ..Default::default()
        };
        let list = payment_records(std::slice::from_ref(&a), &[], &unpaid);
        assert!(list.records.is_empty());
        assert_eq!(list.total, 0);
        assert_matches!(
            a.remove_payment_record(&admin(), ts(5, 9)),
            Err(CoreError::NotFound { entity: "PaymentRecord", .. })
        );
    }

    #[test]
    fn paid_job_keeps_its_workers() {
        let mut a = completed(&plan(5000));
        a.mark_paid(&admin(), ts(4, 9)).unwrap();

        assert_matches!(
            a.assign(&admin(), &plan(9000), ts(5, 9)),
            Err(CoreError::Conflict(_))
        );
        assert_eq!(a.salary, Some(5000));
        assert_matches!(a.cancel(&admin()), Err(CoreError::Conflict(_)));
        assert_eq!(a.status, Completed);

        a.verify(&admin(), ts(5, 10)).unwrap();
        assert!(a.paid);
    }

    // ------------------------------------------------------------------
    // Scenario
    // ------------------------------------------------------------------

    #[test]
    fn basic_job_end_to_end() {
        let mut a = pending(ServiceType::Basic);
        a.assign(&admin(), &plan(5000), ts(2, 9)).unwrap();
        a.set_status(&maid(), InProgress, ts(3, 8)).unwrap();
        a.upload_photos(&maid(), photo_after(), ts(3, 9)).unwrap();

        assert_matches!(
            a.set_status(&maid(), Completed, ts(3, 10)),
            Err(CoreError::PreconditionFailed(_))
        );
        check_all(&mut a, &maid());
        assert_eq!(a.checklist_progress(), 100);
        a.set_status(&maid(), Completed, ts(3, 11)).unwrap();
        a.set_status(&admin(), Verified, ts(4, 9)).unwrap();

        assert_eq!(a.status, Verified);
        assert!(a.has_payment_record());
    }
}

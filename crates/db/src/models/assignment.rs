//! Assignment row model and request DTOs.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use sqlx::FromRow;
use tidyhome_core::assignment::{Assignment, Inspection, PhotoEvidence};
use tidyhome_core::checklist::{Checklist, ChecklistItemUpdate};
use tidyhome_core::error::CoreError;
use tidyhome_core::lifecycle::{AssignmentPatch, AssignmentPlan, PhotoUpload};
use tidyhome_core::service_type::ServiceType;
use tidyhome_core::status::{AssignmentStatus, StatusId};
use tidyhome_core::types::{Amount, DbId, Timestamp};
use validator::Validate;

/// Full row from the `assignments` table.
///
/// Checklists are stored inline as JSONB. Convert to the domain
/// [`Assignment`] with `Assignment::try_from(row)`.
#[derive(Debug, Clone, FromRow)]
pub struct AssignmentRow {
    pub id: DbId,
    pub address: String,
    pub client_name: String,
    pub client_phone: String,
    pub service_type: String,
    pub area: f64,
    pub price: Option<Amount>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub notes: Option<String>,
    pub status_id: StatusId,
    pub maid_id: Option<DbId>,
    pub salary: Option<Amount>,
    pub senior_cleaner_id: Option<DbId>,
    pub senior_cleaner_salary: Option<Amount>,
    pub photo_before: Option<String>,
    pub photo_after: Option<String>,
    pub photos_uploaded_at: Option<Timestamp>,
    pub checklist_data: Option<serde_json::Value>,
    pub inspection_checklist_data: Option<serde_json::Value>,
    pub inspection_started_at: Option<Timestamp>,
    pub inspection_completed_at: Option<Timestamp>,
    pub assigned_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub verified_at: Option<Timestamp>,
    pub paid: bool,
    pub paid_at: Option<Timestamp>,
    pub payment_removed_at: Option<Timestamp>,
    pub version: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

fn decode_checklist(id: DbId, value: serde_json::Value) -> Result<Checklist, CoreError> {
    serde_json::from_value(value)
        .map_err(|e| CoreError::Internal(format!("Corrupt checklist on assignment {id}: {e}")))
}

/// Serialize a checklist for a JSONB column.
pub fn encode_checklist(list: &Checklist) -> Result<serde_json::Value, CoreError> {
    serde_json::to_value(list).map_err(|e| CoreError::Internal(format!("Checklist encoding: {e}")))
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = CoreError;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        let id = row.id;
        let status = AssignmentStatus::from_id(row.status_id).ok_or_else(|| {
            CoreError::Internal(format!("Unknown status id {} on assignment {id}", row.status_id))
        })?;
        let service_type: ServiceType = row
            .service_type
            .parse()
            .map_err(|_| CoreError::Internal(format!("Unknown service type on assignment {id}")))?;

        let checklist = row
            .checklist_data
            .map(|v| decode_checklist(id, v))
            .transpose()?;
        let inspection = match (row.inspection_checklist_data, row.inspection_started_at) {
            (Some(data), Some(started_at)) => Some(Inspection {
                checklist: decode_checklist(id, data)?,
                started_at,
                completed_at: row.inspection_completed_at,
            }),
            _ => None,
        };

        Ok(Assignment {
            id,
            address: row.address,
            client_name: row.client_name,
            client_phone: row.client_phone,
            service_type,
            area: row.area,
            price: row.price,
            scheduled_date: row.scheduled_date,
            scheduled_time: row.scheduled_time,
            notes: row.notes,
            status,
            maid_id: row.maid_id,
            salary: row.salary,
            senior_cleaner_id: row.senior_cleaner_id,
            senior_cleaner_salary: row.senior_cleaner_salary,
            photos: PhotoEvidence {
                before: row.photo_before,
                after: row.photo_after,
                uploaded_at: row.photos_uploaded_at,
            },
            checklist,
            inspection,
            assigned_at: row.assigned_at,
            completed_at: row.completed_at,
            verified_at: row.verified_at,
            paid: row.paid,
            paid_at: row.paid_at,
            payment_removed_at: row.payment_removed_at,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/* --------------------------------------------------------------------------
Request DTOs
-------------------------------------------------------------------------- */

/// DTO for creating a new (pending) assignment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAssignment {
    #[validate(length(min = 1, max = 500))]
    pub address: String,
    #[validate(length(min = 1, max = 200))]
    pub client_name: String,
    #[validate(length(min = 1, max = 50))]
    pub client_phone: String,
    pub service_type: ServiceType,
    #[validate(range(exclusive_min = 0.0))]
    pub area: f64,
    #[validate(range(min = 0))]
    pub price: Option<Amount>,
    pub scheduled_date: NaiveDate,
    pub scheduled_time: NaiveTime,
    pub notes: Option<String>,
}

/// Admin edit of scheduling fields.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAssignment {
    #[serde(flatten)]
    pub patch: AssignmentPatch,
    pub expected_version: Option<i32>,
}

/// Body of `POST /assignments/{id}/assign`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AssignWorkerRequest {
    pub maid_id: Option<DbId>,
    #[validate(range(min = 0))]
    pub salary: Option<Amount>,
    pub senior_cleaner_id: Option<DbId>,
    #[validate(range(min = 0))]
    pub senior_cleaner_salary: Option<Amount>,
    pub expected_version: Option<i32>,
}

impl AssignWorkerRequest {
    /// Require the mandatory fields and build the domain plan.
    pub fn to_plan(&self) -> Result<AssignmentPlan, CoreError> {
        let maid_id = self
            .maid_id
            .ok_or_else(|| CoreError::Validation("maid_id is required".into()))?;
        let salary = self
            .salary
            .ok_or_else(|| CoreError::Validation("salary is required".into()))?;
        Ok(AssignmentPlan {
            maid_id,
            salary,
            senior_cleaner_id: self.senior_cleaner_id,
            senior_cleaner_salary: self.senior_cleaner_salary,
        })
    }
}

/// Body of `POST /assignments/{id}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusRequest {
    pub status: AssignmentStatus,
    pub expected_version: Option<i32>,
}

/// Body of `POST /assignments/{id}/photos`.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotosRequest {
    pub before: Option<String>,
    pub after: Option<String>,
    pub expected_version: Option<i32>,
}

impl PhotosRequest {
    pub fn to_upload(&self) -> PhotoUpload {
        PhotoUpload {
            before: self.before.clone(),
            after: self.after.clone(),
        }
    }
}

/// Full-instance checklist update (cleaning or inspection).
#[derive(Debug, Clone, Deserialize)]
pub struct ChecklistUpdateRequest {
    pub items: Vec<ChecklistItemUpdate>,
    pub expected_version: Option<i32>,
}

/// `?expected_version=` for actions without a body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionQuery {
    pub expected_version: Option<i32>,
}

/// `?status=` filter for the assignment list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssignmentListQuery {
    pub status: Option<String>,
}

impl AssignmentListQuery {
    pub fn parsed_status(&self) -> Result<Option<AssignmentStatus>, CoreError> {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()
    }
}

//! Assignment status and the legal transition graph.
//!
//! Each variant's discriminant matches the seed data order (1-based) in the
//! `assignment_statuses` lookup table.
//!
//! ```text
//! pending ──▶ assigned ──▶ in_progress ──▶ completed ──▶ verified
//!                │              │              │
//!                └──────────────┴──────────────┴──▶ cancelled
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Status ID type matching SMALLINT in the database.
pub type StatusId = i16;

/// Workflow status of a cleaning assignment.
#[repr(i16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignmentStatus {
    /// Created by an admin, no worker yet.
    Pending = 1,
    /// A worker and salary are set; cleaning checklist exists.
    Assigned = 2,
    /// The worker has started the job.
    InProgress = 3,
    /// The worker finished; awaiting admin verification.
    Completed = 4,
    /// Admin confirmed the job. Terminal; salary is frozen.
    Verified = 5,
    /// Admin cancelled the job. Terminal.
    Cancelled = 6,
}

impl AssignmentStatus {
    pub const ALL: [AssignmentStatus; 6] = [
        Self::Pending,
        Self::Assigned,
        Self::InProgress,
        Self::Completed,
        Self::Verified,
        Self::Cancelled,
    ];

    /// Return the database status ID.
    pub fn id(self) -> StatusId {
        self as StatusId
    }

    /// Resolve a database status ID.
    pub fn from_id(id: StatusId) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Assigned => "assigned",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Verified => "verified",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further status change is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Verified | Self::Cancelled)
    }

    /// The edges of the lifecycle graph. Reassignment is not a status change
    /// and is therefore not represented here.
    pub fn can_transition_to(self, to: AssignmentStatus) -> bool {
        use AssignmentStatus::*;
        matches!(
            (self, to),
            (Pending, Assigned)
                | (Assigned, InProgress)
                | (InProgress, Completed)
                | (Completed, Verified)
                | (Assigned, Cancelled)
                | (InProgress, Cancelled)
                | (Completed, Cancelled)
        )
    }
}

impl From<AssignmentStatus> for StatusId {
    fn from(value: AssignmentStatus) -> Self {
        value as StatusId
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(|st| st.as_str()).collect();
                CoreError::Validation(format!(
                    "Invalid status '{s}'. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

impl Serialize for AssignmentStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AssignmentStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

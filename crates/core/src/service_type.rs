//! Cleaning service types.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Kind of cleaning ordered for an address. Drives which checklist template
/// items apply to the assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Basic,
    Deep,
    /// Post-renovation cleaning. `after` is accepted as a legacy spelling.
    #[serde(alias = "after")]
    AfterRepair,
    Office,
}

impl ServiceType {
    pub const ALL: [ServiceType; 4] = [
        ServiceType::Basic,
        ServiceType::Deep,
        ServiceType::AfterRepair,
        ServiceType::Office,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceType::Basic => "basic",
            ServiceType::Deep => "deep",
            ServiceType::AfterRepair => "after_repair",
            ServiceType::Office => "office",
        }
    }

    /// Human-readable label.
    pub fn display_name(self) -> &'static str {
        match self {
            ServiceType::Basic => "Basic cleaning",
            ServiceType::Deep => "Deep cleaning",
            ServiceType::AfterRepair => "After-repair cleaning",
            ServiceType::Office => "Office cleaning",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ServiceType::Basic),
            "deep" => Ok(ServiceType::Deep),
            "after_repair" | "after" => Ok(ServiceType::AfterRepair),
            "office" => Ok(ServiceType::Office),
            other => Err(CoreError::Validation(format!(
                "Invalid service type '{other}'. Must be one of: basic, deep, after_repair, office"
            ))),
        }
    }
}

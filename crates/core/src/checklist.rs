//! Checklist templates and per-assignment checklist instances.
//!
//! Two static catalogs exist: the cleaning checklist filled by the maid and
//! the inspection checklist filled by the senior cleaner. An instance is a
//! copy of the template items applicable to one service type, each carrying
//! a `checked` flag. Instances are stored inline on the assignment and are
//! always replaced as a whole.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::service_type::ServiceType;
use crate::service_type::ServiceType::{AfterRepair, Basic, Deep, Office};

/* --------------------------------------------------------------------------
Templates
-------------------------------------------------------------------------- */

/// Version stamped onto every instance created from the current catalogs.
pub const TEMPLATE_VERSION: u32 = 1;

/// One item of a static checklist catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateItem {
    pub id: &'static str,
    pub text: &'static str,
    pub category: &'static str,
    pub service_types: &'static [ServiceType],
}

const EVERY_TYPE: &[ServiceType] = &[Basic, Deep, AfterRepair, Office];
const RESIDENTIAL: &[ServiceType] = &[Basic, Deep, AfterRepair];
const DEEP_AND_AFTER: &[ServiceType] = &[Deep, AfterRepair];
const AFTER_ONLY: &[ServiceType] = &[AfterRepair];
const OFFICE_ONLY: &[ServiceType] = &[Office];

const fn item(
    id: &'static str,
    text: &'static str,
    category: &'static str,
    service_types: &'static [ServiceType],
) -> TemplateItem {
    TemplateItem {
        id,
        text,
        category,
        service_types,
    }
}

/// Cleaning checklist catalog.
pub const CLEANING_TEMPLATE: &[TemplateItem] = &[
    item("c1", "Dust the furniture", "General areas", EVERY_TYPE),
    item("c2", "Vacuum the floors", "General areas", EVERY_TYPE),
    item("c3", "Mop the floors", "General areas", EVERY_TYPE),
    item("c4", "Wipe the mirrors", "General areas", EVERY_TYPE),
    item("c5", "Wipe door handles", "General areas", EVERY_TYPE),
    item("c6", "Wipe light switches", "General areas", EVERY_TYPE),
    item("c7", "Wash the sink", "Kitchen", EVERY_TYPE),
    item("c8", "Clean the stove", "Kitchen", RESIDENTIAL),
    item("c9", "Wipe the countertops", "Kitchen", EVERY_TYPE),
    item("c10", "Wash the fridge exterior", "Kitchen", EVERY_TYPE),
    item("c11", "Clean the microwave", "Kitchen", EVERY_TYPE),
    item("c12", "Take out the trash", "Kitchen", EVERY_TYPE),
    item("c13", "Wash the toilet", "Bathroom", EVERY_TYPE),
    item("c14", "Clean the washbasin", "Bathroom", EVERY_TYPE),
    item("c15", "Wash the bathtub or shower", "Bathroom", RESIDENTIAL),
    item("c16", "Wipe the bathroom mirror", "Bathroom", EVERY_TYPE),
    item("c17", "Wash the tiles", "Bathroom", EVERY_TYPE),
    item("c18", "Polish the faucets", "Bathroom", EVERY_TYPE),
    item("c19", "Wipe the window sills", "Bedroom", RESIDENTIAL),
    item("c20", "Vacuum under the bed", "Bedroom", RESIDENTIAL),
    item("c21", "Dust all surfaces", "Bedroom", RESIDENTIAL),
    item("c22", "Wash the baseboards", "Deep cleaning", DEEP_AND_AFTER),
    item("c23", "Clean radiators between sections", "Deep cleaning", DEEP_AND_AFTER),
    item("c24", "Clean the fridge inside", "Deep cleaning", DEEP_AND_AFTER),
    item("c25", "Clean the oven inside", "Deep cleaning", DEEP_AND_AFTER),
    item("c26", "Degrease the range hood", "Deep cleaning", DEEP_AND_AFTER),
    item("c27", "Remove construction dust", "After repair", AFTER_ONLY),
    item("c28", "Remove paint and plaster traces", "After repair", AFTER_ONLY),
    item("c29", "Peel protective film from windows", "After repair", AFTER_ONLY),
    item("c30", "Wipe the desks", "Office", OFFICE_ONLY),
    item("c31", "Dust the office equipment", "Office", OFFICE_ONLY),
    item("c32", "Tidy the meeting room", "Office", OFFICE_ONLY),
    item("c33", "Empty the paper bins", "Office", OFFICE_ONLY),
];

/// Inspection checklist catalog. Base items apply to every type; deep items
/// to deep and after-repair; after-repair and office items to their type.
pub const INSPECTION_TEMPLATE: &[TemplateItem] = &[
    item("i1", "Surfaces are dust-free", "General check", EVERY_TYPE),
    item("i2", "Floors are clean, no streaks or stains", "General check", EVERY_TYPE),
    item("i3", "Mirrors are streak-free", "General check", EVERY_TYPE),
    item("i4", "No dust on radiators and window sills", "General check", EVERY_TYPE),
    item("i5", "Door handles and switches are clean", "General check", EVERY_TYPE),
    item("i6", "Trash taken out", "General check", EVERY_TYPE),
    item("i7", "Sink free of residue and stains", "Kitchen", EVERY_TYPE),
    item("i8", "Stove and countertops spotless", "Kitchen", EVERY_TYPE),
    item("i9", "Fridge exterior free of fingerprints", "Kitchen", EVERY_TYPE),
    item("i10", "Microwave clean inside and out", "Kitchen", EVERY_TYPE),
    item("i11", "Faucets shine", "Kitchen", EVERY_TYPE),
    item("i12", "Toilet spotless", "Bathroom", EVERY_TYPE),
    item("i13", "Washbasin free of limescale", "Bathroom", EVERY_TYPE),
    item("i14", "Bath or shower free of soap marks", "Bathroom", EVERY_TYPE),
    item("i15", "Tiles clean, grout without dirt", "Bathroom", EVERY_TYPE),
    item("i16", "Mirrors free of streaks and drops", "Bathroom", EVERY_TYPE),
    item("i17", "Faucets polished", "Bathroom", EVERY_TYPE),
    item("i18", "Baseboards clean along their length", "Detailed check", DEEP_AND_AFTER),
    item("i19", "Doors wiped on both sides", "Detailed check", DEEP_AND_AFTER),
    item("i20", "Radiators clean between sections", "Detailed check", DEEP_AND_AFTER),
    item("i21", "Chandeliers and lamps dust-free", "Detailed check", DEEP_AND_AFTER),
    item("i22", "Fridge clean inside", "Detailed check", DEEP_AND_AFTER),
    item("i23", "Oven clean inside", "Detailed check", DEEP_AND_AFTER),
    item("i24", "Range hood clean", "Detailed check", DEEP_AND_AFTER),
    item("i25", "Kitchen cabinets wiped outside", "Detailed check", DEEP_AND_AFTER),
    item("i26", "Grout between tiles clean", "Detailed check", DEEP_AND_AFTER),
    item("i27", "Plumbing fixtures polished", "Detailed check", DEEP_AND_AFTER),
    item("i28", "Windows clean (if included)", "Detailed check", DEEP_AND_AFTER),
    item("i29", "No construction dust", "After repair", AFTER_ONLY),
    item("i30", "Renovation traces removed", "After repair", AFTER_ONLY),
    item("i31", "Protective film removed from windows", "After repair", AFTER_ONLY),
    item("i32", "Desks wiped", "Office", OFFICE_ONLY),
    item("i33", "Office equipment clean", "Office", OFFICE_ONLY),
    item("i34", "Meeting room tidy", "Office", OFFICE_ONLY),
    item("i35", "Kitchen area clean", "Office", OFFICE_ONLY),
];

/// Which of the two per-assignment checklists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistKind {
    #[default]
    Cleaning,
    Inspection,
}

impl ChecklistKind {
    pub fn catalog(self) -> &'static [TemplateItem] {
        match self {
            ChecklistKind::Cleaning => CLEANING_TEMPLATE,
            ChecklistKind::Inspection => INSPECTION_TEMPLATE,
        }
    }

    /// Catalog items applicable to `service_type`, in catalog order.
    pub fn template_for(self, service_type: ServiceType) -> Vec<&'static TemplateItem> {
        self.catalog()
            .iter()
            .filter(|item| item.service_types.contains(&service_type))
            .collect()
    }
}

/* --------------------------------------------------------------------------
Instances
-------------------------------------------------------------------------- */

/// One item of a checklist instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    pub category: String,
    #[serde(default)]
    pub checked: bool,
}

/// Client-supplied checked flag for one item in a full-instance update.
/// Any other fields sent alongside (text, category) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChecklistItemUpdate {
    pub id: String,
    pub checked: bool,
}

/// Derived progress of a checklist (or of the sub-entity that owns it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistState {
    NotStarted,
    InProgress,
    Complete,
}

/// A mutable checklist bound to one assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub template_version: u32,
    pub items: Vec<ChecklistItem>,
}

/// Progress of one category; `item_ids` in instance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub item_ids: Vec<String>,
    pub checked: usize,
    pub total: usize,
}

impl Checklist {
    /// Fresh, fully unchecked instance of `kind` for `service_type`.
    pub fn from_template(kind: ChecklistKind, service_type: ServiceType) -> Self {
        let items = kind
            .template_for(service_type)
            .into_iter()
            .map(|t| ChecklistItem {
                id: t.id.to_string(),
                text: t.text.to_string(),
                category: t.category.to_string(),
                checked: false,
            })
            .collect();
        Self {
            template_version: TEMPLATE_VERSION,
            items,
        }
    }

    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn checked_count(&self) -> usize {
        self.items.iter().filter(|i| i.checked).count()
    }

    pub fn unchecked_count(&self) -> usize {
        self.total() - self.checked_count()
    }

    /// Checked share in whole percent, rounded half up. An empty checklist
    /// counts as 100%.
    pub fn progress_percent(&self) -> u8 {
        let total = self.total();
        if total == 0 {
            return 100;
        }
        let checked = self.checked_count();
        ((200 * checked + total) / (2 * total)) as u8
    }

    /// True when every item is checked (vacuously true when empty).
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|i| i.checked)
    }

    pub fn state(&self) -> ChecklistState {
        if self.is_complete() {
            ChecklistState::Complete
        } else if self.checked_count() == 0 {
            ChecklistState::NotStarted
        } else {
            ChecklistState::InProgress
        }
    }

    /// Flip the checked flag of `item_id`, returning the new value.
    pub fn toggle(&mut self, item_id: &str) -> Result<bool, CoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::Validation(format!("Unknown checklist item '{item_id}'")))?;
        item.checked = !item.checked;
        Ok(item.checked)
    }

    /// Replace every item's checked flag from a full-instance update.
    ///
    /// The update must name each item of the instance exactly once. Nothing
    /// is modified when validation fails.
    pub fn replace_checks(&mut self, updates: &[ChecklistItemUpdate]) -> Result<(), CoreError> {
        if updates.len() != self.items.len() {
            return Err(CoreError::Validation(format!(
                "Checklist update must contain all {} items, got {}",
                self.items.len(),
                updates.len()
            )));
        }

        let mut resolved = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let matching: Vec<&ChecklistItemUpdate> =
                updates.iter().filter(|u| u.id == item.id).collect();
            match matching.as_slice() {
                [single] => resolved.push(single.checked),
                [] => {
                    return Err(CoreError::Validation(format!(
                        "Checklist update is missing item '{}'",
                        item.id
                    )))
                }
                _ => {
                    return Err(CoreError::Validation(format!(
                        "Checklist update repeats item '{}'",
                        item.id
                    )))
                }
            }
        }

        for (item, checked) in self.items.iter_mut().zip(resolved) {
            item.checked = checked;
        }
        Ok(())
    }

    /// Items grouped by category, categories in order of first appearance.
    pub fn by_category(&self) -> Vec<CategoryGroup> {
        let mut groups: Vec<CategoryGroup> = Vec::new();
        for item in &self.items {
            let index = match groups.iter().position(|g| g.category == item.category) {
                Some(index) => index,
                None => {
                    groups.push(CategoryGroup {
                        category: item.category.clone(),
                        item_ids: Vec::new(),
                        checked: 0,
                        total: 0,
                    });
                    groups.len() - 1
                }
            };
            let group = &mut groups[index];
            group.item_ids.push(item.id.clone());
            group.total += 1;
            if item.checked {
                group.checked += 1;
            }
        }
        groups
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

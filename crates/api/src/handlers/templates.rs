//! Read-only view of the checklist template catalogs.

use axum::extract::{Path, Query};
use axum::Json;
use serde::{Deserialize, Serialize};
use tidyhome_core::checklist::{ChecklistKind, TemplateItem, TEMPLATE_VERSION};
use tidyhome_core::service_type::ServiceType;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    /// `cleaning` (default) or `inspection`.
    #[serde(default)]
    pub kind: ChecklistKind,
}

#[derive(Debug, Serialize)]
pub struct TemplateView {
    pub kind: ChecklistKind,
    pub service_type: ServiceType,
    pub template_version: u32,
    pub items: Vec<&'static TemplateItem>,
}

/// GET /api/v1/checklist-templates/{service_type}?kind=
pub async fn get(
    RequireAuth(_user): RequireAuth,
    Path(service_type): Path<String>,
    Query(query): Query<TemplateQuery>,
) -> AppResult<Json<DataResponse<TemplateView>>> {
    let service_type: ServiceType = service_type.parse()?;
    Ok(Json(DataResponse {
        data: TemplateView {
            kind: query.kind,
            service_type,
            template_version: TEMPLATE_VERSION,
            items: query.kind.template_for(service_type),
        },
    }))
}

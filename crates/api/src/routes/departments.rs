use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use chrono::Utc;
use entity::records::DepartmentRecord;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::require_identity,
    error::{ApiError, ApiResult},
    response::Envelope,
    sync,
    tenant::TenantDoc,
    AppState,
};

#[derive(Deserialize)]
pub(super) struct ListQuery {
    id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreatePayload {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    professional_details: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatePayload {
    department_id: Option<Uuid>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    description: Option<String>,
    professional_details: Option<String>,
    employee_emails: Option<Vec<String>>,
}

/// Membership view: with `?id=` the list narrows to one department, whose
/// nested roster is the authoritative answer to "who works here".
pub(super) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<Vec<DepartmentRecord>>>> {
    let email = require_identity(&headers, &state.identity)?;
    let mut departments = TenantDoc::find(state.db.as_ref(), &email)
        .await?
        .map(|doc| doc.departments)
        .unwrap_or_default();
    if let Some(id) = query.id {
        departments.retain(|d| d.id == id);
    }
    Ok(Json(Envelope::counted(departments.len(), departments)))
}

pub(super) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePayload>,
) -> ApiResult<(StatusCode, Json<Envelope<DepartmentRecord>>)> {
    let email = require_identity(&headers, &state.identity)?;
    let name = match payload.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::validation("Department name required")),
    };

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    let record = DepartmentRecord {
        id: Uuid::new_v4(),
        name,
        kind: payload.kind.unwrap_or_else(|| "General".to_string()),
        description: payload.description.unwrap_or_default(),
        professional_details: payload.professional_details.unwrap_or_default(),
        employees: Vec::new(),
        created_at: Utc::now(),
    };
    doc.departments.push(record.clone());
    doc.persist(state.db.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Department created", record)),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePayload>,
) -> ApiResult<Json<Envelope<DepartmentRecord>>> {
    let email = require_identity(&headers, &state.identity)?;
    let department_id = payload
        .department_id
        .ok_or_else(|| ApiError::validation("Department ID required"))?;
    let name = match payload.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => return Err(ApiError::validation("Department name required")),
    };
    let member_emails = payload
        .employee_emails
        .ok_or_else(|| ApiError::validation("Employee emails required"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    {
        let dept = doc
            .departments
            .iter_mut()
            .find(|d| d.id == department_id)
            .ok_or_else(|| ApiError::not_found("Department not found"))?;
        dept.name = name;
        if let Some(kind) = payload.kind {
            dept.kind = kind;
        }
        if let Some(description) = payload.description {
            dept.description = description;
        }
        if let Some(details) = payload.professional_details {
            dept.professional_details = details;
        }
    }
    sync::set_department_members(
        &mut doc.employees,
        &mut doc.departments,
        department_id,
        &member_emails,
        Utc::now(),
    )?;
    let record = doc
        .departments
        .iter()
        .find(|d| d.id == department_id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("Department not found"))?;
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::with_message("Department updated", record)))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<()>>> {
    let email = require_identity(&headers, &state.identity)?;
    let department_id = query
        .id
        .ok_or_else(|| ApiError::validation("Department ID required"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    sync::remove_department(&mut doc.departments, department_id);
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::message("Department deleted")))
}

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use entity::records::EmployeeRecord;
use serde::Deserialize;

use crate::{
    auth::require_identity,
    error::{ApiError, ApiResult},
    response::Envelope,
    sync::{self, EmployeeInput},
    tenant::TenantDoc,
    AppState,
};

#[derive(Deserialize)]
pub(super) struct EmployeePayload {
    employee: Option<EmployeeInput>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RemoveQuery {
    employee_email: Option<String>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Envelope<Vec<EmployeeRecord>>>> {
    let email = require_identity(&headers, &state.identity)?;
    let employees = TenantDoc::find(state.db.as_ref(), &email)
        .await?
        .map(|doc| doc.employees)
        .unwrap_or_default();
    Ok(Json(Envelope::data(employees)))
}

pub(super) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EmployeePayload>,
) -> ApiResult<Json<Envelope<EmployeeRecord>>> {
    let email = require_identity(&headers, &state.identity)?;
    let input = payload
        .employee
        .ok_or_else(|| ApiError::validation("Employee email and department required"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    let record = sync::add_employee(&mut doc.employees, &mut doc.departments, input, Utc::now())?;
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::with_message(
        "Employee added successfully",
        record,
    )))
}

pub(super) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<EmployeePayload>,
) -> ApiResult<Json<Envelope<EmployeeRecord>>> {
    let email = require_identity(&headers, &state.identity)?;
    let input = payload
        .employee
        .ok_or_else(|| ApiError::validation("Employee email required"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    let record =
        sync::update_employee(&mut doc.employees, &mut doc.departments, input, Utc::now())?;
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::with_message(
        "Employee updated successfully",
        record,
    )))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RemoveQuery>,
) -> ApiResult<Json<Envelope<()>>> {
    let email = require_identity(&headers, &state.identity)?;
    let employee_email = query
        .employee_email
        .ok_or_else(|| ApiError::validation("Employee email required"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    sync::remove_employee(&mut doc.employees, &mut doc.departments, &employee_email);
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::message("Employee deleted successfully")))
}

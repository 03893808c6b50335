use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use entity::records::{AssignedRecord, Priority, TaskRecord};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::require_identity,
    error::{ApiError, ApiResult},
    mail::{MailBody, Outgoing},
    response::Envelope,
    tenant::TenantDoc,
    AppState,
};

#[derive(Deserialize)]
pub(super) struct ListQuery {
    id: Option<Uuid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct AssignedInput {
    name: String,
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreatePayload {
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    due_date: Option<String>,
    assigned: Option<Vec<AssignedInput>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdatePayload {
    task_id: Option<Uuid>,
    title: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    due_date: Option<String>,
    assigned: Option<Vec<AssignedInput>>,
}

#[derive(Deserialize)]
pub(super) struct AssignmentQuery {
    admin: Option<String>,
    task_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub(super) struct CompletionPayload {
    admin: Option<String>,
    task_id: Option<Uuid>,
    completed: Option<bool>,
}

#[derive(Deserialize)]
pub(super) struct NotifyQuery {
    admin: Option<String>,
    email: Option<String>,
    task_id: Option<Uuid>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Response> {
    let email = require_identity(&headers, &state.identity)?;
    let tasks = TenantDoc::find(state.db.as_ref(), &email)
        .await?
        .map(|doc| doc.tasks)
        .unwrap_or_default();
    if let Some(id) = query.id {
        let task = tasks
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        return Ok(Json(Envelope::data(task)).into_response());
    }
    Ok(Json(Envelope::data(tasks)).into_response())
}

pub(super) async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreatePayload>,
) -> ApiResult<(StatusCode, Json<Envelope<TaskRecord>>)> {
    let email = require_identity(&headers, &state.identity)?;
    let title = match payload.title.as_deref().map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => return Err(ApiError::validation("Task title required")),
    };
    let due_date = parse_due_date(payload.due_date.as_deref())?
        .ok_or_else(|| ApiError::validation("Invalid due date"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    let now = Utc::now();
    let record = TaskRecord {
        id: Uuid::new_v4(),
        title,
        description: payload.description.unwrap_or_default(),
        priority: payload.priority.unwrap_or_default(),
        due_date,
        assigned: payload
            .assigned
            .unwrap_or_default()
            .into_iter()
            .map(|a| AssignedRecord {
                name: a.name,
                email: a.email,
                completed: false,
            })
            .collect(),
        created_at: now,
        updated_at: now,
    };
    doc.tasks.push(record.clone());
    doc.persist(state.db.as_ref()).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::with_message("Task created", record)),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdatePayload>,
) -> ApiResult<Json<Envelope<TaskRecord>>> {
    let email = require_identity(&headers, &state.identity)?;
    let task_id = payload
        .task_id
        .ok_or_else(|| ApiError::validation("Task ID required"))?;
    let due_date = parse_due_date(payload.due_date.as_deref())?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    let record = {
        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ApiError::not_found("Task not found"))?;
        if let Some(title) = payload.title.as_deref().map(str::trim) {
            if !title.is_empty() {
                task.title = title.to_string();
            }
        }
        if let Some(description) = payload.description {
            task.description = description;
        }
        if let Some(priority) = payload.priority {
            task.priority = priority;
        }
        if let Some(due) = due_date {
            task.due_date = due;
        }
        if let Some(assigned) = payload.assigned {
            task.assigned = assigned
                .into_iter()
                .map(|a| AssignedRecord {
                    name: a.name,
                    email: a.email,
                    completed: false,
                })
                .collect();
        }
        task.updated_at = Utc::now();
        task.clone()
    };
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::with_message("Task updated", record)))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Envelope<()>>> {
    let email = require_identity(&headers, &state.identity)?;
    let task_id = query
        .id
        .ok_or_else(|| ApiError::validation("Task ID required"))?;

    let mut doc = TenantDoc::load(state.db.as_ref(), &email).await?;
    doc.tasks.retain(|t| t.id != task_id);
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::message("Task deleted")))
}

/// Unauthenticated assignee view: the mailed task link identifies the task
/// by the owning admin's e-mail plus the task id.
pub(super) async fn assignment(
    State(state): State<AppState>,
    Query(query): Query<AssignmentQuery>,
) -> ApiResult<Json<Envelope<TaskRecord>>> {
    let (admin, task_id) = match (query.admin, query.task_id) {
        (Some(admin), Some(task_id)) => (admin, task_id),
        _ => return Err(ApiError::validation("admin and task_id required")),
    };
    let doc = TenantDoc::find(state.db.as_ref(), &admin)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin not found"))?;
    let task = doc
        .tasks
        .into_iter()
        .find(|t| t.id == task_id)
        .ok_or_else(|| ApiError::not_found("Task not found"))?;
    Ok(Json(Envelope::data(task)))
}

/// Flip the completed flag on every assigned entry of the task.
pub(super) async fn set_completion(
    State(state): State<AppState>,
    Json(payload): Json<CompletionPayload>,
) -> ApiResult<Json<Envelope<()>>> {
    let (admin, task_id, completed) = match (payload.admin, payload.task_id, payload.completed) {
        (Some(admin), Some(task_id), Some(completed)) => (admin, task_id, completed),
        _ => {
            return Err(ApiError::validation(
                "admin, task_id, and completed required",
            ))
        }
    };

    let mut doc = TenantDoc::find(state.db.as_ref(), &admin)
        .await?
        .ok_or_else(|| ApiError::not_found("Task or admin not found"))?;
    {
        let task = doc
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ApiError::not_found("Task or admin not found"))?;
        for assigned in task.assigned.iter_mut() {
            assigned.completed = completed;
        }
        task.updated_at = Utc::now();
    }
    doc.persist(state.db.as_ref()).await?;
    Ok(Json(Envelope::message("Task updated successfully")))
}

pub(super) async fn notify(
    State(state): State<AppState>,
    Query(query): Query<NotifyQuery>,
) -> ApiResult<Json<Envelope<()>>> {
    let (admin, email, task_id) = match (query.admin, query.email, query.task_id) {
        (Some(admin), Some(email), Some(task_id)) => (admin, email, task_id),
        _ => {
            return Err(ApiError::validation(
                "admin, email, and task_id are required",
            ))
        }
    };

    let task_url = format!(
        "{}/tasks/yourtask?id={}&admin={}",
        state.settings.public_base_url, task_id, admin
    );
    let html = format!(
        "<p>Hello,</p>\
         <p>Your task from <strong>{admin}</strong> is assigned. Please complete it.</p>\
         <p><a href=\"{task_url}\">Click here to view your task</a></p>\
         <p>Provider oneManage</p>"
    );
    state
        .mailer
        .send(Outgoing {
            to: email,
            subject: format!("Task Notification from {}", admin),
            body: MailBody::Html(html),
        })
        .await?;
    Ok(Json(Envelope::message("Email sent successfully")))
}

fn parse_due_date(raw: Option<&str>) -> ApiResult<Option<DateTime<Utc>>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| ApiError::validation("Invalid due date"))
}

//! Load/persist of the per-tenant document.
//!
//! Every mutating route follows the same cycle: load the owning row by the
//! caller's e-mail, deserialize the embedded arrays, mutate them in memory,
//! write the arrays back. There is no locking around the cycle; concurrent
//! writers race at whole-array granularity.

use anyhow::anyhow;
use chrono::Utc;
use entity::{
    records::{DepartmentRecord, EmployeeRecord, TaskRecord},
    tenant,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

pub struct TenantDoc {
    pub model: tenant::Model,
    pub departments: Vec<DepartmentRecord>,
    pub employees: Vec<EmployeeRecord>,
    pub tasks: Vec<TaskRecord>,
}

impl TenantDoc {
    /// Fetch the tenant owned by `email`, if any.
    pub async fn find(db: &DatabaseConnection, email: &str) -> ApiResult<Option<Self>> {
        let Some(model) = tenant::Entity::find()
            .filter(tenant::Column::Email.eq(email))
            .one(db)
            .await?
        else {
            return Ok(None);
        };
        Self::from_model(model).map(Some)
    }

    /// Fetch the tenant owned by `email`, or fail with NotFound.
    pub async fn load(db: &DatabaseConnection, email: &str) -> ApiResult<Self> {
        Self::find(db, email)
            .await?
            .ok_or_else(|| ApiError::not_found("User not found"))
    }

    pub fn from_model(model: tenant::Model) -> ApiResult<Self> {
        let departments = decode_array(&model.departments, "departments")?;
        let employees = decode_array(&model.employees, "employees")?;
        let tasks = decode_array(&model.tasks, "tasks")?;
        Ok(Self {
            model,
            departments,
            employees,
            tasks,
        })
    }

    /// Write the arrays back to the owning row and refresh its timestamp.
    pub async fn persist(self, db: &DatabaseConnection) -> ApiResult<()> {
        let departments = serde_json::to_value(&self.departments).map_err(ApiError::internal)?;
        let employees = serde_json::to_value(&self.employees).map_err(ApiError::internal)?;
        let tasks = serde_json::to_value(&self.tasks).map_err(ApiError::internal)?;
        let mut active: tenant::ActiveModel = self.model.into();
        active.departments = Set(departments);
        active.employees = Set(employees);
        active.tasks = Set(tasks);
        active.updated_at = Set(Utc::now().into());
        active.update(db).await?;
        Ok(())
    }
}

/// Idempotent account bootstrap: returns the existing row, or inserts a
/// fresh one. The bool reports whether a row was created.
pub async fn ensure_account(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    avatar: Option<String>,
) -> ApiResult<(tenant::Model, bool)> {
    if let Some(existing) = tenant::Entity::find()
        .filter(tenant::Column::Email.eq(email))
        .one(db)
        .await?
    {
        return Ok((existing, false));
    }
    let now = Utc::now();
    let empty = serde_json::Value::Array(Vec::new());
    let model = tenant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        avatar: Set(avatar),
        role: Set("admin".to_string()),
        departments: Set(empty.clone()),
        employees: Set(empty.clone()),
        tasks: Set(empty),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok((model, true))
}

fn decode_array<T: DeserializeOwned>(value: &serde_json::Value, field: &str) -> ApiResult<Vec<T>> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value.clone())
        .map_err(|err| ApiError::internal(anyhow!("corrupt {} array: {}", field, err)))
}

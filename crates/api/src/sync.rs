//! Keeps the two representations of an employee in step.
//!
//! An employee lives once in the tenant's flat `employees` array and once,
//! as a snapshot, inside the `employees` array of the department it belongs
//! to. Nothing enforces that structurally; every mutation here writes both
//! sides. The store offers no cross-array transaction, so a flat write that
//! succeeds stands even when no nested write applies (an employee may
//! reference a department that no longer exists — that state is accepted,
//! not rolled back).
//!
//! All functions are pure over the deserialized arrays; callers persist the
//! document afterwards. Both passes walk the full arrays, which is fine at
//! the tens-of-employees scale a single admin manages.

use chrono::{DateTime, Utc};
use entity::records::{DepartmentRecord, EmployeeRecord};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Employee fields as submitted by the dashboard. Absent fields are left
/// untouched on update.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<Uuid>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub salary: Option<i64>,
}

/// Append a new employee to the flat list and, when the referenced
/// department exists, a snapshot to its nested list.
pub fn add_employee(
    employees: &mut Vec<EmployeeRecord>,
    departments: &mut [DepartmentRecord],
    input: EmployeeInput,
    now: DateTime<Utc>,
) -> ApiResult<EmployeeRecord> {
    let email = input
        .email
        .as_deref()
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    let Some(department) = input.department else {
        return Err(ApiError::validation("Employee email and department required"));
    };
    if email.is_empty() {
        return Err(ApiError::validation("Employee email and department required"));
    }
    if employees.iter().any(|e| e.email == email) {
        return Err(ApiError::conflict("Employee email already exists"));
    }

    let record = EmployeeRecord {
        name: input.name.unwrap_or_default(),
        email,
        department: Some(department),
        position: input.position,
        phone: input.phone,
        salary: input.salary,
        added_at: now,
        updated_at: now,
    };
    employees.push(record.clone());
    // Unknown department: the flat write stands on its own.
    if let Some(dept) = departments.iter_mut().find(|d| d.id == department) {
        dept.employees.push(record.clone());
    }
    Ok(record)
}

/// Merge `input` into every record matching its e-mail, in both
/// representations. When the merge changes the department reference the
/// nested snapshot moves with it: it is dropped from the old department and
/// appended to the new one (when that department exists).
pub fn update_employee(
    employees: &mut [EmployeeRecord],
    departments: &mut [DepartmentRecord],
    input: EmployeeInput,
    now: DateTime<Utc>,
) -> ApiResult<EmployeeRecord> {
    let email = match input.email.as_deref().map(str::trim) {
        Some(email) if !email.is_empty() => email.to_string(),
        _ => return Err(ApiError::validation("Employee email required")),
    };

    let previous_department = employees
        .iter()
        .find(|e| e.email == email)
        .map(|e| e.department);
    let Some(previous_department) = previous_department else {
        return Err(ApiError::not_found("Employee not found"));
    };

    let mut updated = None;
    for record in employees.iter_mut().filter(|e| e.email == email) {
        merge(record, &input, now);
        updated = Some(record.clone());
    }
    // The find above guarantees at least one match.
    let updated = updated.ok_or_else(|| ApiError::not_found("Employee not found"))?;

    if updated.department != previous_department {
        for dept in departments.iter_mut() {
            dept.employees.retain(|e| e.email != email);
        }
        if let Some(target) = updated
            .department
            .and_then(|id| departments.iter_mut().find(|d| d.id == id))
        {
            let mut snapshot = updated.clone();
            snapshot.added_at = now;
            target.employees.push(snapshot);
        }
    } else {
        for dept in departments.iter_mut() {
            for nested in dept.employees.iter_mut().filter(|e| e.email == email) {
                merge(nested, &input, now);
            }
        }
    }

    Ok(updated)
}

/// Drop the employee from the flat list and from every nested list. No-op
/// when the e-mail is unknown.
pub fn remove_employee(
    employees: &mut Vec<EmployeeRecord>,
    departments: &mut [DepartmentRecord],
    email: &str,
) {
    employees.retain(|e| e.email != email);
    for dept in departments.iter_mut() {
        dept.employees.retain(|e| e.email != email);
    }
}

/// Replace a department's roster with snapshots of the selected employees.
/// Flat records are stamped in the same pass: selected employees point at
/// this department, previously assigned but unselected ones are detached,
/// and snapshots of the selected employees disappear from other departments.
pub fn set_department_members(
    employees: &mut [EmployeeRecord],
    departments: &mut [DepartmentRecord],
    department_id: Uuid,
    member_emails: &[String],
    now: DateTime<Utc>,
) -> ApiResult<()> {
    if !departments.iter().any(|d| d.id == department_id) {
        return Err(ApiError::not_found("Department not found"));
    }

    let mut snapshots = Vec::new();
    for record in employees.iter_mut() {
        if member_emails.iter().any(|m| m == &record.email) {
            record.department = Some(department_id);
            record.updated_at = now;
            let mut snapshot = record.clone();
            snapshot.added_at = now;
            snapshots.push(snapshot);
        } else if record.department == Some(department_id) {
            record.department = None;
            record.updated_at = now;
        }
    }

    for dept in departments.iter_mut() {
        if dept.id == department_id {
            dept.employees = std::mem::take(&mut snapshots);
        } else {
            dept.employees
                .retain(|e| !member_emails.iter().any(|m| m == &e.email));
        }
    }
    Ok(())
}

/// Remove the department record wholesale; its nested snapshots vanish with
/// it. Flat records keep their department reference, the same dangling state
/// an add against an unknown department produces.
pub fn remove_department(departments: &mut Vec<DepartmentRecord>, department_id: Uuid) -> bool {
    let before = departments.len();
    departments.retain(|d| d.id != department_id);
    departments.len() != before
}

fn merge(record: &mut EmployeeRecord, input: &EmployeeInput, now: DateTime<Utc>) {
    if let Some(name) = &input.name {
        record.name = name.clone();
    }
    if let Some(department) = input.department {
        record.department = Some(department);
    }
    if let Some(position) = &input.position {
        record.position = Some(position.clone());
    }
    if let Some(phone) = &input.phone {
        record.phone = Some(phone.clone());
    }
    if let Some(salary) = input.salary {
        record.salary = Some(salary);
    }
    record.updated_at = now;
}

mod common;

use axum::http::StatusCode;
use common::{send, TestCtx};
use serde_json::{json, Value};

async fn add_employee(ctx: &TestCtx, token: &str, name: &str, email: &str, dept: &str) {
    let (status, _) = send(
        &ctx.router,
        "POST",
        "/api/v1/employees",
        Some(token),
        Some(json!({
            "employee": { "name": name, "email": email, "department": dept }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn flat_employees(ctx: &TestCtx, token: &str) -> Vec<Value> {
    let (_, body) = send(&ctx.router, "GET", "/api/v1/employees", Some(token), None).await;
    body["data"].as_array().cloned().unwrap()
}

#[tokio::test]
async fn create_returns_record_with_defaults() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (status, body) = send(
        &ctx.router,
        "POST",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "name": "  Engineering  ", "description": "Builds the product" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Department created"));
    assert_eq!(body["data"]["name"], json!("Engineering"));
    assert_eq!(body["data"]["type"], json!("General"));
    assert!(body["data"]["employees"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_requires_name() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (status, body) = send(
        &ctx.router,
        "POST",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Department name required"));
}

#[tokio::test]
async fn list_narrows_to_one_with_id() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let mut ids = Vec::new();
    for name in ["Engineering", "Sales"] {
        let (_, body) = send(
            &ctx.router,
            "POST",
            "/api/v1/departments",
            Some(&token),
            Some(json!({ "name": name })),
        )
        .await;
        ids.push(body["data"]["_id"].as_str().unwrap().to_string());
    }

    let (status, body) = send(&ctx.router, "GET", "/api/v1/departments", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(2));

    let (status, body) = send(
        &ctx.router,
        "GET",
        &format!("/api/v1/departments?id={}", ids[1]),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["data"][0]["name"], json!("Sales"));
}

#[tokio::test]
async fn update_rewrites_membership_on_both_sides() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (_, body) = send(
        &ctx.router,
        "POST",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "name": "Engineering" })),
    )
    .await;
    let d1 = body["data"]["_id"].as_str().unwrap().to_string();
    let (_, body) = send(
        &ctx.router,
        "POST",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "name": "Sales" })),
    )
    .await;
    let d2 = body["data"]["_id"].as_str().unwrap().to_string();

    add_employee(&ctx, &token, "Ada", "ada@x.com", &d1).await;
    add_employee(&ctx, &token, "Grace", "grace@x.com", &d2).await;

    // Sales takes over Ada and drops Grace.
    let (status, body) = send(
        &ctx.router,
        "PUT",
        "/api/v1/departments",
        Some(&token),
        Some(json!({
            "departmentId": d2,
            "name": "Sales & Marketing",
            "employeeEmails": ["ada@x.com"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Department updated"));
    assert_eq!(body["data"]["name"], json!("Sales & Marketing"));
    let roster = body["data"]["employees"].as_array().unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0]["email"], json!("ada@x.com"));

    let flat = flat_employees(&ctx, &token).await;
    let ada = flat.iter().find(|e| e["email"] == json!("ada@x.com")).unwrap();
    let grace = flat.iter().find(|e| e["email"] == json!("grace@x.com")).unwrap();
    assert_eq!(ada["department"], json!(d2));
    assert_eq!(grace["department"], Value::Null);
}

#[tokio::test]
async fn update_validates_required_fields() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (status, body) = send(
        &ctx.router,
        "PUT",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "name": "Engineering", "employeeEmails": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Department ID required"));

    let (status, body) = send(
        &ctx.router,
        "PUT",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "departmentId": uuid::Uuid::new_v4(), "employeeEmails": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Department name required"));

    let (status, body) = send(
        &ctx.router,
        "PUT",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "departmentId": uuid::Uuid::new_v4(), "name": "Engineering" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Employee emails required"));
}

#[tokio::test]
async fn update_unknown_department_is_not_found() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (status, body) = send(
        &ctx.router,
        "PUT",
        "/api/v1/departments",
        Some(&token),
        Some(json!({
            "departmentId": uuid::Uuid::new_v4(),
            "name": "Ghost",
            "employeeEmails": []
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], json!("Department not found"));
}

#[tokio::test]
async fn delete_keeps_flat_references() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (_, body) = send(
        &ctx.router,
        "POST",
        "/api/v1/departments",
        Some(&token),
        Some(json!({ "name": "Engineering" })),
    )
    .await;
    let dept = body["data"]["_id"].as_str().unwrap().to_string();
    add_employee(&ctx, &token, "Ada", "ada@x.com", &dept).await;

    let (status, body) = send(
        &ctx.router,
        "DELETE",
        &format!("/api/v1/departments?id={}", dept),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Department deleted"));

    let (_, body) = send(&ctx.router, "GET", "/api/v1/departments", Some(&token), None).await;
    assert_eq!(body["count"], json!(0));

    // The flat record still points at the deleted department.
    let flat = flat_employees(&ctx, &token).await;
    assert_eq!(flat[0]["department"], json!(dept));
}

#[tokio::test]
async fn delete_requires_id() {
    let ctx = TestCtx::new_seeded().await;
    let token = ctx.token();

    let (status, body) = send(&ctx.router, "DELETE", "/api/v1/departments", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Department ID required"));
}

mod admin;
mod departments;
mod employees;
mod outbox;
mod tasks;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/api/v1/init-user", post(admin::init_user))
        .route(
            "/api/v1/employees",
            get(employees::list)
                .post(employees::create)
                .put(employees::update)
                .delete(employees::remove),
        )
        .route(
            "/api/v1/departments",
            get(departments::list)
                .post(departments::create)
                .put(departments::update)
                .delete(departments::remove),
        )
        .route(
            "/api/v1/tasks",
            get(tasks::list)
                .post(tasks::create)
                .put(tasks::update)
                .delete(tasks::remove),
        )
        .route(
            "/api/v1/tasks/update",
            get(tasks::assignment).put(tasks::set_completion),
        )
        .route("/api/v1/tasks/notify", get(tasks::notify))
        .route("/api/v1/send-mail", post(outbox::send_mail))
        .route("/api/v1/feedback", post(outbox::feedback))
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.db.get_database_backend();
    let db_ok = state
        .db
        .execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
        .is_ok();
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

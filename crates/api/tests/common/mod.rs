#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use api::{
    auth::{issue_token, IdentityConfig},
    mail::{MailError, Mailer, Outgoing},
    routes::build_router,
    AppSettings, AppState,
};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use sea_orm::{
    ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement, Value as DbValue,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@onemanage.test";
pub const BUSINESS_EMAIL: &str = "feedback@onemanage.test";
pub const BASE_URL: &str = "http://app.onemanage.test";

/// Captures outgoing mail instead of talking to an SMTP relay.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Outgoing>>,
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: Outgoing) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

pub struct TestCtx {
    pub db: Arc<DatabaseConnection>,
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
    identity: IdentityConfig,
}

impl TestCtx {
    pub async fn new() -> Self {
        let conn = Database::connect("sqlite::memory:").await.unwrap();
        let db = Arc::new(conn);
        bootstrap_sqlite(db.as_ref()).await;

        let identity = IdentityConfig {
            secret: "test-secret".into(),
            session_ttl_minutes: 60,
        };
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState {
            db: db.clone(),
            identity: Arc::new(identity.clone()),
            mailer: mailer.clone(),
            settings: Arc::new(AppSettings {
                public_base_url: BASE_URL.into(),
                business_email: Some(BUSINESS_EMAIL.into()),
            }),
        };
        let router = build_router(state);
        Self {
            db,
            router,
            mailer,
            identity,
        }
    }

    pub async fn new_seeded() -> Self {
        let ctx = Self::new().await;
        ctx.seed_tenant(ADMIN_EMAIL).await;
        ctx
    }

    pub fn token(&self) -> String {
        self.token_for(ADMIN_EMAIL)
    }

    pub fn token_for(&self, email: &str) -> String {
        issue_token("user_test", email, &self.identity).unwrap()
    }

    pub async fn seed_tenant(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now().to_rfc3339();
        self.db
            .execute(Statement::from_sql_and_values(
                DatabaseBackend::Sqlite,
                "INSERT INTO tenant (id, email, name, avatar, role, departments, employees, tasks, created_at, updated_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                vec![
                    id.into(),
                    email.into(),
                    "Admin".into(),
                    DbValue::from(None::<String>),
                    "admin".into(),
                    "[]".into(),
                    "[]".into(),
                    "[]".into(),
                    now.clone().into(),
                    now.into(),
                ],
            ))
            .await
            .unwrap();
        id
    }
}

async fn bootstrap_sqlite(db: &DatabaseConnection) {
    db.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        r#"
        CREATE TABLE tenant (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            avatar TEXT,
            role TEXT NOT NULL DEFAULT 'admin',
            departments TEXT NOT NULL DEFAULT '[]',
            employees TEXT NOT NULL DEFAULT '[]',
            tasks TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ))
    .await
    .unwrap();
}

pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

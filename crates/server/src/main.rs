mod config;

use std::{net::SocketAddr, sync::Arc};

use api::{
    mail::SmtpMailer,
    routes::build_router,
    sync::{self, EmployeeInput},
    tenant::{ensure_account, TenantDoc},
    AppState,
};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use entity::records::{AssignedRecord, DepartmentRecord, Priority, TaskRecord};
use migration::{Migrator, MigratorTrait};
use sea_orm::{Database, DatabaseConnection};
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, Level};
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "onemanage", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Run HTTP server
    Serve {
        #[arg(long, env = "BIND", default_value = "127.0.0.1:8080")]
        bind: String,
    },
    /// Run migrations (up|down|reset)
    Migrate {
        #[arg(long, default_value = "up")]
        action: String,
    },
    /// Seed sample data
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load();
    let db = Arc::new(Database::connect(&config.database_url).await?);

    match cli.cmd {
        Cmd::Migrate { action } => {
            match action.as_str() {
                "up" => Migrator::up(db.as_ref(), None).await?,
                "down" => Migrator::down(db.as_ref(), None).await?,
                "reset" => Migrator::reset(db.as_ref()).await?,
                _ => eprintln!("Unknown action: {} (use up|down|reset)", action),
            }
            Ok(())
        }
        Cmd::Seed => {
            Migrator::up(db.as_ref(), None).await?;
            seed(db.as_ref()).await?;
            Ok(())
        }
        Cmd::Serve { bind } => {
            Migrator::up(db.as_ref(), None).await?;
            let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
            let state = AppState {
                db: db.clone(),
                identity: Arc::new(config.identity),
                mailer,
                settings: Arc::new(config.settings),
            };
            let app = build_router(state)
                .layer(CompressionLayer::new())
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                );

            let addr: SocketAddr = bind.parse()?;
            let listener = TcpListener::bind(addr).await?;
            info!("listening on http://{}", addr);
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(shutdown_signal())
            .await?;
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    use tokio::signal;
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler")
    };
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = terminate => {}, }
}

async fn seed(db: &DatabaseConnection) -> anyhow::Result<()> {
    let (account, created) =
        ensure_account(db, "Demo Admin", "admin@onemanage.test", None).await?;
    if !created {
        info!("seed account already present, skipping");
        return Ok(());
    }

    let mut doc = TenantDoc::load(db, &account.email).await?;
    let now = Utc::now();

    let engineering = DepartmentRecord {
        id: Uuid::new_v4(),
        name: "Engineering".into(),
        kind: "Technical".into(),
        description: "Product development".into(),
        professional_details: String::new(),
        employees: Vec::new(),
        created_at: now,
    };
    let engineering_id = engineering.id;
    doc.departments.push(engineering);

    for (name, email, salary) in [
        ("Ada Lovelace", "ada@onemanage.test", 96_000),
        ("Grace Hopper", "grace@onemanage.test", 102_000),
    ] {
        sync::add_employee(
            &mut doc.employees,
            &mut doc.departments,
            EmployeeInput {
                name: Some(name.into()),
                email: Some(email.into()),
                department: Some(engineering_id),
                position: Some("Engineer".into()),
                phone: None,
                salary: Some(salary),
            },
            now,
        )?;
    }

    doc.tasks.push(TaskRecord {
        id: Uuid::new_v4(),
        title: "Prepare quarterly report".into(),
        description: "Draft the numbers for the board meeting.".into(),
        priority: Priority::High,
        due_date: now + Duration::days(7),
        assigned: vec![AssignedRecord {
            name: "Ada Lovelace".into(),
            email: "ada@onemanage.test".into(),
            completed: false,
        }],
        created_at: now,
        updated_at: now,
    });

    doc.persist(db).await?;
    info!("seed data written");
    Ok(())
}

pub mod auth;
pub mod error;
pub mod mail;
pub mod response;
pub mod routes;
pub mod sync;
pub mod tenant;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{auth::IdentityConfig, mail::Mailer};

/// Shared state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub identity: Arc<IdentityConfig>,
    pub mailer: Arc<dyn Mailer>,
    pub settings: Arc<AppSettings>,
}

#[derive(Clone, Debug)]
pub struct AppSettings {
    /// Base URL of the dashboard, used to build task links in notification
    /// mails.
    pub public_base_url: String,
    /// Recipient for the feedback form.
    pub business_email: Option<String>,
}

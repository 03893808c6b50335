//! Outbound mail collaborator.
//!
//! Dispatch is fire-and-forget: a transport failure surfaces to the caller
//! as an internal error and is never retried or queued.

use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    message::Mailbox,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("failed to send mail: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        ApiError::internal(err)
    }
}

#[derive(Clone, Debug)]
pub enum MailBody {
    Text(String),
    Html(String),
}

impl MailBody {
    pub fn contents(&self) -> &str {
        match self {
            MailBody::Text(text) => text,
            MailBody::Html(html) => html,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Outgoing {
    pub to: String,
    pub subject: String,
    pub body: MailBody,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: Outgoing) -> Result<(), MailError>;
}

#[derive(Clone, Debug)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// STARTTLS on the submission port, matching the provider setup the
    /// dashboard was built against.
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();
        let from = settings.from.parse()?;
        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: Outgoing) -> Result<(), MailError> {
        let builder = Message::builder()
            .from(self.from.clone())
            .to(mail.to.parse()?)
            .subject(mail.subject);
        let message = match mail.body {
            MailBody::Text(text) => builder.header(ContentType::TEXT_PLAIN).body(text)?,
            MailBody::Html(html) => builder.header(ContentType::TEXT_HTML).body(html)?,
        };
        self.transport.send(message).await?;
        Ok(())
    }
}

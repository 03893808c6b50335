use anyhow::anyhow;
use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    mail::{MailBody, Outgoing},
    response::Envelope,
    AppState,
};

#[derive(Deserialize)]
pub(super) struct SendMailPayload {
    email: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct FeedbackPayload {
    message: Option<String>,
}

/// Ad hoc admin-to-employee message.
pub(super) async fn send_mail(
    State(state): State<AppState>,
    Json(payload): Json<SendMailPayload>,
) -> ApiResult<Json<Envelope<()>>> {
    let (email, message) = match (payload.email, payload.message) {
        (Some(email), Some(message)) if !email.is_empty() && !message.is_empty() => {
            (email, message)
        }
        _ => return Err(ApiError::validation("Email and message are required")),
    };
    state
        .mailer
        .send(Outgoing {
            to: email,
            subject: "Message from Admin oneManage".to_string(),
            body: MailBody::Text(message),
        })
        .await?;
    Ok(Json(Envelope::message("Mail sent successfully")))
}

/// Forward dashboard feedback to the configured business mailbox.
pub(super) async fn feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackPayload>,
) -> ApiResult<Json<Envelope<()>>> {
    let message = match payload.message.as_deref().map(str::trim) {
        Some(message) if !message.is_empty() => message.to_string(),
        _ => return Err(ApiError::validation("Message is required")),
    };
    let recipient = state
        .settings
        .business_email
        .clone()
        .ok_or_else(|| ApiError::internal(anyhow!("business mailbox not configured")))?;
    state
        .mailer
        .send(Outgoing {
            to: recipient,
            subject: "Message from Feedback oneManage".to_string(),
            body: MailBody::Text(message),
        })
        .await?;
    Ok(Json(Envelope::message("Feedback sent successfully")))
}

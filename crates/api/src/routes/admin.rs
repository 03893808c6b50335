use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use entity::tenant;
use serde::Deserialize;

use crate::{
    error::{ApiError, ApiResult},
    response::Envelope,
    tenant::ensure_account,
    AppState,
};

#[derive(Deserialize)]
pub(super) struct InitUserPayload {
    name: Option<String>,
    email: Option<String>,
    avatar: Option<String>,
}

/// Post-signup bootstrap: the identity provider has just authenticated the
/// admin for the first time and the dashboard registers the account here.
pub(super) async fn init_user(
    State(state): State<AppState>,
    Json(payload): Json<InitUserPayload>,
) -> ApiResult<(StatusCode, Json<Envelope<tenant::Model>>)> {
    let (name, email) = match (payload.name, payload.email) {
        (Some(name), Some(email)) if !name.is_empty() && !email.is_empty() => (name, email),
        _ => return Err(ApiError::validation("Name and Email are required.")),
    };
    if !valid_email(&email) {
        return Err(ApiError::validation("Invalid email format."));
    }

    let (model, created) = ensure_account(state.db.as_ref(), &name, &email, payload.avatar).await?;
    if created {
        Ok((
            StatusCode::CREATED,
            Json(Envelope::with_message("User added successfully.", model)),
        ))
    } else {
        Ok((
            StatusCode::OK,
            Json(Envelope::with_message("User already exists.", model)),
        ))
    }
}

fn valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && !local.contains(char::is_whitespace)
                && domain.split('.').count() >= 2
                && domain
                    .split('.')
                    .all(|p| !p.is_empty() && !p.contains(char::is_whitespace))
        }
        _ => false,
    }
}

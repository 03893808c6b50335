//! Identity-provider session tokens.
//!
//! The provider authenticates the admin out of process and hands the browser
//! a signed token carrying the verified e-mail address. The API never sees
//! credentials; it only checks the signature and reads the claim.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};

pub const SESSION_COOKIE: &str = "om_session";

#[derive(Clone, Debug)]
pub struct IdentityConfig {
    pub secret: String,
    pub session_ttl_minutes: i64,
}

impl IdentityConfig {
    pub fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.as_bytes())
    }

    pub fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.as_bytes())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Provider-assigned subject, opaque to us.
    pub sub: String,
    /// Verified e-mail address of the principal.
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn issue_token(
    subject: &str,
    email: &str,
    config: &IdentityConfig,
) -> jsonwebtoken::errors::Result<String> {
    let now = Utc::now();
    let exp = now
        .checked_add_signed(Duration::minutes(config.session_ttl_minutes))
        .unwrap_or(now)
        .timestamp() as usize;
    let claims = IdentityClaims {
        sub: subject.to_string(),
        email: email.to_string(),
        exp,
        iat: now.timestamp() as usize,
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
}

pub fn decode_token(
    token: &str,
    config: &IdentityConfig,
) -> jsonwebtoken::errors::Result<IdentityClaims> {
    jsonwebtoken::decode::<IdentityClaims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
}

/// Resolve the caller's verified e-mail, or nothing when the request carries
/// no usable token.
pub fn verified_email(headers: &HeaderMap, config: &IdentityConfig) -> Option<String> {
    let token = extract_token(headers)?;
    decode_token(&token, config).ok().map(|claims| claims.email)
}

pub fn require_identity(headers: &HeaderMap, config: &IdentityConfig) -> ApiResult<String> {
    verified_email(headers, config).ok_or(ApiError::Unauthorized)
}

fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        if let Ok(text) = value.to_str() {
            if let Some(rest) = text.strip_prefix("Bearer ") {
                return Some(rest.trim().to_string());
            }
        }
    }
    if let Some(cookie) = headers.get(header::COOKIE) {
        if let Ok(text) = cookie.to_str() {
            for part in text.split(';') {
                let trimmed = part.trim();
                if let Some(rest) = trimmed.strip_prefix(SESSION_COOKIE) {
                    if let Some(value) = rest.strip_prefix('=') {
                        return Some(value.trim().to_string());
                    }
                }
            }
        }
    }
    None
}

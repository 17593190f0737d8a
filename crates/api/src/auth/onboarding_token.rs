//! Onboarding tokens.
//!
//! An onboarding token is an HS256 JWT handed to an employee (or to the
//! recipient of a single-step invite). The token alone is never enough: its
//! SHA-256 hash must match a persisted `onboarding_sessions` row, and that
//! row decides whether the token still authorizes anything.
//!
//! Validation order is signature, expiry, token type, then claim shape.

use chrono::Utc;
use innkeep_core::error::CoreError;
use innkeep_core::onboarding::TokenType;
use innkeep_core::types::{DbId, Timestamp};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::hash_token;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingClaims {
    /// `employee_{id}` or `temp_{uuid}` for invites without an employee row.
    pub sub: String,
    pub employee_id: Option<DbId>,
    pub property_id: DbId,
    pub email: String,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingTokenError {
    #[error("Onboarding link has expired")]
    Expired,
    #[error("Invalid onboarding token")]
    Invalid,
    #[error("Token is not an onboarding token")]
    WrongType,
}

impl From<OnboardingTokenError> for CoreError {
    fn from(err: OnboardingTokenError) -> Self {
        match err {
            OnboardingTokenError::Expired | OnboardingTokenError::Invalid => {
                CoreError::Unauthorized(err.to_string())
            }
            OnboardingTokenError::WrongType => CoreError::Forbidden(err.to_string()),
        }
    }
}

/// A freshly signed token with its persisted fingerprint.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub token_hash: String,
    pub claims: OnboardingClaims,
}

/// Parameters for [`issue_token`].
#[derive(Debug, Clone)]
pub struct TokenRequest<'a> {
    pub employee_id: Option<DbId>,
    pub property_id: DbId,
    pub email: &'a str,
    pub token_type: TokenType,
    pub expires_at: Timestamp,
}

/// Token subject for an employee, or a temporary one for anonymous invites.
pub fn subject_for(employee_id: Option<DbId>) -> String {
    match employee_id {
        Some(id) => format!("employee_{id}"),
        None => format!("temp_{}", Uuid::new_v4()),
    }
}

pub fn issue_token(
    request: &TokenRequest<'_>,
    secret: &str,
) -> Result<IssuedToken, jsonwebtoken::errors::Error> {
    let claims = OnboardingClaims {
        sub: subject_for(request.employee_id),
        employee_id: request.employee_id,
        property_id: request.property_id,
        email: request.email.to_string(),
        token_type: request.token_type,
        iat: Utc::now().timestamp(),
        exp: request.expires_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(IssuedToken {
        token_hash: hash_token(&token),
        token,
        claims,
    })
}

/// Check signature, expiry and token type, then decode the claims.
///
/// Staff access tokens share the signing secret; they pass the signature
/// check and are rejected as [`OnboardingTokenError::WrongType`].
pub fn validate_onboarding_token(
    token: &str,
    secret: &str,
) -> Result<OnboardingClaims, OnboardingTokenError> {
    let mut validation = Validation::default();
    validation.leeway = 0;

    let raw = decode::<serde_json::Value>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => OnboardingTokenError::Expired,
        _ => OnboardingTokenError::Invalid,
    })?
    .claims;

    let token_type = raw.get("token_type").and_then(|v| v.as_str());
    if !matches!(
        token_type,
        Some(t) if t == TokenType::Onboarding.as_str() || t == TokenType::SingleStep.as_str()
    ) {
        return Err(OnboardingTokenError::WrongType);
    }

    serde_json::from_value(raw).map_err(|_| OnboardingTokenError::Invalid)
}

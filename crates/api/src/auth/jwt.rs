//! Staff access tokens and refresh-token helpers.
//!
//! Access tokens are HS256 JWTs carrying [`Claims`]. Refresh tokens are
//! opaque strings rotated on every use; the database holds only their
//! SHA-256 hash.

use chrono::{Duration, Utc};
use innkeep_core::hashing::sha256_hex;
use innkeep_core::types::DbId;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every staff access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the staff user's database id.
    pub sub: DbId,
    /// `hr` or `manager`.
    pub role: String,
    /// Property a manager is assigned to. Snapshotted at login.
    pub property_id: Option<DbId>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4).
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify staff and onboarding tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
    /// Refresh token lifetime in days (default: 7).
    pub refresh_token_expiry_days: i64,
}

/// Default access token expiry in minutes.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;
/// Default refresh token expiry in days.
const DEFAULT_REFRESH_EXPIRY_DAYS: i64 = 7;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS`   | no       | `15`    |
    /// | `JWT_REFRESH_EXPIRY_DAYS`  | no       | `7`     |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_ACCESS_EXPIRY_MINS.to_string())
            .parse()
            .expect("JWT_ACCESS_EXPIRY_MINS must be a valid i64");

        let refresh_token_expiry_days: i64 = std::env::var("JWT_REFRESH_EXPIRY_DAYS")
            .unwrap_or_else(|_| DEFAULT_REFRESH_EXPIRY_DAYS.to_string())
            .parse()
            .expect("JWT_REFRESH_EXPIRY_DAYS must be a valid i64");

        Self {
            secret,
            access_token_expiry_mins,
            refresh_token_expiry_days,
        }
    }
}

/// Sign an access token for a staff user.
///
/// The property assignment is copied into the claims, so a manager who is
/// reassigned keeps the old scope until the token expires.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    property_id: Option<DbId>,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = Utc::now();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        property_id,
        exp: (issued_at + Duration::minutes(config.access_token_expiry_mins)).timestamp(),
        iat: issued_at.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Decode a staff access token. Expiry is checked without leeway.
///
/// Onboarding tokens share the secret but carry a string subject, so they
/// fail to decode here.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    decode::<Claims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &validation)
        .map(|data| data.claims)
}

/// Mint an opaque refresh token as `(plaintext, hash)`. Only the hash is
/// stored in `user_sessions`.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    let hash = hash_token(&plaintext);
    (plaintext, hash)
}

/// Lookup key for a bearer token at rest.
pub fn hash_token(token: &str) -> String {
    sha256_hex(token.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    #[test]
    fn manager_token_carries_property() {
        let config = config("front-office-secret");
        let token = generate_access_token(42, "manager", Some(3), &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "manager");
        assert_eq!(claims.property_id, Some(3));
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn hr_token_has_no_property() {
        let config = config("front-office-secret");
        let token = generate_access_token(7, "hr", None, &config).unwrap();
        assert_eq!(validate_token(&token, &config).unwrap().property_id, None);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = JwtConfig {
            access_token_expiry_mins: -1,
            ..config("front-office-secret")
        };
        let token = generate_access_token(1, "hr", None, &config).unwrap();
        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let token = generate_access_token(1, "hr", None, &config("property-a")).unwrap();
        assert!(validate_token(&token, &config("property-b")).is_err());
    }

    #[test]
    fn refresh_tokens_are_unique_and_hashed() {
        let (first, first_hash) = generate_refresh_token();
        let (second, _) = generate_refresh_token();
        assert_ne!(first, second);
        assert_eq!(first.len(), 64);
        assert_eq!(first_hash, hash_token(&first));
        assert_ne!(first_hash, first);
    }
}

//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification for staff.
//! - [`jwt`] -- staff access tokens and refresh-token helpers.
//! - [`onboarding_token`] -- employee onboarding tokens (full and single-step).

pub mod jwt;
pub mod onboarding_token;
pub mod password;

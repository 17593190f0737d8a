//! Request extractors for authentication and authorization.
//!
//! - [`auth::AuthUser`] -- any staff member holding a valid access token.
//! - [`rbac::RequireHr`] -- requires the `hr` role.
//! - [`onboarding::OnboardingSessionAuth`] -- an employee holding a live
//!   onboarding token.

pub mod auth;
pub mod onboarding;
pub mod rbac;

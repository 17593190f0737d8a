//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - `Deserialize` create/update DTOs where the API accepts them directly

pub mod audit;
pub mod employee;
pub mod job_application;
pub mod onboarding_session;
pub mod property;
pub mod session;
pub mod session_lock;
pub mod step_invitation;
pub mod user;

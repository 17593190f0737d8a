//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that take
//! `&PgPool` (or a transaction for multi-statement workflows) as the first
//! argument.

pub mod audit_repo;
pub mod employee_repo;
pub mod job_application_repo;
pub mod onboarding_session_repo;
pub mod property_repo;
pub mod session_lock_repo;
pub mod session_repo;
pub mod step_invitation_repo;
pub mod user_repo;

pub use audit_repo::AuditLogRepo;
pub use employee_repo::EmployeeRepo;
pub use job_application_repo::JobApplicationRepo;
pub use onboarding_session_repo::OnboardingSessionRepo;
pub use property_repo::PropertyRepo;
pub use session_lock_repo::SessionLockRepo;
pub use session_repo::SessionRepo;
pub use step_invitation_repo::StepInvitationRepo;
pub use user_repo::UserRepo;

//! Domain rules for the hotel onboarding backend.
//!
//! This crate has no I/O. Everything here is shared by the repository
//! layer, the HTTP API and the notification service.

pub mod access;
pub mod application;
pub mod audit;
pub mod error;
pub mod forms;
pub mod hashing;
pub mod i9;
pub mod onboarding;
pub mod pagination;
pub mod roles;
pub mod types;

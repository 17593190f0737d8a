//! Axum handlers, one module per resource.

pub mod admin;
pub mod application;
pub mod audit;
pub mod auth;
pub mod employee;
pub mod invitation;
mod notice;
pub mod onboarding;
pub mod property;

use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: the pool is reference counted and everything else is
/// behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: innkeep_db::DbPool,
    /// Server configuration (JWT secret, onboarding windows, frontend URL).
    pub config: Arc<ServerConfig>,
    /// Event bus feeding the email notifier.
    pub event_bus: Arc<innkeep_events::EventBus>,
}

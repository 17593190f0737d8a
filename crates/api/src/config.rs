use innkeep_core::onboarding::{
    DEFAULT_ONBOARDING_EXPIRY_HOURS, DEFAULT_SESSION_LOCK_MINUTES, DEFAULT_STEP_INVITE_EXPIRY_DAYS,
};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the JWT
/// secret, which must always be provided.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to drain after shutdown (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Staff JWT configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Onboarding token windows and link base URL.
    pub onboarding: OnboardingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            onboarding: OnboardingConfig::from_env(),
        }
    }
}

/// Onboarding link settings.
#[derive(Debug, Clone)]
pub struct OnboardingConfig {
    /// Lifetime of a full onboarding link in hours.
    pub token_expiry_hours: i64,
    /// Lifetime of a single-step invitation in days.
    pub step_invite_expiry_days: i64,
    /// Advisory session lock duration in minutes.
    pub lock_minutes: i64,
    /// Base URL of the employee-facing frontend, without a trailing slash.
    pub frontend_url: String,
}

impl Default for OnboardingConfig {
    fn default() -> Self {
        Self {
            token_expiry_hours: DEFAULT_ONBOARDING_EXPIRY_HOURS,
            step_invite_expiry_days: DEFAULT_STEP_INVITE_EXPIRY_DAYS,
            lock_minutes: DEFAULT_SESSION_LOCK_MINUTES,
            frontend_url: "http://localhost:5173".into(),
        }
    }
}

impl OnboardingConfig {
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `ONBOARDING_TOKEN_EXPIRY_HOURS` | `72`                    |
    /// | `STEP_INVITE_EXPIRY_DAYS`       | `7`                     |
    /// | `SESSION_LOCK_MINUTES`          | `30`                    |
    /// | `FRONTEND_URL`                  | `http://localhost:5173` |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let token_expiry_hours: i64 = std::env::var("ONBOARDING_TOKEN_EXPIRY_HOURS")
            .map(|v| v.parse().expect("ONBOARDING_TOKEN_EXPIRY_HOURS must be a valid i64"))
            .unwrap_or(defaults.token_expiry_hours);

        let step_invite_expiry_days: i64 = std::env::var("STEP_INVITE_EXPIRY_DAYS")
            .map(|v| v.parse().expect("STEP_INVITE_EXPIRY_DAYS must be a valid i64"))
            .unwrap_or(defaults.step_invite_expiry_days);

        let lock_minutes: i64 = std::env::var("SESSION_LOCK_MINUTES")
            .map(|v| v.parse().expect("SESSION_LOCK_MINUTES must be a valid i64"))
            .unwrap_or(defaults.lock_minutes);

        let frontend_url = std::env::var("FRONTEND_URL")
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or(defaults.frontend_url);

        Self {
            token_expiry_hours,
            step_invite_expiry_days,
            lock_minutes,
            frontend_url,
        }
    }

    /// Link an employee opens to start onboarding.
    pub fn onboarding_url(&self, token: &str) -> String {
        format!("{}/onboarding/welcome/{token}", self.frontend_url)
    }

    /// Link for a single-step invitation.
    pub fn step_form_url(&self, token: &str) -> String {
        format!("{}/onboarding/step/{token}", self.frontend_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_windows() {
        let config = OnboardingConfig::default();
        assert_eq!(config.token_expiry_hours, 72);
        assert_eq!(config.step_invite_expiry_days, 7);
        assert_eq!(config.lock_minutes, 30);
    }

    #[test]
    fn links_embed_the_token() {
        let config = OnboardingConfig {
            frontend_url: "https://jobs.example.com".into(),
            ..OnboardingConfig::default()
        };
        assert_eq!(
            config.onboarding_url("abc"),
            "https://jobs.example.com/onboarding/welcome/abc"
        );
        assert_eq!(
            config.step_form_url("xyz"),
            "https://jobs.example.com/onboarding/step/xyz"
        );
    }
}

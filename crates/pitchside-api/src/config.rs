//! Server configuration read from the environment.

use std::net::SocketAddr;

use chrono::TimeDelta;
use pitchside_intake::application::confirm::FailurePolicy;
use pitchside_intake::application::quick_create::PendingDraftPolicy;

use crate::error::AppError;

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL.
    pub database_url: String,
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Maximum pool size.
    pub max_connections: u32,
    /// What to do with encounters created before a failed multi-create.
    pub failure_policy: FailurePolicy,
    /// What to do with drafts typed before a quick-created encounter existed.
    pub pending_drafts: PendingDraftPolicy,
    /// How long an untouched selection wizard is kept.
    pub wizard_ttl: TimeDelta,
    /// OTLP collector endpoint; span export is off when unset.
    pub otlp_endpoint: Option<String>,
}

impl AppConfig {
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `DATABASE_URL` is missing or any value
    /// fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| AppError::Config("DATABASE_URL environment variable must be set".into()))?;
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;
        let max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;

        let rollback = parse_or(&lookup, "INTAKE_ROLLBACK_ON_FAILURE", false)?;
        let failure_policy = if rollback {
            FailurePolicy::Compensate
        } else {
            FailurePolicy::LeaveInPlace
        };

        let pending_drafts = match lookup("INTAKE_PENDING_DRAFTS").as_deref() {
            None | Some("migrate") => PendingDraftPolicy::Migrate,
            Some("abandon") => PendingDraftPolicy::Abandon,
            Some(other) => {
                return Err(AppError::Config(format!(
                    "INTAKE_PENDING_DRAFTS must be `migrate` or `abandon`, got `{other}`"
                )));
            }
        };

        let wizard_ttl_secs: u32 = parse_or(&lookup, "INTAKE_WIZARD_TTL_SECS", 3600)?;
        if wizard_ttl_secs == 0 {
            return Err(AppError::Config("INTAKE_WIZARD_TTL_SECS must be positive".into()));
        }
        let wizard_ttl = TimeDelta::seconds(i64::from(wizard_ttl_secs));

        let otlp_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            max_connections,
            failure_policy,
            pending_drafts,
            wizard_ttl,
            otlp_endpoint,
        })
    }

    /// The socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if host and port do not form an address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("{name} is invalid: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults_apply_when_only_database_url_is_set() {
        let config = config_from(&[("DATABASE_URL", "postgres://localhost/pitchside")]).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.failure_policy, FailurePolicy::LeaveInPlace);
        assert_eq!(config.pending_drafts, PendingDraftPolicy::Migrate);
        assert_eq!(config.wizard_ttl, TimeDelta::hours(1));
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn test_missing_database_url_is_rejected() {
        assert!(matches!(config_from(&[]), Err(AppError::Config(_))));
    }

    #[test]
    fn test_intake_policies_are_read() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/pitchside"),
            ("INTAKE_ROLLBACK_ON_FAILURE", "true"),
            ("INTAKE_PENDING_DRAFTS", "abandon"),
            ("INTAKE_WIZARD_TTL_SECS", "900"),
        ])
        .unwrap();

        assert_eq!(config.failure_policy, FailurePolicy::Compensate);
        assert_eq!(config.pending_drafts, PendingDraftPolicy::Abandon);
        assert_eq!(config.wizard_ttl, TimeDelta::minutes(15));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        for (name, value) in [
            ("PORT", "eighty"),
            ("INTAKE_ROLLBACK_ON_FAILURE", "sometimes"),
            ("INTAKE_PENDING_DRAFTS", "keep"),
            ("INTAKE_WIZARD_TTL_SECS", "0"),
            ("INTAKE_WIZARD_TTL_SECS", "-5"),
        ] {
            let result = config_from(&[("DATABASE_URL", "postgres://localhost/pitchside"), (name, value)]);
            assert!(matches!(result, Err(AppError::Config(_))), "{name}={value}");
        }
    }

    #[test]
    fn test_bind_addr_combines_host_and_port() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/pitchside"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8081"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8081");
    }
}

use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;
use eventcover_core::constants::{
    DEFAULT_DAILY_BACKUP_RETENTION_DAYS, DEFAULT_LOG_RETENTION_DAYS,
    DEFAULT_WEEKLY_BACKUP_RETENTION_DAYS,
};
use eventcover_core::maintenance::MaintenanceSettings;

/// Authorize.Net sandbox endpoint, used unless `EC_AUTHNET_ENDPOINT` is set.
pub const AUTHNET_SANDBOX_ENDPOINT: &str = "https://apitest.authorize.net/xml/v1/request.api";

#[derive(Debug, Clone, Default)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AuthorizeNetConfig {
    pub api_login_id: Option<String>,
    pub transaction_key: Option<String>,
    pub endpoint: String,
}

impl Default for AuthorizeNetConfig {
    fn default() -> Self {
        Self {
            api_login_id: None,
            transaction_key: None,
            endpoint: AUTHNET_SANDBOX_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub documents_dir: String,
    pub backup_dir: String,
    pub log_retention_days: i64,
    pub daily_backup_retention_days: i64,
    pub weekly_backup_retention_days: i64,
    pub admin_email: Option<String>,
    pub smtp: SmtpConfig,
    pub authorize_net: AuthorizeNetConfig,
    /// Accepted for deployment parity; errors are only recorded locally.
    pub error_tracking_dsn: Option<String>,
    pub scheduler_enabled: bool,
}

impl Config {
    /// Loads `.env` if present, then reads the `EC_*` variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    ///
    /// Unparsable values fall back to their defaults, except the listen
    /// address.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let listen_addr: SocketAddr = non_empty("EC_LISTEN_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("Invalid EC_LISTEN_ADDR")?;
        let db_path = non_empty("EC_DB_PATH").unwrap_or_else(|| "./db/app.db".into());
        let cors_allow = non_empty("EC_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = parse_or(&lookup, "EC_REQUEST_TIMEOUT_MS", 30_000);

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            documents_dir: non_empty("EC_DOCUMENTS_DIR")
                .unwrap_or_else(|| "./data/policy-versions".into()),
            backup_dir: non_empty("EC_BACKUP_DIR").unwrap_or_else(|| "./backups".into()),
            log_retention_days: parse_or(
                &lookup,
                "EC_LOG_RETENTION_DAYS",
                DEFAULT_LOG_RETENTION_DAYS,
            ),
            daily_backup_retention_days: parse_or(
                &lookup,
                "EC_DAILY_BACKUP_RETENTION_DAYS",
                DEFAULT_DAILY_BACKUP_RETENTION_DAYS,
            ),
            weekly_backup_retention_days: parse_or(
                &lookup,
                "EC_WEEKLY_BACKUP_RETENTION_DAYS",
                DEFAULT_WEEKLY_BACKUP_RETENTION_DAYS,
            ),
            admin_email: non_empty("EC_ADMIN_EMAIL"),
            smtp: SmtpConfig {
                host: non_empty("EC_SMTP_HOST"),
                user: non_empty("EC_SMTP_USER"),
                password: non_empty("EC_SMTP_PASSWORD"),
            },
            authorize_net: AuthorizeNetConfig {
                api_login_id: non_empty("EC_AUTHNET_API_LOGIN_ID"),
                transaction_key: non_empty("EC_AUTHNET_TRANSACTION_KEY"),
                endpoint: non_empty("EC_AUTHNET_ENDPOINT")
                    .unwrap_or_else(|| AUTHNET_SANDBOX_ENDPOINT.to_string()),
            },
            error_tracking_dsn: non_empty("EC_ERROR_TRACKING_DSN"),
            scheduler_enabled: parse_or(&lookup, "EC_SCHEDULER_ENABLED", true),
        })
    }

    pub fn maintenance_settings(&self) -> MaintenanceSettings {
        MaintenanceSettings {
            backup_dir: self.backup_dir.clone(),
            log_retention_days: self.log_retention_days,
            daily_backup_retention_days: self.daily_backup_retention_days,
            weekly_backup_retention_days: self.weekly_backup_retention_days,
            admin_email: self.admin_email.clone(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} '{}', using {}", key, raw, default);
            default
        }),
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.db_path, "./db/app.db");
        assert_eq!(config.cors_allow, vec!["*".to_string()]);
        assert_eq!(config.request_timeout, Duration::from_millis(30_000));
        assert_eq!(config.log_retention_days, 90);
        assert_eq!(config.daily_backup_retention_days, 7);
        assert_eq!(config.weekly_backup_retention_days, 30);
        assert_eq!(config.authorize_net.endpoint, AUTHNET_SANDBOX_ENDPOINT);
        assert!(config.scheduler_enabled);
        assert!(config.admin_email.is_none());
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let config = config_from(&[
            ("EC_LOG_RETENTION_DAYS", "ninety"),
            ("EC_SCHEDULER_ENABLED", "false"),
            ("EC_CORS_ALLOW_ORIGINS", "https://a.example, https://b.example"),
        ])
        .unwrap();
        assert_eq!(config.log_retention_days, 90);
        assert!(!config.scheduler_enabled);
        assert_eq!(config.cors_allow.len(), 2);
    }

    #[test]
    fn test_bad_listen_address_fails() {
        assert!(config_from(&[("EC_LISTEN_ADDR", "not-an-address")]).is_err());
    }

    #[test]
    fn test_maintenance_settings_follow_config() {
        let config = config_from(&[
            ("EC_BACKUP_DIR", "/var/backups/eventcover"),
            ("EC_ADMIN_EMAIL", "ops@example.com"),
        ])
        .unwrap();
        let settings = config.maintenance_settings();
        assert_eq!(settings.backup_dir, "/var/backups/eventcover");
        assert_eq!(settings.admin_email.as_deref(), Some("ops@example.com"));
    }
}

//! Application configuration.
//!
//! Settings come from environment variables, optionally seeded from a TOML
//! file. Environment values win over file values. All missing required
//! settings are reported at once.

use std::path::Path;
use std::str::FromStr;

use chrono::NaiveTime;
use costwatch_cost::AzureCredentials;
use notify::{SmtpConfig, DEFAULT_SMTP_PORT};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::schedule::Schedule;

/// Default SMTP relay.
pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";

/// Default daily cost threshold (USD).
pub const DEFAULT_COST_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Default time of the daily check.
pub const DEFAULT_DAILY_CHECK_AT: &str = "09:00";

/// Default time of the monthly report (on the 1st).
pub const DEFAULT_MONTHLY_REPORT_AT: &str = "10:00";

pub const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
pub const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";
pub const ENV_SUBSCRIPTION_ID: &str = "AZURE_SUBSCRIPTION_ID";
pub const ENV_SMTP_SERVER: &str = "SMTP_SERVER";
pub const ENV_SMTP_PORT: &str = "SMTP_PORT";
pub const ENV_SMTP_USERNAME: &str = "SMTP_USERNAME";
pub const ENV_SMTP_PASSWORD: &str = "SMTP_PASSWORD";
pub const ENV_EMAIL_FROM: &str = "ALERT_EMAIL_FROM";
pub const ENV_EMAIL_TO: &str = "ALERT_EMAIL_TO";
pub const ENV_COST_THRESHOLD: &str = "COST_THRESHOLD";
pub const ENV_DAILY_CHECK_AT: &str = "DAILY_CHECK_AT";
pub const ENV_MONTHLY_REPORT_AT: &str = "MONTHLY_REPORT_AT";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required settings were not provided
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A setting has an unusable value
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Azure connection settings.
#[derive(Debug, Clone)]
pub struct AzureSettings {
    pub credentials: AzureCredentials,
    pub subscription_id: String,
}

/// Fully resolved configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub azure: AzureSettings,
    pub smtp: SmtpConfig,
    /// Alert and report recipients.
    pub recipients: Vec<String>,
    /// Daily cost above which an alert is sent.
    pub threshold: Decimal,
    pub schedule: Schedule,
}

/// Optional file layer. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub azure: FileAzure,
    pub smtp: FileSmtp,
    pub alert: FileAlert,
    pub schedule: FileSchedule,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileAzure {
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub subscription_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSmtp {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileAlert {
    pub to: Option<Vec<String>>,
    pub cost_threshold: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSchedule {
    pub daily_check_at: Option<String>,
    pub monthly_report_at: Option<String>,
}

impl FileConfig {
    /// Read and parse a TOML config file.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

impl AppConfig {
    /// Load configuration from the process environment and an optional file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => FileConfig::read(path)?,
            None => FileConfig::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge `file` with values from `env`, which takes precedence.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut missing = Vec::new();

        // Blank values count as unset.
        let lookup = |key: &str, fallback: Option<String>| {
            env(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| fallback.filter(|v| !v.trim().is_empty()))
        };
        let mut required = |key: &'static str, fallback: Option<String>| {
            lookup(key, fallback).unwrap_or_else(|| {
                missing.push(key);
                String::new()
            })
        };

        let tenant_id = required(ENV_TENANT_ID, file.azure.tenant_id);
        let client_id = required(ENV_CLIENT_ID, file.azure.client_id);
        let client_secret = required(ENV_CLIENT_SECRET, file.azure.client_secret);
        let subscription_id = required(ENV_SUBSCRIPTION_ID, file.azure.subscription_id);
        let username = required(ENV_SMTP_USERNAME, file.smtp.username);
        let password = required(ENV_SMTP_PASSWORD, file.smtp.password);

        let recipients = match lookup(ENV_EMAIL_TO, None) {
            Some(list) => split_recipients(&list),
            None => file.alert.to.unwrap_or_default(),
        };
        let recipients: Vec<String> = recipients
            .into_iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            missing.push(ENV_EMAIL_TO);
        }

        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }

        let server = lookup(ENV_SMTP_SERVER, file.smtp.server)
            .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string());
        let port = match lookup(ENV_SMTP_PORT, None) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: ENV_SMTP_PORT,
                reason: format!("{raw:?} is not a port number ({e})"),
            })?,
            None => file.smtp.port.unwrap_or(DEFAULT_SMTP_PORT),
        };
        let from = lookup(ENV_EMAIL_FROM, file.smtp.from).unwrap_or_else(|| username.clone());

        let threshold = match lookup(ENV_COST_THRESHOLD, None) {
            Some(raw) => Decimal::from_str(&raw).map_err(|e| ConfigError::Invalid {
                key: ENV_COST_THRESHOLD,
                reason: format!("{raw:?} is not a number ({e})"),
            })?,
            None => file.alert.cost_threshold.unwrap_or(DEFAULT_COST_THRESHOLD),
        };
        if threshold.is_sign_negative() && !threshold.is_zero() {
            return Err(ConfigError::Invalid {
                key: ENV_COST_THRESHOLD,
                reason: format!("threshold must not be negative, got {threshold}"),
            });
        }

        let daily_at = parse_time(
            ENV_DAILY_CHECK_AT,
            &lookup(ENV_DAILY_CHECK_AT, file.schedule.daily_check_at)
                .unwrap_or_else(|| DEFAULT_DAILY_CHECK_AT.to_string()),
        )?;
        let monthly_at = parse_time(
            ENV_MONTHLY_REPORT_AT,
            &lookup(ENV_MONTHLY_REPORT_AT, file.schedule.monthly_report_at)
                .unwrap_or_else(|| DEFAULT_MONTHLY_REPORT_AT.to_string()),
        )?;

        Ok(Self {
            azure: AzureSettings {
                credentials: AzureCredentials::new(tenant_id, client_id, client_secret),
                subscription_id,
            },
            smtp: SmtpConfig {
                host: server,
                port,
                username,
                password,
                from,
            },
            recipients,
            threshold,
            schedule: Schedule {
                daily_at,
                monthly_at,
            },
        })
    }
}

fn split_recipients(list: &str) -> Vec<String> {
    list.split(',').map(str::to_string).collect()
}

fn parse_time(key: &'static str, value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("{value:?} is not a HH:MM time ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_TENANT_ID, "tenant"),
            (ENV_CLIENT_ID, "client"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_SUBSCRIPTION_ID, "sub"),
            (ENV_SMTP_USERNAME, "alerts@example.com"),
            (ENV_SMTP_PASSWORD, "app-password"),
            (ENV_EMAIL_TO, "ops@example.com, finance@example.com"),
        ])
    }

    fn resolve(
        file: FileConfig,
        env: &HashMap<&'static str, &'static str>,
    ) -> Result<AppConfig, ConfigError> {
        AppConfig::resolve(file, |key| env.get(key).map(|v| (*v).to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = resolve(FileConfig::default(), &base_env()).unwrap();

        assert_eq!(config.smtp.host, "smtp.gmail.com");
        assert_eq!(config.smtp.port, 587);
        assert_eq!(config.smtp.from, "alerts@example.com");
        assert_eq!(config.threshold, dec!(100));
        assert_eq!(
            config.recipients,
            vec!["ops@example.com".to_string(), "finance@example.com".to_string()]
        );
        assert_eq!(config.schedule.daily_at, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(config.schedule.monthly_at, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(config.azure.subscription_id, "sub");
    }

    #[test]
    fn test_missing_values_reported_together() {
        let mut env = base_env();
        env.remove(ENV_CLIENT_SECRET);
        env.remove(ENV_SMTP_PASSWORD);
        env.insert(ENV_EMAIL_TO, " , ");

        match resolve(FileConfig::default(), &env) {
            Err(ConfigError::Missing(keys)) => assert_eq!(
                keys,
                vec![ENV_CLIENT_SECRET, ENV_SMTP_PASSWORD, ENV_EMAIL_TO]
            ),
            other => panic!("expected missing keys, got {other:?}"),
        }
    }

    #[test]
    fn test_env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [azure]
            tenant_id = "file-tenant"

            [smtp]
            server = "smtp.office365.com"
            port = 25

            [alert]
            to = ["file@example.com"]
            cost_threshold = 42.5

            [schedule]
            daily_check_at = "07:30"
            "#,
        )
        .unwrap();

        let mut env = base_env();
        env.remove(ENV_EMAIL_TO);
        env.insert(ENV_SMTP_PORT, "2525");

        let config = resolve(file, &env).unwrap();
        assert_eq!(config.azure.credentials.tenant_id, "tenant");
        assert_eq!(config.smtp.host, "smtp.office365.com");
        assert_eq!(config.smtp.port, 2525);
        assert_eq!(config.recipients, vec!["file@example.com".to_string()]);
        assert_eq!(config.threshold, dec!(42.5));
        assert_eq!(config.schedule.daily_at, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_file_supplies_required_values() {
        let file: FileConfig = toml::from_str(
            r#"
            [azure]
            tenant_id = "t"
            client_id = "c"
            client_secret = "s"
            subscription_id = "sub"

            [smtp]
            username = "u@example.com"
            password = "p"

            [alert]
            to = ["a@example.com"]
            "#,
        )
        .unwrap();

        let config = resolve(file, &HashMap::new()).unwrap();
        assert_eq!(config.smtp.username, "u@example.com");
        assert_eq!(config.recipients.len(), 1);
    }

    #[test]
    fn test_invalid_values() {
        let mut env = base_env();
        env.insert(ENV_COST_THRESHOLD, "lots");
        assert!(matches!(
            resolve(FileConfig::default(), &env),
            Err(ConfigError::Invalid { key: ENV_COST_THRESHOLD, .. })
        ));

        env.insert(ENV_COST_THRESHOLD, "-1");
        assert!(matches!(
            resolve(FileConfig::default(), &env),
            Err(ConfigError::Invalid { key: ENV_COST_THRESHOLD, .. })
        ));

        env.insert(ENV_COST_THRESHOLD, "0");
        env.insert(ENV_DAILY_CHECK_AT, "9am");
        assert!(matches!(
            resolve(FileConfig::default(), &env),
            Err(ConfigError::Invalid { key: ENV_DAILY_CHECK_AT, .. })
        ));

        env.remove(ENV_DAILY_CHECK_AT);
        env.insert(ENV_SMTP_PORT, "70000");
        assert!(matches!(
            resolve(FileConfig::default(), &env),
            Err(ConfigError::Invalid { key: ENV_SMTP_PORT, .. })
        ));
    }

    #[test]
    fn test_unknown_file_keys_rejected() {
        let parsed: Result<FileConfig, _> = toml::from_str("[smtp]\nhots = \"typo\"\n");
        assert!(parsed.is_err());
    }

    #[test]
    #[serial_test::serial]
    fn test_load_from_process_env() {
        let vars = base_env();
        for (key, value) in &vars {
            std::env::set_var(key, value);
        }
        std::env::set_var(ENV_COST_THRESHOLD, "12.5");

        let config = AppConfig::load(None);

        for key in vars.keys() {
            std::env::remove_var(key);
        }
        std::env::remove_var(ENV_COST_THRESHOLD);

        assert_eq!(config.unwrap().threshold, dec!(12.5));
    }
}

//! Shell configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DEMO_LOAD_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MOUNT_IDLE_TTL_SECS: u64 = 900;
pub const DEFAULT_MOUNT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown APP_ENV: {0} (expected 'development', 'test' or 'production')")]
    UnknownEnvironment(String),
}

impl crate::error::ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownEnvironment(_) => "E_CONFIG_PARSE",
        }
    }
}

/// Deployment mode. Only `Production` suppresses boundary diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl AppEnv {
    #[must_use]
    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub port: u16,
    pub app_env: AppEnv,
    pub load_timeout: Duration,
    pub mount_idle_ttl: Duration,
    pub sweep_interval: Duration,
    /// Replaces the embedded `widgets.yaml` seed when set.
    pub widgets_file: Option<PathBuf>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            app_env: AppEnv::Development,
            load_timeout: Duration::from_secs(DEFAULT_DEMO_LOAD_TIMEOUT_SECS),
            mount_idle_ttl: Duration::from_secs(DEFAULT_MOUNT_IDLE_TTL_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_MOUNT_SWEEP_INTERVAL_SECS),
            widgets_file: None,
        }
    }
}

impl ShellConfig {
    /// Build typed shell config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `APP_ENV`: `development` (default), `test` or `production`
    /// - `DEMO_LOAD_TIMEOUT_SECS`: default 10
    /// - `MOUNT_IDLE_TTL_SECS`: default 900
    /// - `MOUNT_SWEEP_INTERVAL_SECS`: default 60
    /// - `WIDGETS_FILE`: path to a YAML widget list
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownEnvironment`] for an unrecognized `APP_ENV`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ShellConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownEnvironment`] for an unrecognized `APP_ENV`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_env = parse_app_env(lookup("APP_ENV").as_deref())?;
        let widgets_file = lookup("WIDGETS_FILE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let secs = |key: &str, default: u64| Duration::from_secs(parse_or(lookup(key), default));

        Ok(Self {
            port: parse_or(lookup("PORT"), DEFAULT_PORT),
            app_env,
            load_timeout: secs("DEMO_LOAD_TIMEOUT_SECS", DEFAULT_DEMO_LOAD_TIMEOUT_SECS),
            mount_idle_ttl: secs("MOUNT_IDLE_TTL_SECS", DEFAULT_MOUNT_IDLE_TTL_SECS),
            sweep_interval: secs("MOUNT_SWEEP_INTERVAL_SECS", DEFAULT_MOUNT_SWEEP_INTERVAL_SECS),
            widgets_file,
        })
    }

    /// Whether boundary failures are written to the diagnostic log.
    #[must_use]
    pub fn diagnostics_enabled(&self) -> bool {
        !self.app_env.is_production()
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

fn parse_app_env(raw: Option<&str>) -> Result<AppEnv, ConfigError> {
    match raw.map(str::trim).unwrap_or("development").to_ascii_lowercase().as_str() {
        "development" | "dev" | "" => Ok(AppEnv::Development),
        "test" => Ok(AppEnv::Test),
        "production" | "prod" => Ok(AppEnv::Production),
        other => Err(ConfigError::UnknownEnvironment(other.to_string())),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<ShellConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    ShellConfig::from_lookup(|key| vars.get(key).cloned())
}

// =============================================================================
// parse_or
// =============================================================================

#[test]
fn parse_or_missing_returns_default() {
    let val: u64 = parse_or(None, 42);
    assert_eq!(val, 42);
}

#[test]
fn parse_or_trims_whitespace() {
    let val: u64 = parse_or(Some(" 17 ".into()), 0);
    assert_eq!(val, 17);
}

#[test]
fn parse_or_invalid_returns_default() {
    let val: u16 = parse_or(Some("soon".into()), 8);
    assert_eq!(val, 8);
}

// =============================================================================
// parse_app_env
// =============================================================================

#[test]
fn parse_app_env_defaults_to_development() {
    assert_eq!(parse_app_env(None).unwrap(), AppEnv::Development);
}

#[test]
fn parse_app_env_accepts_aliases_case_insensitively() {
    assert_eq!(parse_app_env(Some("PROD")).unwrap(), AppEnv::Production);
    assert_eq!(parse_app_env(Some("Production")).unwrap(), AppEnv::Production);
    assert_eq!(parse_app_env(Some("dev")).unwrap(), AppEnv::Development);
    assert_eq!(parse_app_env(Some(" test ")).unwrap(), AppEnv::Test);
}

#[test]
fn parse_app_env_unknown_errors() {
    let err = parse_app_env(Some("staging")).unwrap_err().to_string();
    assert!(err.contains("unknown APP_ENV"));
}

// =============================================================================
// ShellConfig
// =============================================================================

#[test]
fn from_lookup_defaults() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg, ShellConfig::default());
    assert!(cfg.diagnostics_enabled());
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = config_from(&[
        ("PORT", "8080"),
        ("APP_ENV", "production"),
        ("DEMO_LOAD_TIMEOUT_SECS", "3"),
        ("MOUNT_IDLE_TTL_SECS", "30"),
        ("MOUNT_SWEEP_INTERVAL_SECS", "5"),
        ("WIDGETS_FILE", "/etc/showcase/widgets.yaml"),
    ])
    .unwrap();

    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.app_env, AppEnv::Production);
    assert_eq!(cfg.load_timeout, Duration::from_secs(3));
    assert_eq!(cfg.mount_idle_ttl, Duration::from_secs(30));
    assert_eq!(cfg.sweep_interval, Duration::from_secs(5));
    assert_eq!(cfg.widgets_file, Some(PathBuf::from("/etc/showcase/widgets.yaml")));
    assert!(!cfg.diagnostics_enabled());
}

#[test]
fn from_lookup_blank_widgets_file_is_ignored() {
    let cfg = config_from(&[("WIDGETS_FILE", "   ")]).unwrap();
    assert!(cfg.widgets_file.is_none());
}

#[test]
fn from_lookup_bad_port_falls_back() {
    let cfg = config_from(&[("PORT", "99999")]).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
}

#[test]
fn from_lookup_unknown_env_errors() {
    assert!(matches!(config_from(&[("APP_ENV", "qa")]), Err(ConfigError::UnknownEnvironment(_))));
}

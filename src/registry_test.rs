use super::*;

fn terminal() -> WidgetEntry {
    WidgetEntry::new("terminal", "Terminal")
        .with_description("shell demo")
        .with_subdomain("terminal")
        .with_port(7681)
}

// =============================================================================
// register / lookup
// =============================================================================

#[test]
fn lookup_returns_registered_entry() {
    let mut reg = WidgetRegistry::new();
    reg.register(terminal()).unwrap();
    assert_eq!(reg.lookup("terminal"), Some(&terminal()));
}

#[test]
fn lookup_unregistered_is_none() {
    let mut reg = WidgetRegistry::new();
    reg.register(terminal()).unwrap();
    assert!(reg.lookup("nonexistent-widget").is_none());
    assert!(!reg.contains("nonexistent-widget"));
}

#[test]
fn duplicate_key_is_rejected_and_registry_unchanged() {
    let mut reg = WidgetRegistry::new();
    reg.register(terminal()).unwrap();

    let imposter = WidgetEntry::new("terminal", "Imposter");
    let err = reg.register(imposter).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateKey(ref k) if k == "terminal"));

    assert_eq!(reg.len(), 1);
    assert_eq!(reg.lookup("terminal").unwrap().title, "Terminal");
}

#[test]
fn invalid_keys_are_rejected() {
    let mut reg = WidgetRegistry::new();
    for key in ["", "Terminal", "has space", "slash/key"] {
        let err = reg.register(WidgetEntry::new(key, "x")).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidKey(_)), "expected InvalidKey for {key:?}");
    }
    assert!(reg.is_empty());
}

// =============================================================================
// list
// =============================================================================

#[test]
fn list_preserves_insertion_order() {
    let reg = WidgetRegistry::from_entries([
        WidgetEntry::new("zeta", "Z"),
        WidgetEntry::new("alpha", "A"),
        WidgetEntry::new("mid", "M"),
    ])
    .unwrap();
    let keys: Vec<&str> = reg.list().iter().map(|e| e.key.as_str()).collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn list_is_restartable() {
    let reg = WidgetRegistry::from_entries([WidgetEntry::new("a", "A"), WidgetEntry::new("b", "B")]).unwrap();
    let first: Vec<_> = reg.list().iter().map(|e| e.key.clone()).collect();
    let second: Vec<_> = reg.list().iter().map(|e| e.key.clone()).collect();
    assert_eq!(first, second);
}

// =============================================================================
// Seed data
// =============================================================================

#[test]
fn builtin_seed_parses() {
    let reg = WidgetRegistry::builtin().unwrap();
    let terminal = reg.lookup("terminal").unwrap();
    assert_eq!(terminal.title, "Terminal");
    assert_eq!(terminal.port, Some(7681));
    assert!(reg.contains("counter"));
    assert_eq!(reg.list()[0].key, "terminal");
}

#[test]
fn from_yaml_defaults_optional_fields() {
    let reg = WidgetRegistry::from_yaml("- key: bare\n  title: Bare\n").unwrap();
    let entry = reg.lookup("bare").unwrap();
    assert!(entry.description.is_none());
    assert!(entry.subdomain.is_none());
    assert!(entry.port.is_none());
}

#[test]
fn from_yaml_duplicate_is_fatal() {
    let yaml = "- key: a\n  title: A\n- key: a\n  title: Again\n";
    assert!(matches!(WidgetRegistry::from_yaml(yaml), Err(RegistryError::DuplicateKey(_))));
}

#[test]
fn from_yaml_malformed_is_parse_error() {
    assert!(matches!(WidgetRegistry::from_yaml("key: [unterminated"), Err(RegistryError::Parse(_))));
}

#[test]
fn load_without_path_uses_builtin() {
    let reg = WidgetRegistry::load(None).unwrap();
    assert_eq!(reg.len(), WidgetRegistry::builtin().unwrap().len());
}

#[test]
fn load_missing_file_is_io_error() {
    let err = WidgetRegistry::load(Some(Path::new("/definitely/not/here/widgets.yaml"))).unwrap_err();
    assert!(matches!(err, RegistryError::Io { .. }));
    assert!(err.to_string().contains("/definitely/not/here/widgets.yaml"));
}

#[test]
fn error_codes_are_stable() {
    use crate::error::ErrorCode;
    assert_eq!(RegistryError::DuplicateKey("x".into()).error_code(), "E_DUPLICATE_KEY");
    assert_eq!(RegistryError::InvalidKey(String::new()).error_code(), "E_INVALID_KEY");
}

//! Integration tests for server configuration and CSV participant import.

use cue_tournament_web::{read_participants, ConfigError, ImportError, ServerConfig};
use std::collections::HashMap;
use std::time::Duration;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn config_defaults_when_nothing_is_set() {
    let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.port, 8080);
    assert_eq!(config.default_max_participants, 8);
}

#[test]
fn config_reads_overrides() {
    let config = ServerConfig::from_lookup(lookup(&[
        ("HOST", "127.0.0.1"),
        ("PORT", "5000"),
        ("STATIC_DIR", "client/dist"),
        ("INACTIVITY_TIMEOUT_HOURS", "0"),
        ("DEFAULT_MAX_PARTICIPANTS", "16"),
    ]))
    .unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 5000);
    assert_eq!(config.static_dir.to_str(), Some("client/dist"));
    assert_eq!(config.inactivity_timeout, None);
    assert_eq!(config.default_max_participants, 16);

    let config = ServerConfig::from_lookup(lookup(&[("INACTIVITY_TIMEOUT_HOURS", "2")])).unwrap();
    assert_eq!(config.inactivity_timeout, Some(Duration::from_secs(7200)));
}

#[test]
fn config_rejects_bad_values() {
    assert_eq!(
        ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])),
        Err(ConfigError::InvalidValue { key: "PORT", value: "eighty".to_string() })
    );
    assert_eq!(
        ServerConfig::from_lookup(lookup(&[("DEFAULT_MAX_PARTICIPANTS", "6")])),
        Err(ConfigError::InvalidValue {
            key: "DEFAULT_MAX_PARTICIPANTS",
            value: "6".to_string()
        })
    );
    let too_many_hours = (u64::MAX / 3600 + 1).to_string();
    assert_eq!(
        ServerConfig::from_lookup(lookup(&[("INACTIVITY_TIMEOUT_HOURS", too_many_hours.as_str())])),
        Err(ConfigError::InvalidValue {
            key: "INACTIVITY_TIMEOUT_HOURS",
            value: too_many_hours.clone()
        })
    );
}

#[test]
fn import_reads_names_and_optional_emails() {
    let csv = "name,email\nJudd Trump, judd@example.com\nMark Selby,\n";
    let participants = read_participants(csv.as_bytes()).unwrap();
    assert_eq!(participants.len(), 2);
    assert_eq!(participants[0].name, "Judd Trump");
    assert_eq!(participants[0].email.as_deref(), Some("judd@example.com"));
    assert_eq!(participants[1].name, "Mark Selby");
    assert_eq!(participants[1].email, None);
    assert_ne!(participants[0].id, participants[1].id);
}

#[test]
fn import_accepts_a_name_only_file() {
    let participants = read_participants("name\nA\nB\n".as_bytes()).unwrap();
    assert_eq!(participants.len(), 2);
    assert!(participants.iter().all(|p| p.email.is_none()));
}

#[test]
fn import_rejects_blank_names() {
    let csv = "name,email\nA,a@example.com\n ,b@example.com\n";
    assert!(matches!(
        read_participants(csv.as_bytes()),
        Err(ImportError::EmptyName { line: 3 })
    ));
}

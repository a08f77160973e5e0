mod support;

use std::io::Write;

use deck_engine::config::{ConfigError, EngineConfig};
use support::with_scoped_env;

#[test]
fn test_from_file_reads_all_sections() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[filter]
debounce_ms = 120
show_all_tiers = true

[insights]
warning_threshold = 2
optimal_ratio_floor = 0.75

[trends]
window = 4
history_capacity = 8
"#
    )
    .unwrap();

    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.filter.debounce_ms, 120);
    assert!(config.filter.show_all_tiers);
    assert_eq!(config.insights.warning_threshold, 2);
    assert_eq!(config.insights.pending_threshold, 10);
    assert_eq!(config.insights.optimal_ratio_floor, 0.75);
    assert_eq!(config.trends.window, 4);
    assert_eq!(config.trends.history_capacity, 8);
}

#[test]
fn test_from_file_parse_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[filter\ndebounce_ms = 1").unwrap();

    let err = EngineConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_env_overrides() {
    with_scoped_env(
        &[
            ("DECK_DEBOUNCE_MS", Some("50")),
            ("DECK_SHOW_ALL_TIERS", Some("yes")),
        ],
        || {
            let config = EngineConfig::default().apply_env_overrides().unwrap();
            assert_eq!(config.filter.debounce_ms, 50);
            assert!(config.filter.show_all_tiers);
        },
    );
}

#[test]
fn test_env_overrides_absent_keep_values() {
    with_scoped_env(
        &[("DECK_DEBOUNCE_MS", None), ("DECK_SHOW_ALL_TIERS", None)],
        || {
            let config = EngineConfig::default().apply_env_overrides().unwrap();
            assert_eq!(config, EngineConfig::default());
        },
    );
}

#[test]
fn test_invalid_env_override() {
    with_scoped_env(&[("DECK_DEBOUNCE_MS", Some("soon"))], || {
        let err = EngineConfig::default().apply_env_overrides().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "DECK_DEBOUNCE_MS"));
    });

    with_scoped_env(&[("DECK_SHOW_ALL_TIERS", Some("maybe"))], || {
        assert!(EngineConfig::default().apply_env_overrides().is_err());
    });
}

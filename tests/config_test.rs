//! Layered configuration loading

use std::fs;

use serial_test::serial;
use tempfile::TempDir;

use ChurchHub::config::Settings;

fn write_config(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("churchhub.toml");
    fs::write(&path, contents).expect("write config file");
    path.to_string_lossy().into_owned()
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent");

    let settings = Settings::load(&path.to_string_lossy()).unwrap();

    assert_eq!(settings.server.port, 8080);
    assert!(settings.features.bulk_import);
    assert!(settings.validate().is_ok());
}

#[test]
#[serial]
fn test_file_overrides_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
port = 9090

[import]
synthetic_email_domain = "grace.church"
row_delay_ms = 25

[features]
donations = false
"#,
    );

    let settings = Settings::load(&path).unwrap();

    assert_eq!(settings.server.port, 9090);
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.import.synthetic_email_domain, "grace.church");
    assert_eq!(settings.import.row_delay_ms, 25);
    assert_eq!(settings.import.default_role, "member");
    assert!(!settings.features.donations);
}

#[test]
#[serial]
fn test_environment_wins_over_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[features]\nrate_limit_per_minute = 30\n");

    std::env::set_var("CHURCHHUB__FEATURES__RATE_LIMIT_PER_MINUTE", "0");
    let settings = Settings::load(&path);
    std::env::remove_var("CHURCHHUB__FEATURES__RATE_LIMIT_PER_MINUTE");

    assert_eq!(settings.unwrap().features.rate_limit_per_minute, 0);
}

#[test]
#[serial]
fn test_invalid_file_values_fail_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"chatty\"\n");

    let settings = Settings::load(&path).unwrap();

    assert!(settings.validate().is_err());
}

//! Config and secrets loading from files.
#![cfg(feature = "server")]

use std::io::Write;

use kapow::server::config::{Config, Secrets};
use tempfile::NamedTempFile;

fn write_temp(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn load_explicit_config_file() {
    let file = write_temp(
        r#"
        [server]
        address = "0.0.0.0:9000"

        [cache]
        ttl_secs = 120
        index_ttl_secs = 600
    "#,
    );

    let config = Config::load(Some(file.path())).unwrap();
    assert_eq!(config.server.address, "0.0.0.0:9000");
    assert_eq!(config.cache.ttl_secs, 120);
    assert!(config.cache_config().validate().is_ok());
}

#[test]
fn invalid_toml_is_a_configuration_error() {
    let file = write_temp("[server\naddress = ");
    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, kapow::KapowError::Configuration(_)));
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn empty_config_file_uses_defaults() {
    let file = write_temp("");
    let config = Config::load_from_file(file.path()).unwrap();
    assert_eq!(config.server.address, "127.0.0.1:9742");
    assert_eq!(config.api.timeout_secs, 45);
}

#[test]
fn secrets_file_provides_key() {
    let file = write_temp(r#"api_key = "from-file""#);
    let secrets = Secrets::load_from_file(file.path()).unwrap();
    assert_eq!(secrets.api_key(), Some("from-file".to_string()));

    let settings = Config::default().settings(&secrets);
    assert_eq!(settings.api_key, "from-file");
    assert!(!settings.uses_default_key());
}

#[cfg(unix)]
#[test]
fn secrets_permissions_are_checked() {
    use std::os::unix::fs::PermissionsExt;

    let file = write_temp(r#"api_key = "k""#);

    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o644)).unwrap();
    let err = Secrets::check_permissions(file.path()).unwrap_err();
    assert!(err.to_string().contains("insecure permissions"));

    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o600)).unwrap();
    assert!(Secrets::check_permissions(file.path()).is_ok());
}

use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};
use serial_test::serial;

#[test]
#[serial]
fn given_port_below_1024_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _port = EnvGuard::set("GSM_SERVER_PORT", "80");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_port_zero_when_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();
    let _port = EnvGuard::set("GSM_SERVER_PORT", "0");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_max_connections_zero_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _max = EnvGuard::set("GSM_SERVER_MAX_CONNECTIONS", "0");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_blank_host_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _host = EnvGuard::set("GSM_SERVER_HOST", "  ");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_host_and_port_when_bind_addr_then_joined() {
    let _temp = setup_config_dir();
    let _host = EnvGuard::set("GSM_SERVER_HOST", "0.0.0.0");
    let _port = EnvGuard::set("GSM_SERVER_PORT", "25580");

    let config = Config::load().unwrap();

    assert_eq!(config.bind_addr(), "0.0.0.0:25580");
}

#[test]
#[serial]
fn given_auth_section_without_enabled_when_load_then_auth_stays_disabled() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[auth]\n").unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert!(!config.auth.enabled);
    assert_eq!(config.auth.describe(), "disabled, every caller is admin");
}

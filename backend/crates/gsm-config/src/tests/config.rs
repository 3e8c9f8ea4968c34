use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

#[test]
#[serial]
fn given_no_config_file_when_load_then_ok_with_defaults() {
    // Given
    let _temp = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
    assert_that!(
        config.server.max_connections,
        eq(crate::DEFAULT_MAX_CONNECTIONS)
    );
    assert_that!(config.auth.enabled, eq(false));
    assert_that!(config.process.command.as_str(), eq("java"));
    assert_that!(config.process.ready_pattern.as_str(), eq("Done ("));
    assert_that!(config.logs.ring_capacity, eq(1000));
}

#[test]
#[serial]
fn given_no_config_file_when_load_and_validate_then_ok() {
    // Given
    let _temp = setup_config_dir();

    // When
    let config = Config::load().unwrap();
    let result = config.validate();

    // Then
    assert_that!(result, ok(anything()));
}

#[test]
#[serial]
fn given_valid_toml_file_when_load_then_uses_toml_values() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [server]
            port = 9000

            [process]
            command = "/bin/sh"
            args = ["run.sh"]
            stop_timeout_secs = 5

            [logs]
            ring_capacity = 50
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(9000));
    assert_that!(config.process.command.as_str(), eq("/bin/sh"));
    assert_that!(config.process.args.len(), eq(1));
    assert_that!(config.process.stop_timeout_secs, eq(5));
    assert_that!(config.process.kill_timeout_secs, eq(10));
    assert_that!(config.logs.ring_capacity, eq(50));
}

#[test]
#[serial]
fn given_malformed_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server\nport = ").unwrap();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, err(anything()));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_overrides_toml() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server]\nport = 9000").unwrap();
    let _port_guard = EnvGuard::set("GSM_SERVER_PORT", "8888");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(8888));
}

#[test]
#[serial]
fn given_process_args_env_when_load_then_split_on_whitespace() {
    // Given
    let _temp = setup_config_dir();
    let _args = EnvGuard::set("GSM_PROCESS_ARGS", "-Xmx4G  -jar paper.jar");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(
        config.process.args,
        eq(&vec![
            "-Xmx4G".to_string(),
            "-jar".to_string(),
            "paper.jar".to_string()
        ])
    );
}

#[test]
#[serial]
fn given_relative_paths_when_resolved_then_anchored_at_config_dir_parent() {
    // Given
    let (temp, _guard) = setup_config_dir();
    let parent = temp.path().parent().unwrap().to_path_buf();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.process_working_dir().unwrap(), eq(&parent.join("server")));
    assert_that!(config.backup_data_dir().unwrap(), eq(&parent.join("server")));
    assert_that!(config.backup_dir().unwrap(), eq(&parent.join("backups")));
    assert_that!(
        config.database_path().unwrap(),
        eq(&temp.path().join("gsm.db"))
    );
}

#[test]
#[serial]
fn given_database_path_with_parent_segment_when_validate_then_error() {
    // Given
    let _temp = setup_config_dir();
    let _db = EnvGuard::set("GSM_DATABASE_PATH", "../elsewhere.db");

    // When
    let result = Config::load().unwrap().validate();

    // Then
    assert_that!(result, err(anything()));
}

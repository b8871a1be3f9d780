use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_labelcheck_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("LABELCHECK_PORT");
        env::remove_var("LABELCHECK_BIND_ADDR");
        env::remove_var("LABELCHECK_UPLOAD_DIR");
        env::remove_var("LABELCHECK_PROVIDER_MODEL");
        env::remove_var("LABELCHECK_PROVIDER_TIMEOUT_SECS");
        env::remove_var("LABELCHECK_MAX_BATCH_SIZE");
        env::remove_var("LABELCHECK_CONCURRENCY");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert_eq!(config.upload_dir, PathBuf::from("./tmp/uploads"));
    assert_eq!(config.provider_model, "gpt-4.1-mini");
    assert_eq!(config.provider_timeout_secs, 60);
    assert_eq!(config.max_batch_size, 100);
    assert_eq!(config.concurrency, 10);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_labelcheck_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert_eq!(config.max_batch_size, 100);
    assert_eq!(config.concurrency, 10);
}

#[test]
#[serial]
fn test_from_env_with_overrides() {
    clear_labelcheck_env();

    let config = with_env_vars(
        &[
            ("LABELCHECK_PORT", "9090"),
            ("LABELCHECK_BIND_ADDR", "0.0.0.0"),
            ("LABELCHECK_UPLOAD_DIR", "/var/lib/labelcheck/uploads"),
            ("LABELCHECK_PROVIDER_MODEL", "gpt-4.1"),
            ("LABELCHECK_PROVIDER_TIMEOUT_SECS", "30"),
            ("LABELCHECK_MAX_BATCH_SIZE", "25"),
            ("LABELCHECK_CONCURRENCY", "4"),
        ],
        || Config::from_env().expect("should parse overrides"),
    );

    assert_eq!(config.port, 9090);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0))
    );
    assert_eq!(config.upload_dir, PathBuf::from("/var/lib/labelcheck/uploads"));
    assert_eq!(config.provider_model, "gpt-4.1");
    assert_eq!(config.provider_timeout_secs, 30);
    assert_eq!(config.max_batch_size, 25);
    assert_eq!(config.concurrency, 4);
}

#[test]
#[serial]
fn test_invalid_port_rejected() {
    clear_labelcheck_env();

    let result = with_env_vars(&[("LABELCHECK_PORT", "0")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidPort { .. })));

    let result = with_env_vars(&[("LABELCHECK_PORT", "not-a-port")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::PortParseError { .. })));
}

#[test]
#[serial]
fn test_invalid_bind_addr_rejected() {
    clear_labelcheck_env();

    let result = with_env_vars(&[("LABELCHECK_BIND_ADDR", "not-an-ip")], Config::from_env);
    assert!(matches!(result, Err(ConfigError::InvalidBindAddr { .. })));
}

#[test]
fn test_validate_rejects_zero_concurrency() {
    let config = Config {
        concurrency: 0,
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidConcurrency { value: 0 })
    ));
}

#[test]
fn test_validate_rejects_out_of_range_batch_limit() {
    for value in [0, 101] {
        let config = Config {
            max_batch_size: value,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidBatchLimit { .. })
        ));
    }
}

#[test]
fn test_validate_rejects_file_as_upload_dir() {
    let file = tempfile::NamedTempFile::new().expect("temp file");
    let config = Config {
        upload_dir: file.path().to_path_buf(),
        ..Default::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::NotADirectory { .. })
    ));
}

#[test]
fn test_validate_accepts_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = Config {
        upload_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

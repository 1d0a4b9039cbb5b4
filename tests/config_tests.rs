use std::path::PathBuf;
use rc_remote::config::io::ConfigIO;
use rc_remote::config::types::{Config, SerialConfig};
use rc_remote::error::ConfigError;
use uuid::Uuid;

fn scratch_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rc-remote-test-{}", std::process::id()));
    let path = dir.join(name);
    let _ = std::fs::remove_file(&path);
    path
}

#[tokio::test]
async fn empty_file_is_filled_with_defaults() {
    let path = scratch_path("defaults.json");
    let config_io = ConfigIO::new_sync(Some(&path)).unwrap();

    let config = config_io.read().await.unwrap();

    assert_eq!(config, Config::default());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("\"serviceUuid\": \"0000ffe0-0000-1000-8000-00805f9b34fb\""));
}

#[tokio::test]
async fn saved_config_is_read_back() {
    let path = scratch_path("saved.json");
    let config_io = ConfigIO::new_sync(Some(&path)).unwrap();
    let config = Config {
        serial: SerialConfig {
            service_uuid: Uuid::from_u128(0x6e400001_b5a3_f393_e0a9_e50e24dcca9e),
            characteristic_uuid: Uuid::from_u128(0x6e400002_b5a3_f393_e0a9_e50e24dcca9e),
            write_with_response: true,
        },
    };

    config_io.save(&config).await.unwrap();

    assert_eq!(config_io.read().await.unwrap(), config);
}

#[tokio::test]
async fn malformed_file_is_an_error() {
    let path = scratch_path("broken.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();
    let config_io = ConfigIO::new_sync(Some(&path)).unwrap();

    let err = config_io.read().await.unwrap_err();

    assert!(matches!(err, ConfigError::JsonError { .. }));
}

#[test]
fn second_instance_can_not_lock() {
    let path = scratch_path("locked.json");
    let mut first = ConfigIO::new_sync(Some(&path)).unwrap();
    let mut first_locker = first.locker().unwrap();
    let _guard = first_locker.lock().unwrap();

    let mut second = ConfigIO::new_sync(Some(&path)).unwrap();
    let mut second_locker = second.locker().unwrap();

    assert!(matches!(second_locker.lock(), Err(ConfigError::CanNotLock { .. })));
}

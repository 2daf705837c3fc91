use serial_test::serial;
use utils::app_config::*;

pub fn initialize() {
    // Reset to original test configuration
    let config_contents = include_str!("resources/test_config.toml");
    AppConfig::init(Some(config_contents)).unwrap();
}

#[test]
#[serial]
fn fetch_config() {
    initialize();

    let config = AppConfig::fetch().unwrap();

    assert_eq!(config.log.level, "info");
    assert!(!config.log.file);

    assert_eq!(config.host.transfer_binary, "/usr/bin/rsync");
    assert_eq!(config.host.ssh_binary, "/usr/bin/ssh");
    assert!(config.host.mount_root.is_empty());

    assert_eq!(config.sync.local_base, "~");
    assert_eq!(
        config.sync.data_subdirs,
        vec!["Documents", "Desktop", "Projects"]
    );
    assert_eq!(config.sync.blob_subdirs, vec!["Music", "Movies"]);
    assert_eq!(config.sync.exclude, vec![".DS_Store", "*.tmp"]);
    assert_eq!(config.sync.timestamp_tolerance, 1);
    assert!(!config.sync.allow_missing);

    assert!(!config.ssh.enabled());
}

#[test]
#[serial]
fn verify_get() {
    initialize();

    assert_eq!(AppConfig::get::<String>("log.level").unwrap(), "info");
    assert_eq!(AppConfig::get::<u32>("sync.timestamp_tolerance").unwrap(), 1);
    assert_eq!(
        AppConfig::get::<Vec<String>>("sync.blob_subdirs").unwrap(),
        vec!["Music", "Movies"]
    );

    let ssh = AppConfig::get::<SshConfig>("ssh").unwrap();
    assert!(ssh.host.is_empty());
}

#[test]
#[serial]
fn verify_set() {
    initialize();

    AppConfig::set("log.level", "debug").unwrap();
    AppConfig::set("ssh.host", "nas.home.test").unwrap();
    AppConfig::set("sync.data_subdirs", vec!["Notes".to_string()]).unwrap();
    AppConfig::set("sync.allow_missing", true).unwrap();

    let config = AppConfig::fetch().unwrap();

    assert_eq!(config.log.level, "debug");
    assert!(config.ssh.enabled());
    assert_eq!(config.ssh.host, "nas.home.test");
    assert_eq!(config.sync.data_subdirs, vec!["Notes"]);
    assert!(config.sync.allow_missing);
}

#[test]
#[serial]
fn init_resets_previous_overrides() {
    initialize();
    AppConfig::set("log.level", "error").unwrap();

    initialize();
    assert_eq!(AppConfig::get::<String>("log.level").unwrap(), "info");
}

#[test]
#[serial]
fn missing_sections_use_defaults() {
    AppConfig::init(Some("[log]\nlevel = \"warn\"\nfile = false\n")).unwrap();

    let config = AppConfig::fetch().unwrap();
    assert_eq!(config.log.level, "warn");
    assert!(config.sync.data_subdirs.is_empty());
    assert_eq!(config.sync.timestamp_tolerance, 1);
    assert!(config.host.transfer_binary.is_empty());
    assert!(!config.ssh.enabled());
}

#[test]
#[serial]
fn merge_config_rejects_missing_file() {
    initialize();

    let err = AppConfig::merge_config(Some(std::path::Path::new(
        "/nonexistent/dirsync/config.toml",
    )))
    .unwrap_err();
    assert!(err.is_fatal_configuration());
}

#[test]
#[serial]
fn merge_config_overrides_defaults_and_set_wins() {
    initialize();

    let dir = tempfile::TempDir::new().unwrap();
    let user_config = dir.path().join("config.toml");
    std::fs::write(
        &user_config,
        "[sync]\nremote_base = \"/Volumes/Backup\"\ndata_subdirs = [\"Notes\"]\n",
    )
    .unwrap();

    AppConfig::merge_config(Some(&user_config)).unwrap();
    AppConfig::set("sync.remote_base", "/Volumes/Other").unwrap();

    let config = AppConfig::fetch().unwrap();
    assert_eq!(config.sync.data_subdirs, vec!["Notes"]);
    assert_eq!(config.sync.remote_base, "/Volumes/Other");
    // Untouched keys keep the defaults
    assert_eq!(config.sync.blob_subdirs, vec!["Music", "Movies"]);
}

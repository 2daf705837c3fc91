use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::RwLock;

use super::error::{Error, Result};

/// Prefix for environment overrides, e.g. `DIRSYNC__SSH__HOST=nas.home.test`.
pub const ENV_PREFIX: &str = "DIRSYNC";

lazy_static! {
    pub static ref BUILDER: RwLock<ConfigBuilder<DefaultState>> = RwLock::new(Config::builder());
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub level: String,
    /// Also write the log to `<dir>/dirsync.log`
    pub file: bool,
    /// Log directory; empty means `logs/` next to the executable
    #[serde(default)]
    pub dir: String,
}

/// Overrides for what the host probe would otherwise discover. Empty = autodetect.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub transfer_binary: String,
    pub ssh_binary: String,
    pub mount_root: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub local_base: String,
    pub remote_base: String,
    pub data_subdirs: Vec<String>,
    pub blob_subdirs: Vec<String>,
    pub exclude: Vec<String>,
    pub timestamp_tolerance: u32,
    pub allow_missing: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            local_base: String::new(),
            remote_base: String::new(),
            data_subdirs: Vec::new(),
            blob_subdirs: Vec::new(),
            exclude: Vec::new(),
            timestamp_tolerance: 1,
            allow_missing: false,
        }
    }
}

/// Secure-transport settings. Setting `host` switches the run to remote-shell mode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    pub host: String,
    pub key: String,
    pub uid: String,
}

impl SshConfig {
    pub fn enabled(&self) -> bool {
        !self.host.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    #[serde(default)]
    pub host: HostConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub ssh: SshConfig,
}

impl AppConfig {
    /// Reset the builder to the embedded defaults.
    pub fn init(default_config: Option<&str>) -> Result<()> {
        let mut builder = Config::builder();

        if let Some(config_contents) = default_config {
            builder = builder.add_source(File::from_str(config_contents, FileFormat::Toml));
        }

        let mut w = BUILDER.write()?;
        *w = builder;

        Ok(())
    }

    /// Layer `DIRSYNC__*` environment variables over everything added so far.
    pub fn merge_env() -> Result<()> {
        let env = Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("sync.data_subdirs")
            .with_list_parse_key("sync.blob_subdirs")
            .with_list_parse_key("sync.exclude");

        let mut w = BUILDER.write()?;
        *w = w.clone().add_source(env);

        Ok(())
    }

    /// Layer a user configuration file on top of the current sources.
    pub fn merge_config(config_file: Option<&Path>) -> Result<()> {
        if let Some(config_file_path) = config_file {
            if !config_file_path.is_file() {
                return Err(Error::configuration(format!(
                    "config file {} does not exist",
                    config_file_path.display()
                )));
            }

            let mut w = BUILDER.write()?;
            *w = w.clone().add_source(File::from(config_file_path).required(true));
        }

        Ok(())
    }

    /// Override a single key, e.g. `AppConfig::set("log.level", "debug")`.
    pub fn set<V>(key: &str, value: V) -> Result<()>
    where
        V: Into<config::Value>,
    {
        let mut w = BUILDER.write()?;
        *w = w.clone().set_override(key, value)?;

        Ok(())
    }

    pub fn get<'de, T>(key: &str) -> Result<T>
    where
        T: Deserialize<'de>,
    {
        Ok(BUILDER.read()?.clone().build()?.get::<T>(key)?)
    }

    pub fn fetch() -> Result<AppConfig> {
        let app_config: AppConfig = BUILDER.read()?.clone().build()?.try_deserialize()?;

        Ok(app_config)
    }
}

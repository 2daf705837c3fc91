use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use app::sync::Direction;
use utils::app_config::AppConfig;
use utils::error::Result;

mod commands;

#[derive(Parser)]
#[command(name = "dirsync", version)]
#[command(
    about = "Mirror named subdirectories between a local base and a mounted volume or SSH host",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (defaults to ~/.config/dirsync/config.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Set the logging level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send local subdirectories to the remote
    Push(SyncArgs),

    /// Fetch remote subdirectories into the local base
    Pull(SyncArgs),

    /// List volumes under the mount root and the one that would be picked
    Volumes {
        /// Subdirectory to look for (repeatable); defaults to the configured lists
        #[arg(short, long = "subdir", value_name = "NAME")]
        subdirs: Vec<String>,
    },

    /// Print the detected host profile as JSON
    Probe,
}

#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Local base directory; relative paths are taken under the home directory
    #[arg(long, value_name = "DIR")]
    pub local: Option<String>,

    /// Remote base directory (mounted path, or path on the SSH host)
    #[arg(long, value_name = "DIR")]
    pub remote: Option<String>,

    /// Remote host; switches to secure transport
    #[arg(long)]
    pub host: Option<String>,

    /// Private key path or file name under ~/.ssh
    #[arg(long)]
    pub key: Option<String>,

    /// Remote login identity (defaults to the local user)
    #[arg(long)]
    pub uid: Option<String>,

    /// Data subdirectories, comma separated
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub data: Vec<String>,

    /// Blob subdirectories, comma separated
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub blob: Vec<String>,

    /// Print the transfer commands instead of running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Do not treat missing subdirectories as a partial failure
    #[arg(long)]
    pub allow_missing: bool,
}

impl SyncArgs {
    /// Push command-line values into the configuration as overrides
    fn apply_overrides(&self) -> Result<()> {
        let scalars = [
            ("sync.local_base", &self.local),
            ("sync.remote_base", &self.remote),
            ("ssh.host", &self.host),
            ("ssh.key", &self.key),
            ("ssh.uid", &self.uid),
        ];
        for (key, value) in scalars {
            if let Some(value) = value {
                AppConfig::set(key, value.as_str())?;
            }
        }

        if !self.data.is_empty() {
            AppConfig::set("sync.data_subdirs", self.data.clone())?;
        }
        if !self.blob.is_empty() {
            AppConfig::set("sync.blob_subdirs", self.blob.clone())?;
        }
        if self.allow_missing {
            AppConfig::set("sync.allow_missing", true)?;
        }

        Ok(())
    }
}

fn default_user_config() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join("dirsync").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Layer config file, environment and global flags over the embedded defaults
fn load_config(cli: &Cli) -> Result<()> {
    let config_file = cli.config.clone().or_else(default_user_config);
    AppConfig::merge_config(config_file.as_deref())?;
    AppConfig::merge_env()?;

    if let Some(level) = &cli.log_level {
        AppConfig::set("log.level", level.as_str())?;
    }
    if let Commands::Push(args) | Commands::Pull(args) = &cli.command {
        args.apply_overrides()?;
    }

    Ok(())
}

pub async fn cli_match() -> Result<ExitCode> {
    let cli = Cli::parse();

    load_config(&cli)?;

    // Logging depends on the merged configuration
    let _guard = utils::logger::setup_logging()?;

    let code = match &cli.command {
        Commands::Push(args) => commands::sync_cmd(Direction::Push, args.dry_run).await?,
        Commands::Pull(args) => commands::sync_cmd(Direction::Pull, args.dry_run).await?,
        Commands::Volumes { subdirs } => commands::volumes_cmd(subdirs)?,
        Commands::Probe => commands::probe_cmd()?,
    };

    Ok(code)
}

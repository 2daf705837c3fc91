use std::process::ExitCode;

use app::executor::{DryRunExecutor, Executor, ProcessExecutor};
use app::options::OptionSettings;
use app::report::SyncReport;
use app::sync::{Direction, SyncJob, Synchronizer};
use storage::volume::{pick, VolumePolicy};
use storage::{list_volumes, HostProfile};
use utils::app_config::AppConfig;
use utils::error::{Error, Result};

fn host_profile(config: &AppConfig) -> HostProfile {
    HostProfile::detect().with_overrides(&config.host)
}

pub async fn sync_cmd(direction: Direction, dry_run: bool) -> Result<ExitCode> {
    let config = AppConfig::fetch()?;
    let profile = host_profile(&config);
    let quoting = profile.quote_style();

    let job = SyncJob::from_config(&profile, &config, direction);
    let settings = OptionSettings::from_config(&config.sync, quoting);

    let report = if dry_run {
        run(profile, job, &settings, DryRunExecutor::new(quoting)).await?
    } else {
        run(profile, job, &settings, ProcessExecutor::new(quoting)).await?
    };

    let code = report.exit_code(config.sync.allow_missing);
    if code != SyncReport::EXIT_OK {
        log::warn!("Completed with problems: {}", report.summary());
    }
    Ok(ExitCode::from(code))
}

async fn run<E: Executor>(
    profile: HostProfile, job: SyncJob, settings: &OptionSettings, executor: E,
) -> Result<SyncReport> {
    let mut synchronizer = Synchronizer::new(profile, job, settings, executor)?;

    let job = synchronizer.job();
    let remote = match job.remote_host() {
        Some(host) => format!("{}:{}", host, job.remote_base.as_deref().unwrap_or("")),
        None => job.remote_base.clone().unwrap_or_else(|| "<mounted volume>".to_string()),
    };
    log::info!(
        "[{}] {} {} <-> {} on {} as {}",
        synchronizer.executor().name(),
        job.direction,
        job.local_base.display(),
        remote,
        synchronizer.profile().os,
        synchronizer.profile().user
    );

    synchronizer.run().await
}

pub fn volumes_cmd(subdirs: &[String]) -> Result<ExitCode> {
    let config = AppConfig::fetch()?;
    let profile = host_profile(&config);

    let Some(mount_root) = profile.mount_root.as_deref() else {
        println!("No volume mount root on {}", profile.os);
        return Ok(ExitCode::SUCCESS);
    };

    let candidates: Vec<String> = if subdirs.is_empty() {
        config
            .sync
            .data_subdirs
            .iter()
            .chain(config.sync.blob_subdirs.iter())
            .cloned()
            .collect()
    } else {
        subdirs.to_vec()
    };

    let volumes = list_volumes(mount_root, &candidates);
    println!("Mount root: {}", mount_root.display());
    for volume in &volumes {
        println!(
            "  {:<24} {}/{}  {}",
            volume.name,
            volume.score,
            candidates.len(),
            volume.changed_local().format("%Y-%m-%d %H:%M:%S")
        );
    }

    match pick(&volumes, VolumePolicy::for_candidates(&candidates)) {
        Some(volume) => println!("Picked: {}", volume.path.display()),
        None => println!("Picked: none"),
    }

    Ok(ExitCode::SUCCESS)
}

pub fn probe_cmd() -> Result<ExitCode> {
    let config = AppConfig::fetch()?;
    let profile = host_profile(&config);

    let json = serde_json::to_string_pretty(&profile)
        .map_err(|e| Error::with_source("Failed to serialize host profile", Box::new(e)))?;
    println!("{}", json);

    Ok(ExitCode::SUCCESS)
}

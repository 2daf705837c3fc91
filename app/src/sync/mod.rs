//! 同步模块 - 遍历配置的子目录，逐个调用执行器
//!
//! 状态流转：Configured → Resolving → 每个子目录 → Done。
//! 单个子目录的跳过或失败只记入报告，不会中断整批；
//! 只有配置错误（缺私钥、缺传输工具、没有数据子目录）才会终止运行。

use std::path::{Path, PathBuf};

use crate::executor::{ensure_binary, Executor, TransferCommand, TransferStatus};
use crate::options::{build_blob_options, build_data_options, OptionSettings, SyncOptions};
use crate::report::{SubdirOutcome, SyncReport};
use crate::secure::{SecureTransport, SecureTransportSettings};
use storage::{guess_remote_base, HostProfile};
use utils::error::{Error, Result};

mod job;

pub use job::{Direction, SyncJob};

/// 源路径结尾的分隔符：传输工具据此复制目录内容而不是目录本身
const TRAILING_SEPARATOR: char = '/';

pub struct Synchronizer<E: Executor> {
    profile: HostProfile,
    job: SyncJob,
    data_options: SyncOptions,
    blob_options: SyncOptions,
    secure: Option<SecureTransport>,
    executor: E,
    /// 本次运行中已解析的远端根目录
    resolved_remote: Option<String>,
}

impl<E: Executor> Synchronizer<E> {
    /// 构造同步器。任务带有安全传输设置时立即解析私钥，失败即返回配置错误。
    pub fn new(profile: HostProfile, job: SyncJob, settings: &OptionSettings, executor: E) -> Result<Self> {
        let resolved_remote = job.remote_base.clone();
        let secure_settings = job.secure.clone();

        let mut synchronizer = Self {
            profile,
            job,
            data_options: build_data_options(settings),
            blob_options: build_blob_options(settings),
            secure: None,
            executor,
            resolved_remote,
        };

        if let Some(settings) = secure_settings {
            synchronizer.apply_secure_transport(&settings)?;
        }

        Ok(synchronizer)
    }

    /// 把远程 shell 子句合并进两个预设
    pub fn apply_secure_transport(&mut self, settings: &SecureTransportSettings) -> Result<()> {
        let transport = SecureTransport::resolve(&self.profile, settings)?;
        let clause = transport.shell_clause(self.profile.quote_style());

        self.data_options = self.data_options.with_secure_transport(&clause);
        self.blob_options = self.blob_options.with_secure_transport(&clause);
        self.job.secure = Some(settings.clone());
        self.secure = Some(transport);

        Ok(())
    }

    pub fn job(&self) -> &SyncJob {
        &self.job
    }

    pub fn profile(&self) -> &HostProfile {
        &self.profile
    }

    pub fn data_options(&self) -> &SyncOptions {
        &self.data_options
    }

    pub fn blob_options(&self) -> &SyncOptions {
        &self.blob_options
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// 按任务配置的方向运行
    pub async fn run(&mut self) -> Result<SyncReport> {
        let direction = self.job.direction;
        self.synchronize_all(direction).await
    }

    /// 先同步数据子目录，再同步大文件子目录
    pub async fn synchronize_all(&mut self, direction: Direction) -> Result<SyncReport> {
        if self.job.data_subdirs.is_empty() {
            return Err(Error::configuration("no data subdirectories configured"));
        }
        ensure_binary(&self.profile.transfer_binary)?;

        // 挂载状态可能在两次运行之间变化，每次重新解析
        self.resolved_remote = self.job.remote_base.clone();

        log::info!(
            "Starting {} of {} with {} executor",
            direction,
            self.job.local_base.display(),
            self.executor.name()
        );

        let mut report = SyncReport::new();

        let data_subdirs = self.job.data_subdirs.clone();
        let data_options = self.data_options.clone();
        self.synchronize_subdir_list(&data_subdirs, &data_options, direction, &mut report)
            .await;

        if !self.job.blob_subdirs.is_empty() {
            let blob_subdirs = self.job.blob_subdirs.clone();
            let blob_options = self.blob_options.clone();
            self.synchronize_subdir_list(&blob_subdirs, &blob_options, direction, &mut report)
                .await;
        }

        log::info!("Synchronization finished: {}", report.summary());
        Ok(report)
    }

    /// 以 `options` 为当前生效选项集，逐个处理子目录
    pub async fn synchronize_subdir_list(
        &mut self, subdirs: &[String], options: &SyncOptions, direction: Direction,
        report: &mut SyncReport,
    ) {
        let preset = options.preset();

        for name in subdirs {
            let local_path = self.job.local_base.join(name);
            if !local_path.is_dir() {
                log::warn!("[{}] {}: skipped, missing locally at {}", preset, name, local_path.display());
                report.record(preset, name, SubdirOutcome::SkippedMissingLocal);
                continue;
            }

            let Some(remote_base) = self.resolve_remote_base(subdirs) else {
                log::warn!("[{}] {}: skipped, no remote target", preset, name);
                report.record(preset, name, SubdirOutcome::SkippedNoRemoteTarget);
                continue;
            };

            let remote_path = match &self.secure {
                Some(transport) => transport.remote_path(&remote_base, name),
                None => {
                    let mounted = Path::new(&remote_base).join(name);
                    if direction == Direction::Pull && !mounted.is_dir() {
                        log::warn!("[{}] {}: skipped, missing remotely at {}", preset, name, mounted.display());
                        report.record(preset, name, SubdirOutcome::SkippedMissingRemote);
                        continue;
                    }
                    mounted.to_string_lossy().into_owned()
                }
            };

            let outcome = match self.synchronize(&local_path, &remote_path, direction, options).await {
                TransferStatus::Success => {
                    log::info!("[{}] {}: done", preset, name);
                    SubdirOutcome::Transferred
                }
                TransferStatus::Failed(code) => SubdirOutcome::Failed {
                    command: self
                        .transfer_command(&local_path, &remote_path, direction, options)
                        .command_line(self.profile.quote_style()),
                    code,
                },
            };
            report.record(preset, name, outcome);
        }
    }

    /// 同步一对路径，按方向决定源和目标
    pub async fn synchronize(
        &self, local: &Path, remote: &str, direction: Direction, options: &SyncOptions,
    ) -> TransferStatus {
        let command = self.transfer_command(local, remote, direction, options);
        let status = self.executor.run(&command).await;

        if let TransferStatus::Failed(code) = status {
            log::error!(
                "Transfer failed (exit code {}): {}",
                code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()),
                command.command_line(self.profile.quote_style())
            );
        }
        status
    }

    /// 构造传输命令；源路径带结尾分隔符，目标路径不带
    pub fn transfer_command(
        &self, local: &Path, remote: &str, direction: Direction, options: &SyncOptions,
    ) -> TransferCommand {
        let local = local.to_string_lossy().into_owned();
        let (source, destination) = match direction {
            Direction::Push => (local, remote.to_string()),
            Direction::Pull => (remote.to_string(), local),
        };

        TransferCommand {
            binary: self.profile.transfer_binary.clone(),
            options: options.flag_string(),
            source: with_trailing_separator(&source),
            destination: destination.trim_end_matches(TRAILING_SEPARATOR).to_string(),
        }
    }

    /// 远端根目录：已配置的直接使用；安全传输下默认远端主目录；否则猜测挂载卷
    fn resolve_remote_base(&mut self, candidates: &[String]) -> Option<String> {
        if let Some(base) = &self.resolved_remote {
            return Some(base.clone());
        }

        let resolved = if self.secure.is_some() {
            Some(String::new())
        } else {
            self.profile
                .mount_root
                .as_deref()
                .and_then(|root| guess_remote_base(root, candidates))
                .map(|path: PathBuf| path.to_string_lossy().into_owned())
        };

        if let Some(base) = &resolved {
            log::info!("Remote base resolved to '{}'", base);
            self.resolved_remote = Some(base.clone());
        }
        resolved
    }
}

fn with_trailing_separator(path: &str) -> String {
    if path.ends_with(TRAILING_SEPARATOR) {
        path.to_string()
    } else {
        format!("{}{}", path, TRAILING_SEPARATOR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_separator_added_once() {
        assert_eq!(with_trailing_separator("/home/u/Docs"), "/home/u/Docs/");
        assert_eq!(with_trailing_separator("/home/u/Docs/"), "/home/u/Docs/");
        assert_eq!(with_trailing_separator("nas:Music"), "nas:Music/");
    }
}

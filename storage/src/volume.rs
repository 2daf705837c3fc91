//! 卷解析 - 在挂载根目录下挑选最可能的远端卷
//!
//! 两种策略：
//! - 最近挂载：按状态变更时间排序，取最新的一个
//! - 最佳匹配：统计每个卷下存在多少个目标子目录，取得分最高的一个
//!
//! 同分时按卷名字典序取第一个，结果与目录枚举顺序无关。

use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// 选卷策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumePolicy {
    MostRecent,
    BestMatch,
}

impl VolumePolicy {
    /// 有候选子目录时用最佳匹配，否则用最近挂载
    pub fn for_candidates(candidates: &[String]) -> Self {
        if candidates.is_empty() {
            VolumePolicy::MostRecent
        } else {
            VolumePolicy::BestMatch
        }
    }
}

/// 挂载根目录下的一个卷
#[derive(Debug, Clone)]
pub struct VolumeCandidate {
    pub name: String,
    pub path: PathBuf,
    /// 最后状态变更时间（非 Unix 平台用修改时间代替）
    pub changed: SystemTime,
    /// 存在的目标子目录数量
    pub score: usize,
}

impl VolumeCandidate {
    pub fn changed_local(&self) -> DateTime<Local> {
        DateTime::<Local>::from(self.changed)
    }
}

/// 列出挂载根目录下的所有卷（只含目录），按名称排序
///
/// 根目录不存在或不可读时返回空列表。
pub fn list_volumes(mount_root: &Path, candidates: &[String]) -> Vec<VolumeCandidate> {
    let entries = match fs::read_dir(mount_root) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Cannot read mount root {}: {}", mount_root.display(), e);
            return Vec::new();
        }
    };

    let mut volumes: Vec<VolumeCandidate> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            // 跟随符号链接，macOS 的启动卷就是一个链接
            let metadata = fs::metadata(&path).ok()?;
            if !metadata.is_dir() {
                return None;
            }

            let score = candidates
                .iter()
                .filter(|name| path.join(name.as_str()).is_dir())
                .count();

            Some(VolumeCandidate {
                name: entry.file_name().to_string_lossy().into_owned(),
                changed: status_changed(&metadata),
                path,
                score,
            })
        })
        .collect();

    volumes.sort_by(|a, b| a.name.cmp(&b.name));
    volumes
}

/// 猜测远端根目录。找不到合适的卷时返回 None，由调用方跳过对应子目录。
pub fn guess_remote_base(mount_root: &Path, candidates: &[String]) -> Option<PathBuf> {
    let volumes = list_volumes(mount_root, candidates);
    let picked = pick(&volumes, VolumePolicy::for_candidates(candidates))?;

    log::info!(
        "Guessed remote volume {} (matched {}/{} subdirectories)",
        picked.path.display(),
        picked.score,
        candidates.len()
    );
    Some(picked.path.clone())
}

/// 在已列出的卷中按策略选择
pub fn pick(volumes: &[VolumeCandidate], policy: VolumePolicy) -> Option<&VolumeCandidate> {
    match policy {
        VolumePolicy::MostRecent => volumes
            .iter()
            .max_by(|a, b| a.changed.cmp(&b.changed).then_with(|| b.name.cmp(&a.name))),
        VolumePolicy::BestMatch => volumes
            .iter()
            .filter(|v| v.score > 0)
            .max_by(|a, b| a.score.cmp(&b.score).then_with(|| b.name.cmp(&a.name))),
    }
}

#[cfg(unix)]
fn status_changed(metadata: &fs::Metadata) -> SystemTime {
    use std::os::unix::fs::MetadataExt;
    use std::time::Duration;

    let secs = metadata.ctime();
    let nanos = metadata.ctime_nsec().clamp(0, 999_999_999) as u32;
    if secs >= 0 {
        SystemTime::UNIX_EPOCH + Duration::new(secs as u64, nanos)
    } else {
        SystemTime::UNIX_EPOCH
    }
}

#[cfg(not(unix))]
fn status_changed(metadata: &fs::Metadata) -> SystemTime {
    metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH)
}

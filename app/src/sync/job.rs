use std::path::PathBuf;

use crate::secure::SecureTransportSettings;
use storage::HostProfile;
use utils::app_config::AppConfig;

/// 传输方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// 本地 → 远端
    Push,
    /// 远端 → 本地
    Pull,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Push => write!(f, "push"),
            Direction::Pull => write!(f, "pull"),
        }
    }
}

/// 同步任务，配置阶段构造，运行期间只读
#[derive(Debug, Clone)]
pub struct SyncJob {
    pub local_base: PathBuf,
    /// None 表示未解析；安全传输下空字符串表示远端主目录
    pub remote_base: Option<String>,
    /// 设置后通过远程 shell 传输
    pub secure: Option<SecureTransportSettings>,
    pub data_subdirs: Vec<String>,
    pub blob_subdirs: Vec<String>,
    pub direction: Direction,
}

impl SyncJob {
    pub fn new(local_base: impl Into<PathBuf>, direction: Direction) -> Self {
        Self {
            local_base: local_base.into(),
            remote_base: None,
            secure: None,
            data_subdirs: Vec::new(),
            blob_subdirs: Vec::new(),
            direction,
        }
    }

    /// 从配置构造任务，本地路径按主机主目录规范化
    pub fn from_config(profile: &HostProfile, config: &AppConfig, direction: Direction) -> Self {
        let mut job = SyncJob::new(PathBuf::new(), direction)
            .with_data_subdirs(config.sync.data_subdirs.clone())
            .with_blob_subdirs(config.sync.blob_subdirs.clone());
        job.set_local_base(profile, &config.sync.local_base);

        let remote_base = config.sync.remote_base.trim();
        if !remote_base.is_empty() {
            job.remote_base = Some(remote_base.to_string());
        }
        job.secure = SecureTransportSettings::from_config(&config.ssh);
        job
    }

    /// 相对路径放到主目录下，绝对路径原样保留
    pub fn set_local_base(&mut self, profile: &HostProfile, input: &str) {
        self.local_base = profile.resolve_local_path(input);
    }

    pub fn with_remote_base(mut self, remote_base: impl Into<String>) -> Self {
        self.remote_base = Some(remote_base.into());
        self
    }

    pub fn with_secure_transport(mut self, settings: SecureTransportSettings) -> Self {
        self.secure = Some(settings);
        self
    }

    pub fn with_data_subdirs<I, S>(mut self, subdirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.data_subdirs = clean_names(subdirs);
        self
    }

    pub fn with_blob_subdirs<I, S>(mut self, subdirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blob_subdirs = clean_names(subdirs);
        self
    }

    pub fn remote_host(&self) -> Option<&str> {
        self.secure.as_ref().map(|s| s.host.as_str())
    }
}

fn clean_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names
        .into_iter()
        .map(|name| name.into().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

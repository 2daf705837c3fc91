//! 安全传输 - 私钥解析与远程 shell 子句
//!
//! 私钥按以下顺序查找，找不到即终止整个运行：
//! 1. 设置中给出的绝对路径
//! 2. 设置中给出的文件名，在默认密钥目录下查找
//! 3. 主机的默认私钥

use std::path::{Path, PathBuf};
use storage::{HostProfile, QuoteStyle};
use utils::app_config::SshConfig;
use utils::error::{Error, Result};

/// 用户给出的安全传输设置
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecureTransportSettings {
    pub host: String,
    pub key: Option<String>,
    pub uid: Option<String>,
}

impl SecureTransportSettings {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Default::default()
        }
    }

    /// 配置中 `ssh.host` 为空时返回 None
    pub fn from_config(config: &SshConfig) -> Option<Self> {
        if !config.enabled() {
            return None;
        }

        Some(Self {
            host: config.host.trim().to_string(),
            key: non_empty(&config.key),
            uid: non_empty(&config.uid),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// 已解析的安全传输参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecureTransport {
    pub host: String,
    pub ssh_binary: PathBuf,
    pub key: PathBuf,
    pub uid: String,
}

impl SecureTransport {
    /// 解析私钥与登录身份。缺少 ssh 工具或私钥都是配置错误。
    pub fn resolve(profile: &HostProfile, settings: &SecureTransportSettings) -> Result<Self> {
        if settings.host.trim().is_empty() {
            return Err(Error::configuration("secure transport requires a remote host"));
        }
        if !profile.has_ssh_binary() {
            return Err(Error::configuration("secure-shell executable not found"));
        }

        let key = resolve_private_key(profile, settings.key.as_deref())?;
        let uid = settings.uid.clone().unwrap_or_else(|| profile.user.clone());

        log::debug!("Using private key {} for {}@{}", key.display(), uid, settings.host);

        Ok(Self {
            host: settings.host.trim().to_string(),
            ssh_binary: profile.ssh_binary.clone(),
            key,
            uid,
        })
    }

    /// 传输工具的远程 shell 参数，整个子句作为一个参数传入
    ///
    /// 子句内部的各部分按 POSIX 规则转义，传输工具自己会拆分它。
    pub fn shell_clause(&self, quoting: QuoteStyle) -> String {
        let inner = [
            QuoteStyle::Posix.quote(&self.ssh_binary.to_string_lossy()),
            "-i".to_string(),
            QuoteStyle::Posix.quote(&self.key.to_string_lossy()),
            "-l".to_string(),
            QuoteStyle::Posix.quote(&self.uid),
        ]
        .join(" ");

        format!("-e {}", quoting.quote(&inner))
    }

    /// `host:name`，或 `host:base/name`；空 base 表示远端主目录
    pub fn remote_path(&self, remote_base: &str, name: &str) -> String {
        remote_path(&self.host, remote_base, name)
    }
}

pub fn remote_path(host: &str, remote_base: &str, name: &str) -> String {
    if remote_base.is_empty() {
        return format!("{}:{}", host, name);
    }

    // 根目录不能被裁成空串，否则会变成远端家目录
    let base = remote_base.trim_end_matches('/');
    if base.is_empty() {
        format!("{}:/{}", host, name)
    } else {
        format!("{}:{}/{}", host, base, name)
    }
}

/// 按优先顺序查找可用的私钥
pub fn resolve_private_key(profile: &HostProfile, key: Option<&str>) -> Result<PathBuf> {
    if let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) {
        let given = Path::new(key);
        if given.is_absolute() && given.is_file() {
            return Ok(given.to_path_buf());
        }

        let in_key_dir = profile.key_dir.join(key);
        if in_key_dir.is_file() {
            return Ok(in_key_dir);
        }

        log::warn!("Private key {} not found, trying the default key", key);
    }

    if profile.default_key.is_file() {
        return Ok(profile.default_key.clone());
    }

    Err(Error::configuration("no usable private key found"))
}

//! 主机探测 - 操作系统、用户、外部工具路径以及卷挂载根目录
//!
//! 所有环境查询都集中在 [`HostProfile::detect`] 中完成，下游组件只接收
//! 构造好的 `HostProfile`，不再直接读取环境。

use serde::Serialize;
use std::path::{Path, PathBuf};
use utils::app_config::HostConfig;

/// 默认私钥文件名，按优先顺序排列
const DEFAULT_KEY_NAMES: [&str; 3] = ["id_ed25519", "id_ecdsa", "id_rsa"];

/// 操作系统类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OsFamily {
    Mac,
    Linux,
    Cygwin,
    Windows,
    Unknown,
}

impl OsFamily {
    /// 当前运行平台
    pub fn current() -> Self {
        let ostype = std::env::var("OSTYPE").ok();
        Self::from_os_name(std::env::consts::OS, ostype.as_deref())
    }

    /// 根据 `std::env::consts::OS` 和 shell 导出的 `OSTYPE` 判断平台
    pub fn from_os_name(os: &str, ostype: Option<&str>) -> Self {
        match os {
            "macos" => OsFamily::Mac,
            "linux" => OsFamily::Linux,
            "cygwin" => OsFamily::Cygwin,
            "windows" if ostype.is_some_and(|t| t.starts_with("cygwin")) => OsFamily::Cygwin,
            "windows" => OsFamily::Windows,
            _ => OsFamily::Unknown,
        }
    }

    /// 该平台的查找表，平台相关的分支只出现在这里
    fn traits(self) -> OsTraits {
        match self {
            OsFamily::Mac => OsTraits {
                mount_roots: &["/Volumes"],
                quoting: QuoteStyle::Posix,
            },
            OsFamily::Linux => OsTraits {
                mount_roots: &["/media/{user}", "/run/media/{user}", "/media"],
                quoting: QuoteStyle::Posix,
            },
            OsFamily::Cygwin => OsTraits {
                mount_roots: &["/cygdrive"],
                quoting: QuoteStyle::Posix,
            },
            OsFamily::Windows => OsTraits {
                mount_roots: &[],
                quoting: QuoteStyle::Windows,
            },
            OsFamily::Unknown => OsTraits {
                mount_roots: &[],
                quoting: QuoteStyle::Posix,
            },
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsFamily::Mac => write!(f, "mac"),
            OsFamily::Linux => write!(f, "linux"),
            OsFamily::Cygwin => write!(f, "cygwin"),
            OsFamily::Windows => write!(f, "windows"),
            OsFamily::Unknown => write!(f, "unknown"),
        }
    }
}

struct OsTraits {
    mount_roots: &'static [&'static str],
    quoting: QuoteStyle,
}

/// 命令行参数的转义方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// `sh -c` 单引号转义
    Posix,
    /// `cmd /C` 双引号转义
    Windows,
}

impl QuoteStyle {
    /// 转义单个参数；不含特殊字符的参数原样返回
    pub fn quote(self, arg: &str) -> String {
        match self {
            QuoteStyle::Posix => {
                if !arg.is_empty() && arg.chars().all(is_posix_safe) {
                    return arg.to_string();
                }
                format!("'{}'", arg.replace('\'', r"'\''"))
            }
            QuoteStyle::Windows => {
                if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || "\"&|<>^%".contains(c)) {
                    return arg.to_string();
                }
                let mut escaped = arg.replace('"', "\\\"");
                // 结尾的反斜杠会吞掉闭合引号
                if escaped.ends_with('\\') {
                    escaped.push('\\');
                }
                format!("\"{}\"", escaped)
            }
        }
    }

    /// 执行一行命令所用的 shell 及其参数
    pub fn shell(self) -> (&'static str, &'static str) {
        match self {
            QuoteStyle::Posix => ("sh", "-c"),
            QuoteStyle::Windows => ("cmd", "/C"),
        }
    }
}

fn is_posix_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-./:@,+=%^".contains(c)
}

/// 主机信息，每次运行构造一次，之后只读
#[derive(Debug, Clone, Serialize)]
pub struct HostProfile {
    pub os: OsFamily,
    pub user: String,
    pub home: PathBuf,
    /// 传输工具路径，未安装时为空
    pub transfer_binary: PathBuf,
    /// 安全外壳工具路径，未安装时为空
    pub ssh_binary: PathBuf,
    pub key_dir: PathBuf,
    pub default_key: PathBuf,
    /// 可移动卷的挂载根目录，平台不支持时为 None
    pub mount_root: Option<PathBuf>,
}

impl HostProfile {
    /// 探测当前环境。从不失败：找不到的工具返回空路径，未知平台没有挂载根目录。
    pub fn detect() -> Self {
        let os = OsFamily::current();
        let user = whoami::username();
        let home = dirs::home_dir().unwrap_or_default();

        let profile = Self::for_environment(os, &user, &home);
        HostProfile {
            transfer_binary: which::which("rsync").unwrap_or_default(),
            ssh_binary: which::which("ssh").unwrap_or_default(),
            ..profile
        }
    }

    /// 构造不含工具路径的主机信息
    pub fn for_environment(os: OsFamily, user: &str, home: &Path) -> Self {
        let key_dir = home.join(".ssh");
        let default_key = DEFAULT_KEY_NAMES
            .iter()
            .map(|name| key_dir.join(name))
            .find(|path| path.is_file())
            .unwrap_or_else(|| key_dir.join("id_rsa"));

        HostProfile {
            os,
            user: user.to_string(),
            home: home.to_path_buf(),
            transfer_binary: PathBuf::new(),
            ssh_binary: PathBuf::new(),
            key_dir,
            default_key,
            mount_root: Self::mount_root_for(os, user),
        }
    }

    /// 第一个存在的候选挂载根目录；都不存在时取第一个候选
    fn mount_root_for(os: OsFamily, user: &str) -> Option<PathBuf> {
        let candidates: Vec<PathBuf> = os
            .traits()
            .mount_roots
            .iter()
            .map(|root| PathBuf::from(root.replace("{user}", user)))
            .collect();

        candidates
            .iter()
            .find(|root| root.is_dir())
            .or_else(|| candidates.first())
            .cloned()
    }

    /// 应用配置文件中的覆盖项，空字符串表示保持探测结果
    pub fn with_overrides(mut self, overrides: &HostConfig) -> Self {
        if !overrides.transfer_binary.trim().is_empty() {
            self.transfer_binary = PathBuf::from(overrides.transfer_binary.trim());
        }
        if !overrides.ssh_binary.trim().is_empty() {
            self.ssh_binary = PathBuf::from(overrides.ssh_binary.trim());
        }
        if !overrides.mount_root.trim().is_empty() {
            self.mount_root = Some(PathBuf::from(overrides.mount_root.trim()));
        }
        self
    }

    pub fn quote_style(&self) -> QuoteStyle {
        self.os.traits().quoting
    }

    pub fn has_transfer_binary(&self) -> bool {
        !self.transfer_binary.as_os_str().is_empty()
    }

    pub fn has_ssh_binary(&self) -> bool {
        !self.ssh_binary.as_os_str().is_empty()
    }

    /// 把用户输入的本地路径规范化：相对路径和 `~` 都放到主目录下
    pub fn resolve_local_path(&self, input: &str) -> PathBuf {
        let input = input.trim();
        if input.is_empty() || input == "~" {
            return self.home.clone();
        }
        if let Some(rest) = input.strip_prefix("~/") {
            return self.home.join(rest);
        }

        let path = Path::new(input);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home.join(path)
        }
    }
}

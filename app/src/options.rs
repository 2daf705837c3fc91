//! 传输选项集 - 按类别组织的传输工具命令行参数
//!
//! `data` 预设会删除目标端多余文件；`blob` 预设不删除，只按大小比较，
//! 避免大文件仅因时间戳变化而被重新传输。选项集是不可变值，
//! 加入安全传输子句会返回新的选项集。

use std::collections::BTreeMap;
use storage::QuoteStyle;
use utils::app_config::SyncConfig;

pub const STANDARD_FLAGS: &str = "-rltv";
pub const DELETE_FLAG: &str = "--delete";
pub const SIZE_ONLY_FLAG: &str = "--size-only";

/// 选项类别，声明顺序就是命令行中的顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OptionCategory {
    /// 递归、保留链接与时间戳、输出详情
    Standard,
    /// 时间戳容差（FAT 卷只有 2 秒精度）
    TimestampTolerance,
    /// 删除目标端多余文件
    Deletion,
    /// 只按大小比较
    SizeOnly,
    Exclude,
    /// 远程 shell 子句
    SecureTransport,
}

/// 预设名称
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Data,
    Blob,
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Data => write!(f, "data"),
            Preset::Blob => write!(f, "blob"),
        }
    }
}

/// 构造预设所需的可配置项
#[derive(Debug, Clone)]
pub struct OptionSettings {
    /// 秒，0 表示不加容差参数
    pub timestamp_tolerance: u32,
    pub exclude: Vec<String>,
    pub quoting: QuoteStyle,
}

impl Default for OptionSettings {
    fn default() -> Self {
        Self {
            timestamp_tolerance: 1,
            exclude: Vec::new(),
            quoting: QuoteStyle::Posix,
        }
    }
}

impl OptionSettings {
    pub fn from_config(config: &SyncConfig, quoting: QuoteStyle) -> Self {
        Self {
            timestamp_tolerance: config.timestamp_tolerance,
            exclude: config
                .exclude
                .iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            quoting,
        }
    }
}

/// 一个预设的完整选项集
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    preset: Preset,
    entries: BTreeMap<OptionCategory, String>,
}

impl SyncOptions {
    fn base(preset: Preset, settings: &OptionSettings) -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(OptionCategory::Standard, STANDARD_FLAGS.to_string());

        if !settings.exclude.is_empty() {
            let excludes = settings
                .exclude
                .iter()
                .map(|pattern| format!("--exclude={}", settings.quoting.quote(pattern)))
                .collect::<Vec<_>>()
                .join(" ");
            entries.insert(OptionCategory::Exclude, excludes);
        }

        Self { preset, entries }
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn get(&self, category: OptionCategory) -> Option<&str> {
        self.entries.get(&category).map(String::as_str)
    }

    pub fn contains(&self, category: OptionCategory) -> bool {
        self.entries.contains_key(&category)
    }

    /// 返回设置（或覆盖）了某个类别的新选项集
    pub fn with_entry(&self, category: OptionCategory, flags: impl Into<String>) -> Self {
        let mut options = self.clone();
        options.entries.insert(category, flags.into());
        options
    }

    /// 合并安全传输子句，原选项集不变
    pub fn with_secure_transport(&self, clause: &str) -> Self {
        self.with_entry(OptionCategory::SecureTransport, clause)
    }

    /// 按类别顺序拼接的参数串
    pub fn flag_string(&self) -> String {
        self.entries
            .values()
            .filter(|flags| !flags.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn build_data_options(settings: &OptionSettings) -> SyncOptions {
    let options = SyncOptions::base(Preset::Data, settings);
    let options = if settings.timestamp_tolerance > 0 {
        options.with_entry(
            OptionCategory::TimestampTolerance,
            format!("--modify-window={}", settings.timestamp_tolerance),
        )
    } else {
        options
    };
    options.with_entry(OptionCategory::Deletion, DELETE_FLAG)
}

pub fn build_blob_options(settings: &OptionSettings) -> SyncOptions {
    SyncOptions::base(Preset::Blob, settings).with_entry(OptionCategory::SizeOnly, SIZE_ONLY_FLAG)
}

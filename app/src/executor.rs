//! 执行器 - 拼出传输工具的命令行并作为子进程运行
//!
//! 子进程继承标准输出和标准错误，只关心退出状态。工具缺失或崩溃都算普通失败，
//! 不会变成编排层的错误。

use std::path::{Path, PathBuf};
use storage::QuoteStyle;
use tokio::process::Command;
use utils::error::{Error, Result};

/// 一次传输调用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCommand {
    pub binary: PathBuf,
    pub options: String,
    /// 带结尾分隔符的源路径
    pub source: String,
    pub destination: String,
}

impl TransferCommand {
    /// 用单个空格连接四个部分；路径逐个转义，选项串原样保留
    pub fn command_line(&self, quoting: QuoteStyle) -> String {
        let binary = quoting.quote(&self.binary.to_string_lossy());
        let source = quoting.quote(&self.source);
        let destination = quoting.quote(&self.destination);

        [binary.as_str(), self.options.as_str(), source.as_str(), destination.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 传输结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Success,
    /// 非零退出码；被信号终止或无法启动时为 None
    Failed(Option<i32>),
}

impl TransferStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferStatus::Success)
    }
}

/// 执行器 trait - 运行一条传输命令
#[async_trait::async_trait]
pub trait Executor: Send + Sync {
    async fn run(&self, command: &TransferCommand) -> TransferStatus;

    fn name(&self) -> &'static str;
}

/// 批处理开始前检查一次传输工具路径
pub fn ensure_binary(binary: &Path) -> Result<()> {
    if binary.as_os_str().is_empty() {
        return Err(Error::configuration("transfer executable not found"));
    }
    Ok(())
}

/// 把整行命令交给主机 shell
///
/// cmd.exe 不认识 `\"` 转义，Windows 下整行必须原样传入。
fn shell_command(quoting: QuoteStyle, line: &str) -> Command {
    let (shell, flag) = quoting.shell();
    let mut cmd = Command::new(shell);
    cmd.arg(flag);
    match quoting {
        #[cfg(windows)]
        QuoteStyle::Windows => {
            cmd.raw_arg(line);
        }
        _ => {
            cmd.arg(line);
        }
    }
    cmd
}

/// 通过主机 shell 真正运行传输工具
pub struct ProcessExecutor {
    quoting: QuoteStyle,
}

impl ProcessExecutor {
    pub fn new(quoting: QuoteStyle) -> Self {
        Self { quoting }
    }
}

#[async_trait::async_trait]
impl Executor for ProcessExecutor {
    async fn run(&self, command: &TransferCommand) -> TransferStatus {
        let line = command.command_line(self.quoting);
        let (shell, flag) = self.quoting.shell();
        log::debug!("[{}] {} {} {}", self.name(), shell, flag, line);

        match shell_command(self.quoting, &line).status().await {
            Ok(status) if status.success() => TransferStatus::Success,
            Ok(status) => TransferStatus::Failed(status.code()),
            Err(e) => {
                log::error!("Failed to spawn {}: {}", shell, e);
                TransferStatus::Failed(None)
            }
        }
    }

    fn name(&self) -> &'static str {
        "process"
    }
}

/// 只打印命令行，不运行
pub struct DryRunExecutor {
    quoting: QuoteStyle,
}

impl DryRunExecutor {
    pub fn new(quoting: QuoteStyle) -> Self {
        Self { quoting }
    }
}

#[async_trait::async_trait]
impl Executor for DryRunExecutor {
    async fn run(&self, command: &TransferCommand) -> TransferStatus {
        println!("{}", command.command_line(self.quoting));
        TransferStatus::Success
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(source: &str, destination: &str) -> TransferCommand {
        TransferCommand {
            binary: PathBuf::from("/usr/bin/rsync"),
            options: "-rltv --delete".to_string(),
            source: source.to_string(),
            destination: destination.to_string(),
        }
    }

    #[test]
    fn joins_parts_with_single_spaces() {
        let cmd = command("/home/u/Docs/", "/Volumes/USB/Docs");
        assert_eq!(
            cmd.command_line(QuoteStyle::Posix),
            "/usr/bin/rsync -rltv --delete /home/u/Docs/ /Volumes/USB/Docs"
        );
    }

    #[test]
    fn paths_are_quoted_individually() {
        let cmd = command("/home/u/My Docs/", "/Volumes/Backup Disk/My Docs");
        assert_eq!(
            cmd.command_line(QuoteStyle::Posix),
            "/usr/bin/rsync -rltv --delete '/home/u/My Docs/' '/Volumes/Backup Disk/My Docs'"
        );
    }

    #[test]
    fn empty_options_leave_no_double_space() {
        let mut cmd = command("/a/", "/b");
        cmd.options.clear();
        assert_eq!(cmd.command_line(QuoteStyle::Posix), "/usr/bin/rsync /a/ /b");
    }

    #[cfg(unix)]
    #[test]
    fn posix_line_is_one_shell_argument() {
        let line = command("/home/u/My Docs/", "/b").command_line(QuoteStyle::Posix);
        let cmd = shell_command(QuoteStyle::Posix, &line);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "sh");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, vec![std::ffi::OsStr::new("-c"), std::ffi::OsStr::new(&line)]);
    }

    #[cfg(windows)]
    #[test]
    fn windows_line_keeps_double_quotes() {
        let line = command("C:\\My Data\\", "D:\\Backup").command_line(QuoteStyle::Windows);
        assert!(line.contains("\"C:\\My Data\\\\\""));

        let cmd = shell_command(QuoteStyle::Windows, &line);
        assert_eq!(cmd.as_std().get_program(), "cmd");
    }

    #[test]
    fn empty_binary_is_rejected() {
        assert!(ensure_binary(Path::new("")).unwrap_err().is_fatal_configuration());
        assert!(ensure_binary(Path::new("/usr/bin/rsync")).is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_executor_reports_exit_status() {
        let executor = ProcessExecutor::new(QuoteStyle::Posix);

        let ok = TransferCommand {
            binary: PathBuf::from("true"),
            options: String::new(),
            source: "/a/".to_string(),
            destination: "/b".to_string(),
        };
        assert_eq!(executor.run(&ok).await, TransferStatus::Success);

        let failing = TransferCommand {
            binary: PathBuf::from("false"),
            ..ok.clone()
        };
        assert_eq!(executor.run(&failing).await, TransferStatus::Failed(Some(1)));

        let missing = TransferCommand {
            binary: PathBuf::from("/nonexistent/dirsync-transfer-tool"),
            ..ok
        };
        assert!(!executor.run(&missing).await.is_success());
    }
}

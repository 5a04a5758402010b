use crate::tools::FfmpegCommand;
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::io::Read;
use std::process::{Child, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// 執行外部轉檔工具的能力
///
/// 非零結束碼、無法啟動與逾時皆回傳 `Err`；測試以自訂實作模擬工具
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &FfmpegCommand) -> Result<ToolOutput>;
}

/// 以子行程執行命令，超過 `timeout` 即終止
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner {
    timeout: Option<Duration>,
}

impl SystemCommandRunner {
    #[must_use]
    pub const fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, command: &FfmpegCommand) -> Result<ToolOutput> {
        debug!(
            "執行 {} ({}): {}",
            command.program(),
            command.operation(),
            command
                .args()
                .iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );

        let mut child = command
            .build_command()
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法啟動 {}", command.program()))?;

        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let status = wait_with_timeout(&mut child, self.timeout)
            .with_context(|| format!("等待 {} 結束失敗", command.program()))?;

        let output = ToolOutput {
            stdout: join_reader(stdout_reader),
            stderr: join_reader(stderr_reader),
        };

        match status {
            Some(status) if status.success() => Ok(output),
            Some(status) => bail!(
                "{} {} 失敗 ({status}): {}",
                command.program(),
                command.operation(),
                output.stderr.trim()
            ),
            None => bail!(
                "{} {} 逾時（{} 秒）",
                command.program(),
                command.operation(),
                self.timeout.map_or(0, |t| t.as_secs())
            ),
        }
    }
}

/// 回傳 `Ok(None)` 表示逾時並已終止子行程
fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> Result<Option<ExitStatus>> {
    let Some(timeout) = timeout else {
        return Ok(Some(child.wait()?));
    };

    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                warn!("無法終止逾時的行程 [{}]: {e}", child.id());
            }
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn spawn_reader<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = stream.read_to_end(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    })
}

fn join_reader(reader: Option<JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::tools::ToolOperation;

    #[test]
    fn test_successful_command_captures_stdout() {
        let runner = SystemCommandRunner::new(Some(Duration::from_secs(10)));
        let cmd = FfmpegCommand::raw("sh", &["-c", "echo hello"], ToolOperation::Probe);
        let output = runner.run(&cmd).unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[test]
    fn test_failed_command_reports_stderr() {
        let runner = SystemCommandRunner::new(None);
        let cmd = FfmpegCommand::raw(
            "sh",
            &["-c", "echo broken input >&2; exit 3"],
            ToolOperation::Probe,
        );
        let err = runner.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("broken input"));
    }

    #[test]
    fn test_missing_program_is_error() {
        let runner = SystemCommandRunner::default();
        let cmd = FfmpegCommand::raw("definitely-not-a-real-tool-xyz", &[], ToolOperation::Probe);
        assert!(runner.run(&cmd).is_err());
    }

    #[test]
    fn test_hung_command_is_killed() {
        let runner = SystemCommandRunner::new(Some(Duration::from_millis(200)));
        let cmd = FfmpegCommand::raw("sh", &["-c", "exec sleep 30"], ToolOperation::Probe);

        let started = Instant::now();
        let err = runner.run(&cmd).unwrap_err();
        assert!(err.to_string().contains("逾時"));
        assert!(started.elapsed() < Duration::from_secs(10));
    }
}

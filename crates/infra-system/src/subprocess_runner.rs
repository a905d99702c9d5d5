// Subprocess runner implementation
// reason: tokio for async process management, nix for process-group signals
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use hostaudit_core::application::executor::constants::TERMINATE_GRACE;
use hostaudit_core::port::{
    CommandInvocation, CommandLine, CommandResult, CommandRunner, CommandStatus, TimeProvider,
};

/// Environment variables forced on every command (stable, parseable output)
const FORCED_ENV: &[(&str, &str)] = &[("LC_ALL", "C")];

/// Subprocess runner
///
/// Spawns each command in its own process group with stdin closed. On
/// timeout the whole group gets SIGTERM, then SIGKILL, and the child is
/// reaped before `execute` returns. Children are also killed if the
/// `execute` future is dropped mid-flight.
pub struct SubprocessRunner {
    time_provider: Arc<dyn TimeProvider>,
    env_allowlist: Vec<String>,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    /// * `env_allowlist` - Variables inherited from this process; empty inherits everything
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new(
    ///     Arc::new(SystemTimeProvider),
    ///     vec!["PATH".to_string(), "HOME".to_string(), "USER".to_string()],
    /// );
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>, env_allowlist: Vec<String>) -> Self {
        Self {
            time_provider,
            env_allowlist,
        }
    }

    /// Current environment filtered to the allowlist
    fn filter_env(&self, env: impl Iterator<Item = (String, String)>) -> Vec<(String, String)> {
        env.filter(|(k, _)| self.env_allowlist.contains(k)).collect()
    }

    fn build_command(&self, command: &CommandLine) -> Command {
        let (program, args) = command.to_argv();
        let mut cmd = Command::new(program);
        cmd.args(args);

        if !self.env_allowlist.is_empty() {
            cmd.env_clear();
            cmd.envs(self.filter_env(std::env::vars()));
        }
        cmd.envs(FORCED_ENV.iter().copied());

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        cmd.process_group(0);

        cmd
    }

    /// Build the result from what the process produced
    fn finish(
        &self,
        invocation: CommandInvocation,
        pid: Option<u32>,
        status: CommandStatus,
        stdout: &[u8],
        stderr: &[u8],
        start_time: i64,
    ) -> CommandResult {
        let duration_ms = self.time_provider.now_millis() - start_time;

        debug!(
            command = %invocation.command_line,
            pid = ?pid,
            status = ?status,
            duration_ms = %duration_ms,
            stderr_bytes = stderr.len(),
            "Command finished"
        );

        CommandResult {
            invocation,
            pid,
            status,
            stdout: String::from_utf8_lossy(stdout).trim_end().to_string(),
            stderr: String::from_utf8_lossy(stderr).trim_end().to_string(),
            duration_ms,
        }
    }

    /// Kill the child's process group with SIGTERM first, then SIGKILL
    async fn terminate(&self, child: &mut Child) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let pgid = Pid::from_raw(pid as i32);

            // Step 1: SIGTERM for graceful shutdown
            info!(pid = %pid, "Sending SIGTERM to timed-out process group");
            if let Err(e) = killpg(pgid, Signal::SIGTERM) {
                warn!(pid = %pid, error = %e, "SIGTERM failed");
            }

            // Step 2: give the leader a moment to exit
            if timeout(TERMINATE_GRACE, child.wait()).await.is_err() {
                warn!(pid = %pid, "Process did not exit after SIGTERM, sending SIGKILL");
            }

            // Step 3: SIGKILL whatever is left in the group (ESRCH when already gone)
            let _ = killpg(pgid, Signal::SIGKILL);
        }

        // Reap the leader (no-op if it already exited)
        if let Err(e) = child.kill().await {
            warn!(error = %e, "Failed to kill/reap child process");
        }
    }
}

/// Kills the child's process group when dropped while armed
///
/// Covers the `execute` future being dropped mid-flight (run cancelled and
/// its workers aborted): `kill_on_drop` only reaches the group leader.
/// Declared after the `Child` so it drops first, while the leader still
/// holds the group id.
struct GroupGuard {
    pgid: Option<u32>,
    armed: bool,
}

impl GroupGuard {
    fn new(pgid: Option<u32>) -> Self {
        Self { pgid, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for GroupGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        #[cfg(unix)]
        if let Some(pgid) = self.pgid {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            warn!(pid = %pgid, "Command dropped before finishing, killing its process group");
            let _ = killpg(Pid::from_raw(pgid as i32), Signal::SIGKILL);
        }
    }
}

async fn read_pipe<R: AsyncRead + Unpin>(pipe: Option<&mut R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf).await;
    }
    buf
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn execute(&self, command: &CommandLine, command_timeout: Duration) -> CommandResult {
        let invocation = CommandInvocation::new(command.clone(), command_timeout);
        let start_time = self.time_provider.now_millis();

        debug!(
            command = %command,
            timeout_secs = command_timeout.as_secs_f64(),
            "Starting command"
        );

        let mut child = match self.build_command(command).spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(command = %command, error = %e, "Spawn failed");
                let status = CommandStatus::Failure(e.to_string());
                return self.finish(invocation, None, status, &[], &[], start_time);
            }
        };
        let pid = child.id();
        let mut guard = GroupGuard::new(pid);

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        let waited = timeout(command_timeout, async {
            tokio::join!(
                child.wait(),
                read_pipe(stdout_pipe.as_mut()),
                read_pipe(stderr_pipe.as_mut()),
            )
        })
        .await;

        match waited {
            Ok((Ok(exit), stdout, stderr)) => {
                guard.disarm();
                let status = if exit.success() {
                    CommandStatus::Success
                } else {
                    CommandStatus::NonZero(exit.code())
                };
                self.finish(invocation, pid, status, &stdout, &stderr, start_time)
            }
            Ok((Err(e), stdout, stderr)) => {
                let status = CommandStatus::Failure(e.to_string());
                self.finish(invocation, pid, status, &stdout, &stderr, start_time)
            }
            Err(_) => {
                warn!(
                    command = %command,
                    pid = ?pid,
                    timeout_secs = command_timeout.as_secs_f64(),
                    "Command timed out"
                );
                self.terminate(&mut child).await;
                guard.disarm();
                let status = CommandStatus::Timeout(command_timeout);
                self.finish(invocation, pid, status, &[], &[], start_time)
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use hostaudit_core::port::time_provider::SystemTimeProvider;

    fn runner() -> SubprocessRunner {
        SubprocessRunner::new(Arc::new(SystemTimeProvider), vec![])
    }

    #[tokio::test]
    async fn test_execute_success_trims_output() {
        let result = runner()
            .execute(&CommandLine::new("echo").arg("hello"), Duration::from_secs(5))
            .await;

        assert_eq!(result.status, CommandStatus::Success);
        assert_eq!(result.stdout, "hello");
        assert!(result.pid.is_some());
    }

    #[tokio::test]
    async fn test_execute_non_zero_exit() {
        let result = runner()
            .execute(&CommandLine::shell("echo partial; exit 3"), Duration::from_secs(5))
            .await;

        assert_eq!(result.status, CommandStatus::NonZero(Some(3)));
        assert_eq!(result.stdout, "partial");
    }

    #[tokio::test]
    async fn test_stderr_is_not_failure() {
        let result = runner()
            .execute(&CommandLine::shell("echo oops >&2; echo fine"), Duration::from_secs(5))
            .await;

        assert!(result.is_success());
        assert_eq!(result.stdout, "fine");
        assert_eq!(result.stderr, "oops");
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let result = runner()
            .execute(
                &CommandLine::new("definitely-not-a-real-binary-hostaudit"),
                Duration::from_secs(5),
            )
            .await;

        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert!(result.pid.is_none());
    }

    #[tokio::test]
    async fn test_execute_timeout() {
        let started = std::time::Instant::now();
        let result = runner()
            .execute(&CommandLine::new("sleep").arg("10"), Duration::from_millis(200))
            .await;

        assert_eq!(result.status, CommandStatus::Timeout(Duration::from_millis(200)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    /// Alive and not a zombie
    #[cfg(target_os = "linux")]
    fn is_running(pid: u32) -> bool {
        std::fs::read_to_string(format!("/proc/{}/stat", pid))
            .ok()
            .and_then(|stat| {
                let (_, rest) = stat.rsplit_once(')')?;
                rest.split_whitespace().next().map(|state| state != "Z")
            })
            .unwrap_or(false)
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_dropped_execute_kills_process_group() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("background.pid");
        let script = format!("sleep 30 & echo $! > {}; wait", pid_file.display());
        let runner = runner();

        // Outer timeout drops the execute future while the command is still running
        let dropped = tokio::time::timeout(
            Duration::from_millis(300),
            runner.execute(&CommandLine::shell(script), Duration::from_secs(60)),
        )
        .await;
        assert!(dropped.is_err());

        let pid: u32 = std::fs::read_to_string(&pid_file)
            .unwrap()
            .trim()
            .parse()
            .unwrap();
        let start = std::time::Instant::now();
        while is_running(pid) && start.elapsed() < Duration::from_secs(3) {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!is_running(pid), "background sleep {} outlived the dropped command", pid);
    }

    #[tokio::test]
    async fn test_forced_locale() {
        let result = runner()
            .execute(&CommandLine::shell("echo $LC_ALL"), Duration::from_secs(5))
            .await;

        assert_eq!(result.stdout, "C");
    }

    #[test]
    fn test_env_filtering() {
        let runner = SubprocessRunner::new(
            Arc::new(SystemTimeProvider),
            vec!["ALLOWED_VAR".to_string()],
        );

        let env = vec![
            ("ALLOWED_VAR".to_string(), "value1".to_string()),
            ("BLOCKED_VAR".to_string(), "value2".to_string()),
        ];

        let filtered = runner.filter_env(env.into_iter());

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].0, "ALLOWED_VAR");
    }
}

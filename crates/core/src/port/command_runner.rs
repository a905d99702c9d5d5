// Command Runner Port
// Abstraction for running external OS commands under a wall-clock timeout

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use thiserror::Error;

use crate::domain::ProbeError;

/// Command line to execute
///
/// `Argv` runs a program directly; `Shell` goes through `sh -c` so probes can
/// use pipelines and redirections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CommandLine {
    Argv { program: String, args: Vec<String> },
    Shell(String),
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        CommandLine::Argv {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn shell(script: impl Into<String>) -> Self {
        CommandLine::Shell(script.into())
    }

    /// Append one argument (no-op for shell command lines)
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        if let CommandLine::Argv { args, .. } = &mut self {
            args.push(arg.into());
        }
        self
    }

    pub fn args<I, S>(mut self, new_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let CommandLine::Argv { args, .. } = &mut self {
            args.extend(new_args.into_iter().map(Into::into));
        }
        self
    }

    /// Program and argument vector as handed to the OS
    pub fn to_argv(&self) -> (String, Vec<String>) {
        match self {
            CommandLine::Argv { program, args } => (program.clone(), args.clone()),
            CommandLine::Shell(script) => ("sh".to_string(), vec!["-c".to_string(), script.clone()]),
        }
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandLine::Argv { program, args } if args.is_empty() => write!(f, "{}", program),
            CommandLine::Argv { program, args } => write!(f, "{} {}", program, args.join(" ")),
            CommandLine::Shell(script) => write!(f, "{}", script),
        }
    }
}

/// One bounded execution of a command
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub command_line: CommandLine,
    pub timeout: Duration,
    pub started_at: DateTime<Utc>,
}

impl CommandInvocation {
    pub fn new(command_line: CommandLine, timeout: Duration) -> Self {
        Self {
            command_line,
            timeout,
            started_at: Utc::now(),
        }
    }
}

/// How the command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// Exit code 0
    Success,
    /// Non-zero exit (None when terminated by a signal)
    NonZero(Option<i32>),
    /// Killed after exceeding its timeout
    Timeout(Duration),
    /// Could not be spawned or waited on
    Failure(String),
}

/// Result of a command invocation
///
/// `stdout` is UTF-8 lossy with trailing whitespace trimmed. `stderr` is kept
/// for diagnostics only.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub invocation: CommandInvocation,
    /// OS process id, when the process was spawned
    pub pid: Option<u32>,
    pub status: CommandStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: i64,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self.status {
            CommandStatus::Success => Some(0),
            CommandStatus::NonZero(code) => code,
            _ => None,
        }
    }

    /// Stdout regardless of exit code; errors only on timeout or spawn failure
    ///
    /// Matches how most audit checks read tools like `grep`, where a
    /// non-zero exit simply means "nothing found".
    pub fn into_output(self) -> Result<String, CommandError> {
        match self.status {
            CommandStatus::Success | CommandStatus::NonZero(_) => Ok(self.stdout),
            CommandStatus::Timeout(after) => Err(CommandError::Timeout(after)),
            CommandStatus::Failure(msg) => Err(CommandError::SpawnFailed(msg)),
        }
    }

    /// Stdout only when the command exited 0
    pub fn into_checked_output(self) -> Result<String, CommandError> {
        match self.status {
            CommandStatus::Success => Ok(self.stdout),
            CommandStatus::NonZero(code) => Err(CommandError::NonZeroExit {
                command: self.invocation.command_line.to_string(),
                code,
                stderr: self.stderr,
            }),
            CommandStatus::Timeout(after) => Err(CommandError::Timeout(after)),
            CommandStatus::Failure(msg) => Err(CommandError::SpawnFailed(msg)),
        }
    }
}

/// Command errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Process timeout after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    #[error("`{command}` exited with {code:?}: {stderr}")]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl From<CommandError> for ProbeError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::Timeout(after) => ProbeError::Timeout(after),
            other => ProbeError::Command(other.to_string()),
        }
    }
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns real child processes (infra-system)
/// - MockCommandRunner: scripted responses for tests
///
/// `execute` never fails: spawn errors and timeouts are reported through
/// `CommandResult::status`. Implementations must not leave the child running
/// once they return.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(&self, command: &CommandLine, timeout: Duration) -> CommandResult;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Scripted response for one command line
    #[derive(Debug, Clone)]
    pub enum MockResponse {
        /// Exit 0 with this stdout
        Stdout(String),
        /// Exit with code and stdout
        Exit(i32, String),
        /// Report a timeout (after the requested timeout)
        Timeout,
        /// Spawn failure with message
        SpawnFail(String),
        /// Sleep, then answer with the inner response
        Delayed(Duration, Box<MockResponse>),
    }

    /// Mock Command Runner for testing
    ///
    /// Unscripted commands fail to spawn, like a missing binary would.
    #[derive(Default)]
    pub struct MockCommandRunner {
        responses: Mutex<HashMap<String, MockResponse>>,
        calls: Arc<Mutex<Vec<(String, Duration)>>>,
    }

    impl MockCommandRunner {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(self, command: impl Into<String>, response: MockResponse) -> Self {
            self.responses
                .lock()
                .unwrap()
                .insert(command.into(), response);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        /// Recorded (command line, timeout) pairs in call order
        pub fn calls(&self) -> Vec<(String, Duration)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommandRunner for MockCommandRunner {
        async fn execute(&self, command: &CommandLine, timeout: Duration) -> CommandResult {
            let key = command.to_string();
            self.calls.lock().unwrap().push((key.clone(), timeout));

            let mut response = self
                .responses
                .lock()
                .unwrap()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| {
                    MockResponse::SpawnFail(format!("No such file or directory: {}", key))
                });

            while let MockResponse::Delayed(delay, inner) = response {
                tokio::time::sleep(delay).await;
                response = *inner;
            }

            let (status, stdout) = match response {
                MockResponse::Stdout(out) => (CommandStatus::Success, out),
                MockResponse::Exit(0, out) => (CommandStatus::Success, out),
                MockResponse::Exit(code, out) => (CommandStatus::NonZero(Some(code)), out),
                MockResponse::Timeout => (CommandStatus::Timeout(timeout), String::new()),
                MockResponse::SpawnFail(msg) => (CommandStatus::Failure(msg), String::new()),
                MockResponse::Delayed(..) => unreachable!("delays are unwrapped above"),
            };

            CommandResult {
                invocation: CommandInvocation::new(command.clone(), timeout),
                pid: None,
                status,
                stdout,
                stderr: String::new(),
                duration_ms: 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::{MockCommandRunner, MockResponse};
    use super::*;

    #[test]
    fn test_shell_command_runs_through_sh() {
        let cmd = CommandLine::shell("ip route | grep default");
        let (program, args) = cmd.to_argv();

        assert_eq!(program, "sh");
        assert_eq!(args, vec!["-c", "ip route | grep default"]);
        assert_eq!(cmd.to_string(), "ip route | grep default");
    }

    #[test]
    fn test_argv_display() {
        let cmd = CommandLine::new("sysctl").args(["-n", "kernel.kptr_restrict"]);
        assert_eq!(cmd.to_string(), "sysctl -n kernel.kptr_restrict");
    }

    #[tokio::test]
    async fn test_into_output_is_lenient_on_exit_code() {
        let runner = MockCommandRunner::new().respond("grep x", MockResponse::Exit(1, String::new()));
        let result = runner
            .execute(&CommandLine::shell("grep x"), Duration::from_secs(1))
            .await;

        assert_eq!(result.exit_code(), Some(1));
        assert_eq!(result.clone().into_output().unwrap(), "");
        assert!(matches!(
            result.into_checked_output(),
            Err(CommandError::NonZeroExit { code: Some(1), .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_converts_to_probe_timeout() {
        let runner = MockCommandRunner::new().respond("lynis", MockResponse::Timeout);
        let result = runner
            .execute(&CommandLine::new("lynis"), Duration::from_secs(30))
            .await;

        let err: ProbeError = result.into_output().unwrap_err().into();
        assert_eq!(err, ProbeError::Timeout(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_unscripted_command_fails_to_spawn() {
        let runner = MockCommandRunner::new();
        let result = runner
            .execute(&CommandLine::new("missing-tool"), Duration::from_secs(1))
            .await;

        assert!(matches!(result.status, CommandStatus::Failure(_)));
        assert_eq!(runner.call_count(), 1);
    }
}

// Declarative command probe: one `sh -c` script plus an output classifier
use async_trait::async_trait;

use hostaudit_core::application::{Capability, ProbeContext};
use hostaudit_core::domain::{ProbeError, ProbeValue};
use hostaudit_core::port::CommandLine;

use crate::classifier::Classifier;

/// Exit code the shell uses when a program is not installed
const COMMAND_NOT_FOUND: i32 = 127;

/// Probe that runs a shell script and classifies its stdout
///
/// By default any exit code is accepted (a `grep` that matches nothing is a
/// valid "not found"). `checked()` probes require exit 0. Exit 127 always
/// fails the probe, so a missing tool is never reported as a clean result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandProbe {
    script: &'static str,
    classifier: Classifier,
    checked: bool,
}

impl CommandProbe {
    pub const fn new(script: &'static str, classifier: Classifier) -> Self {
        Self {
            script,
            classifier,
            checked: false,
        }
    }

    /// Require the script to exit 0
    pub const fn checked(self) -> Self {
        Self {
            checked: true,
            ..self
        }
    }

    pub fn script(&self) -> &'static str {
        self.script
    }
}

#[async_trait]
impl Capability for CommandProbe {
    async fn run(&self, ctx: ProbeContext) -> Result<ProbeValue, ProbeError> {
        let result = ctx.command(&CommandLine::shell(self.script)).await;

        let exit_code = result.exit_code();
        if exit_code == Some(COMMAND_NOT_FOUND) {
            let reason = result.stderr.lines().next().unwrap_or(self.script).to_string();
            return Err(ProbeError::failed(format!("command not found: {}", reason)));
        }

        let output = if self.checked {
            result.into_checked_output()?
        } else {
            result.into_output()?
        };
        Ok(self.classifier.classify(&output, exit_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostaudit_core::domain::ProbeKey;
    use hostaudit_core::port::command_runner::mocks::{MockCommandRunner, MockResponse};
    use std::sync::Arc;
    use std::time::Duration;

    const GATEWAY: CommandProbe = CommandProbe::new(
        "ip route show default",
        Classifier::Presence {
            found: "OK",
            missing: "Not Found",
        },
    );

    fn ctx(runner: MockCommandRunner) -> ProbeContext {
        ProbeContext::new(
            ProbeKey::new("network", "default_gateway"),
            Arc::new(runner),
            Duration::from_secs(20),
        )
    }

    #[tokio::test]
    async fn test_lenient_probe_accepts_non_zero_exit() {
        let runner = MockCommandRunner::new()
            .respond("ip route show default", MockResponse::Exit(1, String::new()));

        let value = GATEWAY.run(ctx(runner)).await.unwrap();
        assert_eq!(value, ProbeValue::text("Not Found"));
    }

    #[tokio::test]
    async fn test_checked_probe_fails_on_non_zero_exit() {
        let runner = MockCommandRunner::new()
            .respond("ip route show default", MockResponse::Exit(2, String::new()));

        let err = GATEWAY.checked().run(ctx(runner)).await.unwrap_err();
        assert!(matches!(err, ProbeError::Command(_)));
    }

    #[tokio::test]
    async fn test_missing_tool_fails() {
        let runner = MockCommandRunner::new()
            .respond("ip route show default", MockResponse::Exit(127, String::new()));

        let err = GATEWAY.run(ctx(runner)).await.unwrap_err();
        assert_eq!(err, ProbeError::failed("command not found: ip route show default"));
    }

    #[tokio::test]
    async fn test_timeout_is_propagated() {
        let runner = MockCommandRunner::new().respond("ip route show default", MockResponse::Timeout);

        let err = GATEWAY.run(ctx(runner)).await.unwrap_err();
        assert_eq!(err, ProbeError::Timeout(Duration::from_secs(20)));
    }
}

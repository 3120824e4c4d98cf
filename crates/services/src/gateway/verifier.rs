use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::GatewayError;

/// Captured result of running a user's project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRun {
    pub passed: bool,
    pub output: String,
    pub exit_code: Option<i32>,
}

/// Executes a project folder and judges the outcome.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `GatewayError::Process` when the project could not be run at all.
    async fn run(
        &self,
        folder: &Path,
        command_args: Option<&str>,
    ) -> Result<VerificationRun, GatewayError>;
}

const DEFAULT_COMMAND: &str = "cargo run";
const MAX_OUTPUT_CHARS: usize = 30_000;

/// Runs the session's command line inside the project folder.
///
/// The command args are split on whitespace; the first word is the program.
/// A zero exit status passes.
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    default_command: String,
    timeout: Duration,
}

impl CommandVerifier {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            default_command: DEFAULT_COMMAND.to_owned(),
            timeout,
        }
    }

    /// Command used when a session has no command args of its own.
    #[must_use]
    pub fn with_default_command(mut self, command: impl Into<String>) -> Self {
        self.default_command = command.into();
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Verifier for CommandVerifier {
    async fn run(
        &self,
        folder: &Path,
        command_args: Option<&str>,
    ) -> Result<VerificationRun, GatewayError> {
        let line = command_args
            .map(str::trim)
            .filter(|args| !args.is_empty())
            .unwrap_or(self.default_command.as_str());
        let mut words = line.split_whitespace();
        let program = words
            .next()
            .ok_or_else(|| GatewayError::Process("empty verification command".into()))?;

        tracing::info!(folder = %folder.display(), command = %line, "running verification");
        let output = match tokio::time::timeout(
            self.timeout,
            Command::new(program)
                .args(words)
                .current_dir(folder)
                .kill_on_drop(true)
                .output(),
        )
        .await
        {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                tracing::warn!(%err, program, "verification command failed to start");
                return Err(GatewayError::Process(format!("failed to run {program}: {err}")));
            }
            Err(_) => {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "verification timed out");
                return Err(GatewayError::Process(format!(
                    "{line} timed out after {}s",
                    self.timeout.as_secs()
                )));
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = match (stdout.trim().is_empty(), stderr.trim().is_empty()) {
            (_, true) => stdout.into_owned(),
            (true, false) => stderr.into_owned(),
            (false, false) => format!("{stdout}\n{stderr}"),
        };

        let run = VerificationRun {
            passed: output.status.success(),
            output: truncate_output(combined),
            exit_code: output.status.code(),
        };
        tracing::debug!(passed = run.passed, exit_code = ?run.exit_code, "verification finished");
        Ok(run)
    }
}

fn truncate_output(output: String) -> String {
    match output.char_indices().nth(MAX_OUTPUT_CHARS) {
        Some((cut, _)) => format!("{}\n[output truncated]", &output[..cut]),
        None => output,
    }
}

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::GatewayError;

/// Lets the user choose a project folder.
#[async_trait]
pub trait FolderPicker: Send + Sync {
    /// Returns the chosen folder, or `None` when the user cancels.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Process` if no dialog could be shown.
    async fn pick_folder(&self) -> Result<Option<String>, GatewayError>;
}

/// Native folder dialog driven by a platform helper program.
///
/// macOS uses `osascript`, Linux uses `zenity`. A non-zero exit is a cancel.
#[derive(Debug, Clone)]
pub struct CommandFolderPicker {
    program: String,
    args: Vec<String>,
}

impl CommandFolderPicker {
    /// Picker for the current platform.
    #[must_use]
    pub fn native() -> Self {
        if cfg!(target_os = "macos") {
            Self::new(
                "osascript",
                [
                    "-e",
                    "POSIX path of (choose folder with prompt \"Select project folder\")",
                ],
            )
        } else {
            Self::new(
                "zenity",
                [
                    "--file-selection",
                    "--directory",
                    "--title=Select project folder",
                ],
            )
        }
    }

    #[must_use]
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl FolderPicker for CommandFolderPicker {
    async fn pick_folder(&self) -> Result<Option<String>, GatewayError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|err| {
                tracing::warn!(%err, program = %self.program, "folder dialog unavailable");
                GatewayError::Process(format!("cannot open folder dialog: {err}"))
            })?;

        if !output.status.success() {
            tracing::debug!(status = ?output.status, "folder dialog cancelled");
            return Ok(None);
        }

        Ok(parse_selection(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn parse_selection(stdout: &str) -> Option<String> {
    let path = stdout.trim();
    if path.is_empty() {
        return None;
    }
    // osascript answers with a trailing slash.
    let trimmed = path.trim_end_matches('/');
    Some(if trimmed.is_empty() { "/" } else { trimmed }.to_owned())
}

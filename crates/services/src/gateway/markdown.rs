use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use playground_core::model::MarkdownRef;

use crate::error::GatewayError;

/// Directory holding the exercise markdown documents.
#[derive(Debug, Clone)]
pub struct MarkdownSource {
    root: PathBuf,
}

impl MarkdownSource {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Reads the document named by `markdown`.
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Rejected` for names that escape the root,
    /// `GatewayError::NotFound` for missing files and
    /// `GatewayError::Unavailable` for other read failures.
    pub async fn read(&self, markdown: &MarkdownRef) -> Result<String, GatewayError> {
        let path = self.resolve(markdown)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|err| match err.kind() {
                ErrorKind::NotFound => GatewayError::NotFound(format!("markdown {markdown}")),
                _ => GatewayError::Unavailable(format!("{}: {err}", path.display())),
            })
    }

    fn resolve(&self, markdown: &MarkdownRef) -> Result<PathBuf, GatewayError> {
        let relative = Path::new(markdown.as_str());
        let plain = !markdown.as_str().trim().is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !plain {
            tracing::warn!(%markdown, "rejected markdown reference outside the exercise root");
            return Err(GatewayError::Rejected(format!(
                "markdown reference {markdown} is not a plain relative path"
            )));
        }
        Ok(self.root.join(relative))
    }
}

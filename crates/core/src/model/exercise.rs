use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ExerciseId, MarkdownRef};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ExerciseError {
    #[error("exercise id cannot be empty")]
    EmptyId,

    #[error("exercise name cannot be empty")]
    EmptyName,

    #[error("markdown reference cannot be empty")]
    EmptyMarkdown,
}

//
// ─── EXERCISE ──────────────────────────────────────────────────────────────────
//

/// A single learning unit from the catalog.
///
/// Exercises are immutable once loaded; the catalog order is owned by whoever
/// produced the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    id: ExerciseId,
    name: String,
    markdown: MarkdownRef,
}

impl Exercise {
    /// Creates a validated exercise.
    ///
    /// # Errors
    ///
    /// Returns `ExerciseError` if the id, name or markdown reference is blank.
    pub fn new(
        id: ExerciseId,
        name: impl Into<String>,
        markdown: MarkdownRef,
    ) -> Result<Self, ExerciseError> {
        let name = name.into();
        if id.as_str().trim().is_empty() {
            return Err(ExerciseError::EmptyId);
        }
        if name.trim().is_empty() {
            return Err(ExerciseError::EmptyName);
        }
        if markdown.as_str().trim().is_empty() {
            return Err(ExerciseError::EmptyMarkdown);
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            markdown,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ExerciseId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn markdown(&self) -> &MarkdownRef {
        &self.markdown
    }
}

/// Finds the catalog entry with the given id.
#[must_use]
pub fn find_exercise<'a>(catalog: &'a [Exercise], id: &ExerciseId) -> Option<&'a Exercise> {
    catalog.iter().find(|exercise| exercise.id() == id)
}

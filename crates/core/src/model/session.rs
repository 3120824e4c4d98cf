use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::model::ids::{ExerciseId, SessionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("updated_on is before started_on")]
    InvalidTimeRange,

    #[error("completed_on is before started_on")]
    CompletedBeforeStart,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One user attempt at one exercise, as persisted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSession {
    id: SessionId,
    exercise_id: ExerciseId,
    folder_path: Option<String>,
    command_args: Option<String>,
    started_on: DateTime<Utc>,
    updated_on: DateTime<Utc>,
    completed_on: Option<DateTime<Utc>>,
}

impl ExerciseSession {
    /// Starts a brand-new session record.
    #[must_use]
    pub fn start(id: SessionId, draft: NewSession, started_on: DateTime<Utc>) -> Self {
        Self {
            id,
            exercise_id: draft.exercise_id,
            folder_path: normalize(draft.folder_path),
            command_args: normalize(draft.command_args),
            started_on,
            updated_on: started_on,
            completed_on: None,
        }
    }

    /// Rehydrate a session from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the timestamps are out of order.
    pub fn from_persisted(
        id: SessionId,
        exercise_id: ExerciseId,
        folder_path: Option<String>,
        command_args: Option<String>,
        started_on: DateTime<Utc>,
        updated_on: DateTime<Utc>,
        completed_on: Option<DateTime<Utc>>,
    ) -> Result<Self, SessionError> {
        if updated_on < started_on {
            return Err(SessionError::InvalidTimeRange);
        }
        if completed_on.is_some_and(|done| done < started_on) {
            return Err(SessionError::CompletedBeforeStart);
        }

        Ok(Self {
            id,
            exercise_id,
            folder_path,
            command_args,
            started_on,
            updated_on,
            completed_on,
        })
    }

    /// Applies a patch and returns the resulting record.
    ///
    /// `Keep` fields are left untouched, `Clear` fields become `None`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::CompletedBeforeStart` if the patch would complete
    /// the session before it started.
    pub fn apply_patch(
        &self,
        patch: &SessionPatch,
        updated_on: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        let mut next = self.clone();
        patch.folder_path.clone().apply_to(&mut next.folder_path);
        patch.command_args.clone().apply_to(&mut next.command_args);
        patch.completed_on.clone().apply_to(&mut next.completed_on);
        next.folder_path = normalize(next.folder_path);
        next.command_args = normalize(next.command_args);
        next.updated_on = updated_on.max(self.started_on);

        if next.completed_on.is_some_and(|done| done < next.started_on) {
            return Err(SessionError::CompletedBeforeStart);
        }
        Ok(next)
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn exercise_id(&self) -> &ExerciseId {
        &self.exercise_id
    }

    #[must_use]
    pub fn folder_path(&self) -> Option<&str> {
        self.folder_path.as_deref()
    }

    #[must_use]
    pub fn command_args(&self) -> Option<&str> {
        self.command_args.as_deref()
    }

    #[must_use]
    pub fn started_on(&self) -> DateTime<Utc> {
        self.started_on
    }

    #[must_use]
    pub fn updated_on(&self) -> DateTime<Utc> {
        self.updated_on
    }

    #[must_use]
    pub fn completed_on(&self) -> Option<DateTime<Utc>> {
        self.completed_on
    }

    #[must_use]
    pub fn has_folder(&self) -> bool {
        self.folder_path.is_some()
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_on.is_some()
    }
}

// An empty folder is the same as no folder.
fn normalize(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//
// ─── PAYLOADS ──────────────────────────────────────────────────────────────────
//

/// Create payload for a new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSession {
    pub exercise_id: ExerciseId,
    #[serde(default)]
    pub folder_path: Option<String>,
    #[serde(default)]
    pub command_args: Option<String>,
}

impl NewSession {
    #[must_use]
    pub fn new(exercise_id: ExerciseId) -> Self {
        Self {
            exercise_id,
            folder_path: None,
            command_args: None,
        }
    }

    #[must_use]
    pub fn with_folder_path(mut self, folder_path: impl Into<String>) -> Self {
        self.folder_path = Some(folder_path.into());
        self
    }

    #[must_use]
    pub fn with_command_args(mut self, command_args: impl Into<String>) -> Self {
        self.command_args = Some(command_args.into());
        self
    }
}

/// Tri-state field update: omitted, explicit null, or a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    #[must_use]
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Writes this patch into `slot`.
    pub fn apply_to(self, slot: &mut Option<T>) {
        match self {
            Patch::Keep => {}
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value),
        }
    }

    #[must_use]
    pub fn from_option(value: Option<T>) -> Self {
        value.map_or(Patch::Clear, Patch::Set)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => serializer.serialize_some(value),
        }
    }
}

// Only reached when the field is present, so a missing field stays `Keep`
// through `#[serde(default)]`.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<T>::deserialize(deserializer).map(Patch::from_option)
    }
}

/// Update payload for an existing session.
///
/// The patch is a pass-through: whoever persists the session owns the merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub id: SessionId,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub folder_path: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub command_args: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_keep")]
    pub completed_on: Patch<DateTime<Utc>>,
}

impl SessionPatch {
    #[must_use]
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            folder_path: Patch::Keep,
            command_args: Patch::Keep,
            completed_on: Patch::Keep,
        }
    }

    #[must_use]
    pub fn folder_path(mut self, value: Patch<String>) -> Self {
        self.folder_path = value;
        self
    }

    #[must_use]
    pub fn command_args(mut self, value: Patch<String>) -> Self {
        self.command_args = value;
        self
    }

    #[must_use]
    pub fn completed_on(mut self, value: Patch<DateTime<Utc>>) -> Self {
        self.completed_on = value;
        self
    }

    /// True when the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folder_path.is_keep() && self.command_args.is_keep() && self.completed_on.is_keep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn started() -> ExerciseSession {
        let draft = NewSession::new(ExerciseId::new("a"))
            .with_folder_path("/tmp/project")
            .with_command_args("cargo run");
        ExerciseSession::start(SessionId::generate(), draft, fixed_now())
    }

    #[test]
    fn start_treats_blank_folder_as_unset() {
        let draft = NewSession::new(ExerciseId::new("a")).with_folder_path("");
        let session = ExerciseSession::start(SessionId::generate(), draft, fixed_now());
        assert!(!session.has_folder());
        assert_eq!(session.updated_on(), session.started_on());
    }

    #[test]
    fn patch_keeps_omitted_and_clears_null_fields() {
        let session = started();
        let patch = SessionPatch::new(session.id())
            .command_args(Patch::Clear)
            .folder_path(Patch::Keep);
        let later = fixed_now() + Duration::minutes(5);

        let next = session.apply_patch(&patch, later).unwrap();

        assert_eq!(next.folder_path(), Some("/tmp/project"));
        assert_eq!(next.command_args(), None);
        assert_eq!(next.updated_on(), later);
    }

    #[test]
    fn patch_rejects_completion_before_start() {
        let session = started();
        let patch = SessionPatch::new(session.id())
            .completed_on(Patch::Set(fixed_now() - Duration::days(1)));
        let err = session.apply_patch(&patch, fixed_now()).unwrap_err();
        assert_eq!(err, SessionError::CompletedBeforeStart);
    }

    #[test]
    fn patch_wire_shape_distinguishes_omitted_from_null() {
        let id: SessionId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        let patch = SessionPatch::new(id)
            .folder_path(Patch::Set("/work".into()))
            .completed_on(Patch::Clear);

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["folderPath"], "/work");
        assert!(json["completedOn"].is_null());
        assert!(json.get("commandArgs").is_none());

        let back: SessionPatch = serde_json::from_value(json).unwrap();
        assert_eq!(back, patch);
    }

    #[test]
    fn from_persisted_rejects_out_of_order_timestamps() {
        let now = fixed_now();
        let err = ExerciseSession::from_persisted(
            SessionId::generate(),
            ExerciseId::new("a"),
            None,
            None,
            now,
            now - Duration::seconds(1),
            None,
        )
        .unwrap_err();
        assert_eq!(err, SessionError::InvalidTimeRange);
    }
}

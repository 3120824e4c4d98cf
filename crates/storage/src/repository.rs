use async_trait::async_trait;
use chrono::{DateTime, Utc};
use playground_core::model::{Exercise, ExerciseId, ExerciseSession, SessionId, SessionPatch};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("invalid data: {0}")]
    Invalid(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the exercise catalog.
#[async_trait]
pub trait ExerciseRepository: Send + Sync {
    /// Insert or replace an exercise at the given catalog position.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the exercise cannot be stored.
    async fn upsert_exercise(&self, exercise: &Exercise, position: u32) -> Result<(), StorageError>;

    /// Fetch an exercise by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_exercise(&self, id: &ExerciseId) -> Result<Option<Exercise>, StorageError>;

    /// List the whole catalog ordered by position, then id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_exercises(&self) -> Result<Vec<Exercise>, StorageError>;
}

/// Repository contract for exercise sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Persist a freshly started session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the id is taken or the exercise is unknown.
    async fn insert_session(&self, session: &ExerciseSession) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_session(&self, id: SessionId) -> Result<Option<ExerciseSession>, StorageError>;

    /// Most recently started session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn last_session(&self) -> Result<Option<ExerciseSession>, StorageError>;

    /// Apply a patch and return the stored result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the session is missing, or
    /// `StorageError::Invalid` if the patch breaks a session invariant.
    async fn update_session(
        &self,
        patch: &SessionPatch,
        updated_on: DateTime<Utc>,
    ) -> Result<ExerciseSession, StorageError>;

    /// Distinct exercises with at least one completed session.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn completed_exercise_ids(&self) -> Result<Vec<ExerciseId>, StorageError>;
}

pub(crate) fn latest_of<'a>(
    sessions: impl Iterator<Item = &'a ExerciseSession>,
) -> Option<&'a ExerciseSession> {
    sessions.max_by(|a, b| {
        a.started_on()
            .cmp(&b.started_on())
            .then_with(|| a.id().cmp(&b.id()))
    })
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    exercises: Arc<Mutex<Vec<(u32, Exercise)>>>,
    sessions: Arc<Mutex<HashMap<SessionId, ExerciseSession>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ExerciseRepository for InMemoryRepository {
    async fn upsert_exercise(&self, exercise: &Exercise, position: u32) -> Result<(), StorageError> {
        let mut guard = self.exercises.lock().map_err(poisoned)?;
        guard.retain(|(_, existing)| existing.id() != exercise.id());
        guard.push((position, exercise.clone()));
        guard.sort_by(|(pa, a), (pb, b)| pa.cmp(pb).then_with(|| a.id().cmp(b.id())));
        Ok(())
    }

    async fn get_exercise(&self, id: &ExerciseId) -> Result<Option<Exercise>, StorageError> {
        let guard = self.exercises.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .find(|(_, exercise)| exercise.id() == id)
            .map(|(_, exercise)| exercise.clone()))
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        let guard = self.exercises.lock().map_err(poisoned)?;
        Ok(guard.iter().map(|(_, exercise)| exercise.clone()).collect())
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn insert_session(&self, session: &ExerciseSession) -> Result<(), StorageError> {
        let known_exercise = {
            let exercises = self.exercises.lock().map_err(poisoned)?;
            exercises
                .iter()
                .any(|(_, exercise)| exercise.id() == session.exercise_id())
        };
        if !known_exercise {
            return Err(StorageError::Conflict);
        }

        let mut guard = self.sessions.lock().map_err(poisoned)?;
        if guard.contains_key(&session.id()) {
            return Err(StorageError::Conflict);
        }
        guard.insert(session.id(), session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ExerciseSession>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        Ok(guard.get(&id).cloned())
    }

    async fn last_session(&self) -> Result<Option<ExerciseSession>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        Ok(latest_of(guard.values()).cloned())
    }

    async fn update_session(
        &self,
        patch: &SessionPatch,
        updated_on: DateTime<Utc>,
    ) -> Result<ExerciseSession, StorageError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        let current = guard.get(&patch.id).ok_or(StorageError::NotFound)?;
        let next = current
            .apply_patch(patch, updated_on)
            .map_err(|e| StorageError::Invalid(e.to_string()))?;
        guard.insert(next.id(), next.clone());
        Ok(next)
    }

    async fn completed_exercise_ids(&self) -> Result<Vec<ExerciseId>, StorageError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        let mut ids: Vec<ExerciseId> = guard
            .values()
            .filter(|session| session.is_completed())
            .map(|session| session.exercise_id().clone())
            .collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

/// Aggregates catalog and session repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub exercises: Arc<dyn ExerciseRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let exercises: Arc<dyn ExerciseRepository> = Arc::new(repo.clone());
        let sessions: Arc<dyn SessionRepository> = Arc::new(repo);
        Self {
            exercises,
            sessions,
        }
    }
}

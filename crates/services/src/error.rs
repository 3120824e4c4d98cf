//! Shared error types for the services crate.

use thiserror::Error;

use playground_core::model::{ExerciseId, SessionId, VerificationReport};
use storage::StorageError;
use storage::catalog_dir::CatalogDirError;
use storage::sqlite::SqliteInitError;

use crate::store::Operation;

/// Failure reported by a backend gateway call.
///
/// Cloneable so the store can record it in a published snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GatewayError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("process error: {0}")]
    Process(String),
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound => GatewayError::NotFound("record not found".into()),
            StorageError::Conflict | StorageError::Invalid(_) => {
                GatewayError::Rejected(err.to_string())
            }
            other => GatewayError::Unavailable(other.to_string()),
        }
    }
}

/// Faults found while reconciling the catalog with the last session.
///
/// These are recorded in the store status and logged, never returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReconcileError {
    #[error("exercise catalog unavailable: {0}")]
    CatalogUnavailable(GatewayError),
    #[error("no exercises available")]
    NoExercisesAvailable,
    #[error("session {session_id} points at missing exercise {exercise_id}")]
    DanglingSessionReference {
        session_id: SessionId,
        exercise_id: ExerciseId,
    },
}

/// Errors returned by `ExerciseStore` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("unknown exercise {0}")]
    UnknownExercise(ExerciseId),
    #[error("no active session")]
    NoActiveSession,
    #[error("session {actual} is not the active session {expected}")]
    SessionMismatch {
        expected: SessionId,
        actual: SessionId,
    },
    #[error("session {0} has no project folder")]
    MissingFolder(SessionId),
    #[error("{0} already in progress")]
    Busy(Operation),
    #[error("session operation failed: {0}")]
    SessionOperationFailed(GatewayError),
    #[error("verification could not run: {0}")]
    VerificationTransportFailed(GatewayError),
    #[error("verification failed for exercise {}", report.exercise_id)]
    VerificationFailed { report: Box<VerificationReport> },
}

/// Errors emitted while assembling app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    CatalogDir(#[from] CatalogDirError),
}

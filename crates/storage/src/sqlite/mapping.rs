use playground_core::model::{Exercise, ExerciseId, ExerciseSession, MarkdownRef, SessionId};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Maps sqlx failures, keeping constraint violations distinguishable.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let Some(db) = e.as_database_error() {
        if matches!(
            db.kind(),
            sqlx::error::ErrorKind::ForeignKeyViolation | sqlx::error::ErrorKind::UniqueViolation
        ) {
            return StorageError::Conflict;
        }
    }
    StorageError::Connection(e.to_string())
}

pub(crate) fn session_id_from_str(raw: &str) -> Result<SessionId, StorageError> {
    raw.parse::<SessionId>().map_err(ser)
}

pub(crate) fn map_exercise_row(row: &SqliteRow) -> Result<Exercise, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let name: String = row.try_get("name").map_err(ser)?;
    let markdown: String = row.try_get("markdown").map_err(ser)?;

    Exercise::new(ExerciseId::new(id), name, MarkdownRef::new(markdown)).map_err(ser)
}

pub(crate) fn map_session_row(row: &SqliteRow) -> Result<ExerciseSession, StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let exercise_id: String = row.try_get("exercise_id").map_err(ser)?;

    ExerciseSession::from_persisted(
        session_id_from_str(&id)?,
        ExerciseId::new(exercise_id),
        row.try_get("folder_path").map_err(ser)?,
        row.try_get("command_args").map_err(ser)?,
        row.try_get("started_on").map_err(ser)?,
        row.try_get("updated_on").map_err(ser)?,
        row.try_get("completed_on").map_err(ser)?,
    )
    .map_err(ser)
}

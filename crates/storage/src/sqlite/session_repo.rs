use chrono::{DateTime, Utc};
use playground_core::model::{ExerciseId, ExerciseSession, Patch, SessionId, SessionPatch};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{db_err, map_session_row, ser};
use crate::repository::{SessionRepository, StorageError};

const SESSION_COLUMNS: &str =
    "id, exercise_id, folder_path, command_args, started_on, updated_on, completed_on";

/// Column assignment for one patched field.
enum Assign<'a> {
    Null,
    Text(&'a str),
    Time(DateTime<Utc>),
}

fn assignment<'a, T>(patch: &'a Patch<T>, to_value: impl Fn(&'a T) -> Assign<'a>) -> Option<Assign<'a>> {
    match patch {
        Patch::Keep => None,
        Patch::Clear => Some(Assign::Null),
        Patch::Set(value) => Some(to_value(value)),
    }
}

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn insert_session(&self, session: &ExerciseSession) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO exercise_sessions (
                    id, exercise_id, folder_path, command_args,
                    started_on, updated_on, completed_on
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(session.id().to_string())
        .bind(session.exercise_id().as_str())
        .bind(session.folder_path())
        .bind(session.command_args())
        .bind(session.started_on())
        .bind(session.updated_on())
        .bind(session.completed_on())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ExerciseSession>, StorageError> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM exercise_sessions WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn last_session(&self) -> Result<Option<ExerciseSession>, StorageError> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM exercise_sessions ORDER BY started_on DESC, id DESC LIMIT 1"
        );
        let row = sqlx::query(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_session_row).transpose()
    }

    async fn update_session(
        &self,
        patch: &SessionPatch,
        updated_on: DateTime<Utc>,
    ) -> Result<ExerciseSession, StorageError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let select = format!("SELECT {SESSION_COLUMNS} FROM exercise_sessions WHERE id = ?1");
        let row = sqlx::query(&select)
            .bind(patch.id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?
            .ok_or(StorageError::NotFound)?;
        let current = map_session_row(&row)?;

        // Validate the merged record before writing only the patched columns.
        let next = current
            .apply_patch(patch, updated_on)
            .map_err(|e| StorageError::Invalid(e.to_string()))?;

        let fields = [
            (
                "folder_path",
                assignment(&patch.folder_path, |v| Assign::Text(v.as_str())),
            ),
            (
                "command_args",
                assignment(&patch.command_args, |v| Assign::Text(v.as_str())),
            ),
            ("completed_on", assignment(&patch.completed_on, |v| Assign::Time(*v))),
            ("updated_on", Some(Assign::Time(next.updated_on()))),
        ];

        let mut sql = String::from("UPDATE exercise_sessions SET ");
        let mut bind_index = 1;
        let mut sets = Vec::new();
        let mut binds = Vec::new();
        for (column, assign) in fields {
            match assign {
                None => {}
                Some(Assign::Null) => sets.push(format!("{column} = NULL")),
                Some(value) => {
                    sets.push(format!("{column} = ?{bind_index}"));
                    bind_index += 1;
                    binds.push(value);
                }
            }
        }
        sql.push_str(&sets.join(", "));
        sql.push_str(&format!(" WHERE id = ?{bind_index}"));

        let mut query = sqlx::query(&sql);
        for value in binds {
            query = match value {
                Assign::Text(text) => query.bind(normalize_text(text)),
                Assign::Time(at) => query.bind(at),
                Assign::Null => query,
            };
        }
        query = query.bind(patch.id.to_string());
        query.execute(&mut *tx).await.map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(next)
    }

    async fn completed_exercise_ids(&self) -> Result<Vec<ExerciseId>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT DISTINCT exercise_id
                FROM exercise_sessions
                WHERE completed_on IS NOT NULL
                ORDER BY exercise_id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("exercise_id")
                    .map(ExerciseId::new)
                    .map_err(ser)
            })
            .collect()
    }
}

// Blank text is stored as NULL, matching `ExerciseSession::apply_patch`.
fn normalize_text(text: &str) -> Option<&str> {
    if text.trim().is_empty() { None } else { Some(text) }
}

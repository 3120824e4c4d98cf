use playground_core::model::{Exercise, ExerciseId};

use super::SqliteRepository;
use super::mapping::{db_err, map_exercise_row};
use crate::repository::{ExerciseRepository, StorageError};

#[async_trait::async_trait]
impl ExerciseRepository for SqliteRepository {
    async fn upsert_exercise(&self, exercise: &Exercise, position: u32) -> Result<(), StorageError> {
        sqlx::query(
            r"
                INSERT INTO exercises (id, name, markdown, position)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    markdown = excluded.markdown,
                    position = excluded.position
            ",
        )
        .bind(exercise.id().as_str())
        .bind(exercise.name())
        .bind(exercise.markdown().as_str())
        .bind(i64::from(position))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_exercise(&self, id: &ExerciseId) -> Result<Option<Exercise>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT id, name, markdown
                FROM exercises
                WHERE id = ?1
            ",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_exercise_row).transpose()
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, name, markdown
                FROM exercises
                ORDER BY position ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_exercise_row).collect()
    }
}

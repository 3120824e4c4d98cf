use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use storage::Storage;
use storage::catalog_dir;
use storage::repository::ExerciseRepository;

use crate::Clock;
use crate::bootstrap::AppBootstrap;
use crate::error::AppServicesError;
use crate::gateway::{
    BackendGateway, CommandFolderPicker, CommandVerifier, LocalGateway, MarkdownSource,
};
use crate::store::ExerciseStore;

/// Settings for the in-process backend.
#[derive(Debug, Clone)]
pub struct AppServicesConfig {
    pub db_url: String,
    pub exercises_dir: PathBuf,
    pub verify_timeout: Duration,
}

/// Assembles the gateway, the exercise store and the bootstrap loader.
#[derive(Clone)]
pub struct AppServices {
    gateway: Arc<dyn BackendGateway>,
    store: Arc<ExerciseStore>,
    bootstrap: Arc<AppBootstrap>,
}

impl AppServices {
    /// Build services over a `SQLite` backed local gateway.
    ///
    /// An empty catalog is filled from the markdown files in
    /// `exercises_dir`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or catalog import fails.
    pub async fn new_sqlite(
        config: &AppServicesConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&config.db_url).await?;
        ensure_catalog(storage.exercises.as_ref(), &config.exercises_dir).await?;

        let gateway = LocalGateway::new(
            storage,
            clock,
            MarkdownSource::new(&config.exercises_dir),
            Arc::new(CommandVerifier::new(config.verify_timeout)),
            Arc::new(CommandFolderPicker::native()),
        );
        Ok(Self::from_gateway(Arc::new(gateway)))
    }

    /// Wire the store and bootstrap loader to an existing gateway.
    #[must_use]
    pub fn from_gateway(gateway: Arc<dyn BackendGateway>) -> Self {
        Self {
            store: Arc::new(ExerciseStore::new(Arc::clone(&gateway))),
            bootstrap: Arc::new(AppBootstrap::new(Arc::clone(&gateway))),
            gateway,
        }
    }

    #[must_use]
    pub fn gateway(&self) -> Arc<dyn BackendGateway> {
        Arc::clone(&self.gateway)
    }

    #[must_use]
    pub fn store(&self) -> Arc<ExerciseStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn bootstrap(&self) -> Arc<AppBootstrap> {
        Arc::clone(&self.bootstrap)
    }
}

async fn ensure_catalog(
    exercises: &dyn ExerciseRepository,
    dir: &Path,
) -> Result<(), AppServicesError> {
    if !exercises.list_exercises().await?.is_empty() {
        return Ok(());
    }
    if !dir.is_dir() {
        tracing::warn!(dir = %dir.display(), "exercise directory missing; catalog stays empty");
        return Ok(());
    }

    let entries = catalog_dir::scan(dir)?;
    for entry in &entries {
        exercises
            .upsert_exercise(&entry.exercise, entry.position)
            .await?;
    }
    tracing::info!(count = entries.len(), dir = %dir.display(), "imported exercise catalog");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::model::{Exercise, ExerciseId, MarkdownRef};
    use storage::InMemoryRepository;

    #[tokio::test]
    async fn empty_catalog_is_imported_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("01_intro.md"), "# Intro\n").unwrap();
        std::fs::write(dir.path().join("02_traits.md"), "# Traits\n").unwrap();
        let repo = InMemoryRepository::new();

        ensure_catalog(&repo, dir.path()).await.unwrap();

        let names: Vec<String> = repo
            .list_exercises()
            .await
            .unwrap()
            .iter()
            .map(|e| e.name().to_owned())
            .collect();
        assert_eq!(names, vec!["Intro", "Traits"]);
    }

    #[tokio::test]
    async fn existing_catalog_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("01_intro.md"), "# Intro\n").unwrap();
        let repo = InMemoryRepository::new();
        let kept = Exercise::new(ExerciseId::new("kept"), "Kept", MarkdownRef::new("kept.md")).unwrap();
        repo.upsert_exercise(&kept, 0).await.unwrap();

        ensure_catalog(&repo, dir.path()).await.unwrap();

        assert_eq!(repo.list_exercises().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn missing_directory_is_not_fatal() {
        let repo = InMemoryRepository::new();
        ensure_catalog(&repo, Path::new("/no/such/exercises"))
            .await
            .unwrap();
        assert!(repo.list_exercises().await.unwrap().is_empty());
    }
}

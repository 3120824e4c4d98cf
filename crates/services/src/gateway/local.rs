use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;

use playground_core::Clock;
use playground_core::model::{
    BootstrapInfo, Exercise, ExerciseId, ExerciseSession, MarkdownRef, NewSession, Patch,
    SessionId, SessionPatch, VerificationReport,
};
use storage::{Storage, StorageError};

use super::{BackendGateway, FolderPicker, MarkdownSource, Verifier};
use crate::error::GatewayError;

/// Descriptive metadata reported by `load_bootstrap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalGatewayConfig {
    pub app_name: String,
    pub backend_version: String,
    pub support_link: String,
    /// Ask `rustc --version` for the installed toolchain.
    pub probe_toolchain: bool,
}

impl Default for LocalGatewayConfig {
    fn default() -> Self {
        Self {
            app_name: "Rust Playground".into(),
            backend_version: env!("CARGO_PKG_VERSION").into(),
            support_link: "https://github.com/Jozefpodlecki/rust_playground".into(),
            probe_toolchain: true,
        }
    }
}

/// In-process backend over `Storage`, a markdown directory and local tools.
#[derive(Clone)]
pub struct LocalGateway {
    storage: Storage,
    clock: Clock,
    markdown: MarkdownSource,
    verifier: Arc<dyn Verifier>,
    folder_picker: Arc<dyn FolderPicker>,
    config: LocalGatewayConfig,
}

impl LocalGateway {
    #[must_use]
    pub fn new(
        storage: Storage,
        clock: Clock,
        markdown: MarkdownSource,
        verifier: Arc<dyn Verifier>,
        folder_picker: Arc<dyn FolderPicker>,
    ) -> Self {
        Self {
            storage,
            clock,
            markdown,
            verifier,
            folder_picker,
            config: LocalGatewayConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LocalGatewayConfig) -> Self {
        self.config = config;
        self
    }

    async fn require_session(&self, id: SessionId) -> Result<ExerciseSession, GatewayError> {
        self.storage
            .sessions
            .get_session(id)
            .await?
            .ok_or_else(|| GatewayError::NotFound(format!("session {id}")))
    }
}

#[async_trait]
impl BackendGateway for LocalGateway {
    async fn load_bootstrap(&self) -> Result<BootstrapInfo, GatewayError> {
        let toolchain_version = if self.config.probe_toolchain {
            rustc_version().await
        } else {
            None
        };

        Ok(BootstrapInfo {
            app_name: self.config.app_name.clone(),
            backend_version: self.config.backend_version.clone(),
            toolchain_version,
            support_link: self.config.support_link.clone(),
            loaded_on: self.clock.now(),
        })
    }

    async fn list_exercises(&self) -> Result<Vec<Exercise>, GatewayError> {
        Ok(self.storage.exercises.list_exercises().await?)
    }

    async fn last_session(&self) -> Result<Option<ExerciseSession>, GatewayError> {
        Ok(self.storage.sessions.last_session().await?)
    }

    async fn create_session(&self, draft: NewSession) -> Result<ExerciseSession, GatewayError> {
        let exercise_id = draft.exercise_id.clone();
        if self
            .storage
            .exercises
            .get_exercise(&exercise_id)
            .await?
            .is_none()
        {
            return Err(GatewayError::NotFound(format!("exercise {exercise_id}")));
        }

        let session = ExerciseSession::start(SessionId::generate(), draft, self.clock.now());
        self.storage.sessions.insert_session(&session).await?;
        tracing::info!(session_id = %session.id(), %exercise_id, "session created");
        Ok(session)
    }

    async fn update_session(&self, patch: SessionPatch) -> Result<ExerciseSession, GatewayError> {
        let updated = self
            .storage
            .sessions
            .update_session(&patch, self.clock.now())
            .await
            .map_err(|err| match err {
                StorageError::NotFound => GatewayError::NotFound(format!("session {}", patch.id)),
                other => other.into(),
            })?;
        tracing::debug!(session_id = %updated.id(), "session updated");
        Ok(updated)
    }

    async fn verify_exercise(
        &self,
        session_id: SessionId,
    ) -> Result<VerificationReport, GatewayError> {
        let session = self.require_session(session_id).await?;
        let folder = session.folder_path().ok_or_else(|| {
            GatewayError::Rejected(format!("session {session_id} has no project folder"))
        })?;
        let is_dir = tokio::fs::metadata(folder)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(GatewayError::NotFound(format!("project folder {folder}")));
        }

        let run = self
            .verifier
            .run(Path::new(folder), session.command_args())
            .await?;
        let finished_on = self.clock.now();

        let session = if run.passed && !session.is_completed() {
            let patch = SessionPatch::new(session_id).completed_on(Patch::Set(finished_on));
            self.storage
                .sessions
                .update_session(&patch, finished_on)
                .await?
        } else {
            session
        };
        tracing::info!(
            %session_id,
            exercise_id = %session.exercise_id(),
            passed = run.passed,
            "verification recorded"
        );

        Ok(VerificationReport {
            session_id,
            exercise_id: session.exercise_id().clone(),
            passed: run.passed,
            output: run.output,
            exit_code: run.exit_code,
            finished_on,
            session,
        })
    }

    async fn fetch_markdown(&self, markdown: MarkdownRef) -> Result<String, GatewayError> {
        self.markdown.read(&markdown).await
    }

    async fn pick_folder(&self) -> Result<Option<String>, GatewayError> {
        self.folder_picker.pick_folder().await
    }

    async fn completed_exercise_ids(&self) -> Result<Vec<ExerciseId>, GatewayError> {
        Ok(self.storage.sessions.completed_exercise_ids().await?)
    }
}

// `rustc 1.85.0 (4d91de4e4 2025-02-17)` becomes `rustc 1.85.0`.
async fn rustc_version() -> Option<String> {
    let output = match Command::new("rustc").arg("--version").output().await {
        Ok(output) if output.status.success() => output,
        Ok(output) => {
            tracing::debug!(status = ?output.status, "rustc --version failed");
            return None;
        }
        Err(err) => {
            tracing::debug!(%err, "rustc not available");
            return None;
        }
    };
    let text = String::from_utf8_lossy(&output.stdout);
    let version = text.split_whitespace().take(2).collect::<Vec<_>>().join(" ");
    (!version.is_empty()).then_some(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::VerificationRun;
    use playground_core::time::{fixed_clock, fixed_now};
    use std::sync::Mutex;

    struct ScriptedVerifier {
        passed: bool,
        seen: Mutex<Vec<(String, Option<String>)>>,
    }

    #[async_trait]
    impl Verifier for ScriptedVerifier {
        async fn run(
            &self,
            folder: &Path,
            command_args: Option<&str>,
        ) -> Result<VerificationRun, GatewayError> {
            self.seen.lock().unwrap().push((
                folder.display().to_string(),
                command_args.map(str::to_owned),
            ));
            Ok(VerificationRun {
                passed: self.passed,
                output: if self.passed { "ok" } else { "assertion failed" }.into(),
                exit_code: Some(if self.passed { 0 } else { 101 }),
            })
        }
    }

    struct CancelPicker;

    #[async_trait]
    impl FolderPicker for CancelPicker {
        async fn pick_folder(&self) -> Result<Option<String>, GatewayError> {
            Ok(None)
        }
    }

    async fn gateway(passed: bool) -> (LocalGateway, Arc<ScriptedVerifier>) {
        let storage = Storage::in_memory();
        let intro = Exercise::new(ExerciseId::new("intro"), "Intro", MarkdownRef::new("01_intro.md"))
            .unwrap();
        storage.exercises.upsert_exercise(&intro, 0).await.unwrap();

        let verifier = Arc::new(ScriptedVerifier {
            passed,
            seen: Mutex::new(Vec::new()),
        });
        let gateway = LocalGateway::new(
            storage,
            fixed_clock(),
            MarkdownSource::new("exercises"),
            verifier.clone(),
            Arc::new(CancelPicker),
        )
        .with_config(LocalGatewayConfig {
            probe_toolchain: false,
            ..LocalGatewayConfig::default()
        });
        (gateway, verifier)
    }

    #[tokio::test]
    async fn bootstrap_reports_configured_metadata() {
        let (gateway, _) = gateway(true).await;
        let info = gateway.load_bootstrap().await.unwrap();

        assert_eq!(info.app_name, "Rust Playground");
        assert_eq!(info.toolchain_version, None);
        assert_eq!(info.loaded_on, fixed_now());
    }

    #[tokio::test]
    async fn create_for_unknown_exercise_is_not_found() {
        let (gateway, _) = gateway(true).await;
        let err = gateway
            .create_session(NewSession::new(ExerciseId::new("ghost")))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_then_update_round_trips_through_storage() {
        let (gateway, _) = gateway(true).await;
        let created = gateway
            .create_session(NewSession::new(ExerciseId::new("intro")).with_command_args("cargo test"))
            .await
            .unwrap();
        assert_eq!(created.started_on(), fixed_now());

        let updated = gateway
            .update_session(
                SessionPatch::new(created.id()).folder_path(Patch::Set("/work/intro".into())),
            )
            .await
            .unwrap();
        assert_eq!(updated.folder_path(), Some("/work/intro"));
        assert_eq!(updated.command_args(), Some("cargo test"));
        assert_eq!(gateway.last_session().await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn update_of_unknown_session_names_the_session() {
        let (gateway, _) = gateway(true).await;
        let id = SessionId::generate();
        let err = gateway
            .update_session(SessionPatch::new(id))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::NotFound(format!("session {id}")));
    }

    #[tokio::test]
    async fn passing_verification_completes_the_session() {
        let (gateway, verifier) = gateway(true).await;
        let project = tempfile::tempdir().unwrap();
        let folder = project.path().display().to_string();
        let session = gateway
            .create_session(NewSession::new(ExerciseId::new("intro")).with_folder_path(&folder))
            .await
            .unwrap();

        let report = gateway.verify_exercise(session.id()).await.unwrap();

        assert!(report.passed);
        assert_eq!(report.exercise_id, ExerciseId::new("intro"));
        assert_eq!(verifier.seen.lock().unwrap()[0], (folder, None));
        assert_eq!(
            gateway.completed_exercise_ids().await.unwrap(),
            vec![ExerciseId::new("intro")]
        );
        assert_eq!(report.session.completed_on(), Some(report.finished_on));
        assert_eq!(
            gateway.last_session().await.unwrap(),
            Some(report.session.clone())
        );
    }

    #[tokio::test]
    async fn failing_verification_leaves_session_open() {
        let (gateway, _) = gateway(false).await;
        let project = tempfile::tempdir().unwrap();
        let session = gateway
            .create_session(
                NewSession::new(ExerciseId::new("intro"))
                    .with_folder_path(project.path().display().to_string()),
            )
            .await
            .unwrap();

        let report = gateway.verify_exercise(session.id()).await.unwrap();

        assert!(!report.passed);
        assert_eq!(report.headline(), Some("assertion failed"));
        assert_eq!(report.session, session);
        assert!(gateway.completed_exercise_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn verification_needs_an_existing_folder() {
        let (gateway, _) = gateway(true).await;
        let no_folder = gateway
            .create_session(NewSession::new(ExerciseId::new("intro")))
            .await
            .unwrap();
        let err = gateway.verify_exercise(no_folder.id()).await.unwrap_err();
        assert!(matches!(err, GatewayError::Rejected(_)));

        let gone = gateway
            .create_session(
                NewSession::new(ExerciseId::new("intro")).with_folder_path("/no/such/project"),
            )
            .await
            .unwrap();
        let err = gateway.verify_exercise(gone.id()).await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound(_)));
    }

    #[tokio::test]
    async fn picker_cancel_is_none() {
        let (gateway, _) = gateway(true).await;
        assert_eq!(gateway.pick_folder().await.unwrap(), None);
    }
}

//! Backend gateway: everything the store needs from the process that owns
//! persistence and verification.

use async_trait::async_trait;

use playground_core::model::{
    BootstrapInfo, Exercise, ExerciseId, ExerciseSession, MarkdownRef, NewSession, SessionId,
    SessionPatch, VerificationReport,
};

use crate::error::GatewayError;

mod folder_picker;
mod local;
mod markdown;
mod verifier;

pub use folder_picker::{CommandFolderPicker, FolderPicker};
pub use local::{LocalGateway, LocalGatewayConfig};
pub use markdown::MarkdownSource;
pub use verifier::{CommandVerifier, VerificationRun, Verifier};

/// Request/response contract between the store and its backend.
///
/// Every call may fail with a `GatewayError`; callers decide whether that is
/// fatal.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Static environment metadata shown once the app has booted.
    async fn load_bootstrap(&self) -> Result<BootstrapInfo, GatewayError>;

    /// Ordered exercise catalog.
    async fn list_exercises(&self) -> Result<Vec<Exercise>, GatewayError>;

    /// Most recently started session, if any.
    async fn last_session(&self) -> Result<Option<ExerciseSession>, GatewayError>;

    async fn create_session(&self, draft: NewSession) -> Result<ExerciseSession, GatewayError>;

    /// Applies `patch` and returns the full stored session.
    async fn update_session(&self, patch: SessionPatch) -> Result<ExerciseSession, GatewayError>;

    /// Runs the user's project for the given session.
    ///
    /// A solution that runs but fails is an `Ok` report with `passed == false`.
    async fn verify_exercise(&self, session_id: SessionId)
    -> Result<VerificationReport, GatewayError>;

    async fn fetch_markdown(&self, markdown: MarkdownRef) -> Result<String, GatewayError>;

    /// Asks the user for a project folder. `None` means the dialog was cancelled.
    async fn pick_folder(&self) -> Result<Option<String>, GatewayError>;

    /// Exercises with at least one completed session.
    async fn completed_exercise_ids(&self) -> Result<Vec<ExerciseId>, GatewayError>;
}

//! Exercise/session store: the single source of truth the UI reads from.
//!
//! State lives in a `watch` channel. Every change publishes a new
//! `StoreSnapshot` with a bumped `revision`, so readers always see a whole,
//! consistent aggregate. Mutating operations go through the backend gateway
//! and replace the current session wholesale with its response.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use playground_core::Progress;
use playground_core::model::{
    Exercise, ExerciseId, ExerciseSession, NewSession, SessionId, SessionPatch,
    VerificationReport, find_exercise,
};

use crate::error::{ReconcileError, StoreError};
use crate::gateway::BackendGateway;


//
// ─── SNAPSHOT ──────────────────────────────────────────────────────────────────
//

/// Mutating operation kinds, each guarded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Verify,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Create => "session create",
            Operation::Update => "session update",
            Operation::Verify => "verification",
        })
    }
}

/// Pending operations, published so the UI can disable re-entrant actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight {
    pub create: bool,
    pub update: bool,
    pub verify: bool,
}

impl InFlight {
    #[must_use]
    pub fn get(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Verify => self.verify,
        }
    }

    fn set(&mut self, op: Operation, value: bool) {
        match op {
            Operation::Create => self.create = value,
            Operation::Update => self.update = value,
            Operation::Verify => self.verify = value,
        }
    }

    #[must_use]
    pub fn any(&self) -> bool {
        self.create || self.update || self.verify
    }
}

/// Where the store is in its load lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StoreStatus {
    #[default]
    Loading,
    Ready,
    Failed(ReconcileError),
}

/// Immutable copy of the store aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub status: StoreStatus,
    pub catalog: Vec<Exercise>,
    pub current_exercise: Option<Exercise>,
    pub current_session: Option<ExerciseSession>,
    pub completed_ids: BTreeSet<ExerciseId>,
    pub in_flight: InFlight,
    /// Incremented on every publication.
    pub revision: u64,
}

impl StoreSnapshot {
    /// Completed exercises against the catalog size.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress::new(self.completed_ids.len(), self.catalog.len())
    }

    /// `100 * completed / total`, clamped to `[0, 100]`; `0` for an empty catalog.
    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.progress().percent()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.status, StoreStatus::Loading)
    }

    #[must_use]
    pub fn is_completed(&self, id: &ExerciseId) -> bool {
        self.completed_ids.contains(id)
    }

    #[must_use]
    pub fn reconcile_error(&self) -> Option<&ReconcileError> {
        match &self.status {
            StoreStatus::Failed(err) => Some(err),
            _ => None,
        }
    }
}

//
// ─── STORE ─────────────────────────────────────────────────────────────────────
//

/// Owns the current exercise, its session and completion progress.
///
/// Construct one per application and hand it to consumers by reference.
/// Dropping the store closes every subscription.
pub struct ExerciseStore {
    gateway: Arc<dyn BackendGateway>,
    state: watch::Sender<StoreSnapshot>,
    loaded: AtomicBool,
}

impl ExerciseStore {
    #[must_use]
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot::default());
        Self {
            gateway,
            state,
            loaded: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn gateway(&self) -> Arc<dyn BackendGateway> {
        Arc::clone(&self.gateway)
    }

    /// Receiver that is notified on every publication.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> StoreStatus {
        self.state.borrow().status.clone()
    }

    #[must_use]
    pub fn catalog(&self) -> Vec<Exercise> {
        self.state.borrow().catalog.clone()
    }

    #[must_use]
    pub fn current_exercise(&self) -> Option<Exercise> {
        self.state.borrow().current_exercise.clone()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<ExerciseSession> {
        self.state.borrow().current_session.clone()
    }

    #[must_use]
    pub fn in_flight(&self) -> InFlight {
        self.state.borrow().in_flight
    }

    #[must_use]
    pub fn progress_percent(&self) -> f64 {
        self.state.borrow().progress_percent()
    }

    /// Loads the catalog and the last session, then resolves the current exercise.
    ///
    /// Runs once per store; later calls do nothing. Faults are logged and
    /// recorded in `StoreStatus::Failed`, never returned.
    pub async fn load(&self) {
        if self.loaded.swap(true, Ordering::SeqCst) {
            tracing::debug!("exercise store already loaded");
            return;
        }

        let catalog = match self.gateway.list_exercises().await {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::error!(%err, "failed to load exercise catalog");
                self.publish(|state| {
                    state.status = StoreStatus::Failed(ReconcileError::CatalogUnavailable(err));
                });
                return;
            }
        };

        let last_session = match self.gateway.last_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(%err, "failed to load last session; starting fresh");
                None
            }
        };

        // Completions of retired exercises would inflate progress.
        let completed_ids = match self.gateway.completed_exercise_ids().await {
            Ok(ids) => ids
                .into_iter()
                .filter(|id| find_exercise(&catalog, id).is_some())
                .collect(),
            Err(err) => {
                tracing::warn!(%err, "failed to load completed exercises");
                BTreeSet::new()
            }
        };

        let resolved = resolve_current(&catalog, last_session.as_ref());
        let (current_exercise, status) = match resolved {
            Ok(exercise) => {
                tracing::info!(
                    exercise_id = %exercise.id(),
                    exercises = catalog.len(),
                    resumed = last_session.is_some(),
                    "exercise store ready"
                );
                (Some(exercise), StoreStatus::Ready)
            }
            Err(err) => {
                tracing::error!(%err, "could not resolve current exercise");
                (None, StoreStatus::Failed(err))
            }
        };

        self.publish(|state| {
            state.catalog = catalog;
            state.current_exercise = current_exercise;
            state.current_session = last_session;
            state.completed_ids = completed_ids;
            state.status = status;
        });
    }

    /// Makes a catalog entry current. The current session is left alone.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownExercise` if `id` is not in the catalog.
    pub fn select_exercise(&self, id: &ExerciseId) -> Result<Exercise, StoreError> {
        let mut selected = None;
        self.state.send_if_modified(|state| {
            let Some(exercise) = find_exercise(&state.catalog, id).cloned() else {
                return false;
            };
            state.current_exercise = Some(exercise.clone());
            // Picking an exercise by hand resolves a dangling session reference.
            if matches!(
                state.status,
                StoreStatus::Failed(ReconcileError::DanglingSessionReference { .. })
            ) {
                state.status = StoreStatus::Ready;
            }
            state.revision += 1;
            selected = Some(exercise);
            true
        });

        selected.ok_or_else(|| StoreError::UnknownExercise(id.clone()))
    }

    /// Creates a session and makes it current.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownExercise` for exercises outside the catalog,
    /// `StoreError::Busy` while another create is pending and
    /// `StoreError::SessionOperationFailed` if the gateway rejects the call.
    pub async fn create_session(&self, draft: NewSession) -> Result<ExerciseSession, StoreError> {
        if !self.in_catalog(&draft.exercise_id) {
            return Err(StoreError::UnknownExercise(draft.exercise_id));
        }
        let _guard = self.begin(Operation::Create)?;

        let session = self.gateway.create_session(draft).await.map_err(|err| {
            tracing::warn!(%err, "session create failed");
            StoreError::SessionOperationFailed(err)
        })?;
        self.replace_session(&session);
        Ok(session)
    }

    /// Sends `patch` to the gateway verbatim and makes the response current.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NoActiveSession` or `StoreError::SessionMismatch`
    /// when `patch` does not target the current session, `StoreError::Busy`
    /// while another update is pending and `StoreError::SessionOperationFailed`
    /// if the gateway rejects the call.
    pub async fn update_session(&self, patch: SessionPatch) -> Result<ExerciseSession, StoreError> {
        self.require_current(patch.id)?;
        let _guard = self.begin(Operation::Update)?;

        let session = self.gateway.update_session(patch).await.map_err(|err| {
            tracing::warn!(%err, "session update failed");
            StoreError::SessionOperationFailed(err)
        })?;
        self.replace_session(&session);
        Ok(session)
    }

    /// Runs verification for the current session.
    ///
    /// A pass replaces the current session with the backend's record and
    /// marks the exercise completed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::VerificationTransportFailed` when the check could
    /// not run and `StoreError::VerificationFailed` when it ran and did not
    /// pass. Precondition failures and `StoreError::Busy` leave state untouched.
    pub async fn verify_exercise(
        &self,
        session_id: SessionId,
    ) -> Result<VerificationReport, StoreError> {
        let session = self.require_current(session_id)?;
        if !session.has_folder() {
            return Err(StoreError::MissingFolder(session_id));
        }
        let _guard = self.begin(Operation::Verify)?;

        let report = self
            .gateway
            .verify_exercise(session_id)
            .await
            .map_err(|err| {
                tracing::warn!(%err, %session_id, "verification could not run");
                StoreError::VerificationTransportFailed(err)
            })?;

        if !report.passed {
            tracing::info!(%session_id, exit_code = ?report.exit_code, "verification failed");
            return Err(StoreError::VerificationFailed {
                report: Box::new(report),
            });
        }

        // A session created while the check ran stays current.
        if report.session.id() == session_id && self.is_current(session_id) {
            self.replace_session(&report.session);
        }
        self.mark_completed(report.exercise_id.clone());
        Ok(report)
    }

    /// Records a completion learned outside `verify_exercise`.
    pub fn mark_completed(&self, id: ExerciseId) {
        self.state.send_if_modified(|state| {
            if state.completed_ids.insert(id) {
                state.revision += 1;
                true
            } else {
                false
            }
        });
    }

    fn publish(&self, change: impl FnOnce(&mut StoreSnapshot)) {
        self.state.send_modify(|state| {
            change(state);
            state.revision += 1;
        });
    }

    fn in_catalog(&self, id: &ExerciseId) -> bool {
        find_exercise(&self.state.borrow().catalog, id).is_some()
    }

    fn is_current(&self, id: SessionId) -> bool {
        self.state
            .borrow()
            .current_session
            .as_ref()
            .is_some_and(|session| session.id() == id)
    }

    fn require_current(&self, id: SessionId) -> Result<ExerciseSession, StoreError> {
        let state = self.state.borrow();
        let current = state
            .current_session
            .as_ref()
            .ok_or(StoreError::NoActiveSession)?;
        if current.id() != id {
            return Err(StoreError::SessionMismatch {
                expected: current.id(),
                actual: id,
            });
        }
        Ok(current.clone())
    }

    // Last response wins; no field merge with the previous session.
    fn replace_session(&self, session: &ExerciseSession) {
        self.publish(|state| {
            state.current_session = Some(session.clone());
            if session.is_completed() {
                state.completed_ids.insert(session.exercise_id().clone());
            }
        });
    }

    fn begin(&self, op: Operation) -> Result<InFlightGuard<'_>, StoreError> {
        let acquired = self.state.send_if_modified(|state| {
            if state.in_flight.get(op) {
                return false;
            }
            state.in_flight.set(op, true);
            state.revision += 1;
            true
        });
        if !acquired {
            tracing::debug!(%op, "rejected re-entrant call");
            return Err(StoreError::Busy(op));
        }
        Ok(InFlightGuard {
            state: &self.state,
            op,
        })
    }
}

/// Clears an in-flight flag when the operation ends, including on error.
struct InFlightGuard<'a> {
    state: &'a watch::Sender<StoreSnapshot>,
    op: Operation,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let op = self.op;
        self.state.send_modify(|state| {
            state.in_flight.set(op, false);
            state.revision += 1;
        });
    }
}

/// Picks the exercise the UI should open with.
///
/// The last session's exercise wins; otherwise the first catalog entry.
pub(crate) fn resolve_current(
    catalog: &[Exercise],
    last_session: Option<&ExerciseSession>,
) -> Result<Exercise, ReconcileError> {
    match last_session {
        Some(session) => find_exercise(catalog, session.exercise_id())
            .cloned()
            .ok_or_else(|| ReconcileError::DanglingSessionReference {
                session_id: session.id(),
                exercise_id: session.exercise_id().clone(),
            }),
        None => catalog
            .first()
            .cloned()
            .ok_or(ReconcileError::NoExercisesAvailable),
    }
}

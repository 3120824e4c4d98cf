use playground_core::model::{
    Exercise, ExerciseSession, NewSession, Patch, SessionId, SessionPatch, VerificationReport,
};
use services::{GatewayError, StoreError, StoreSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// Feedback line shown under the action buttons.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionMessage {
    pub tone: Tone,
    pub title: String,
    pub detail: Option<String>,
}

impl ActionMessage {
    fn new(tone: Tone, title: impl Into<String>) -> Self {
        Self {
            tone,
            title: title.into(),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if !detail.trim().is_empty() {
            self.detail = Some(detail);
        }
        self
    }

    #[must_use]
    pub fn class(&self) -> &'static str {
        match self.tone {
            Tone::Info => "message info",
            Tone::Success => "message success",
            Tone::Warning => "message warning",
            Tone::Error => "message error",
        }
    }
}

/// State of the action panel for the exercise on screen.
///
/// The store keeps a single current session; it only counts here when it
/// belongs to the exercise being shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionPanelVm {
    pub session_id: Option<SessionId>,
    pub folder: Option<String>,
    pub command_args: String,
    pub completed: bool,
    pub busy: bool,
    pub verifying: bool,
}

impl ActionPanelVm {
    #[must_use]
    pub fn folder_label(&self) -> &str {
        self.folder.as_deref().unwrap_or("No folder selected")
    }

    /// Saving without a session starts one, so only a pending write blocks it.
    #[must_use]
    pub fn can_save_args(&self) -> bool {
        !self.busy
    }

    #[must_use]
    pub fn can_verify(&self) -> bool {
        self.session_id.is_some() && self.folder.is_some() && !self.verifying
    }

    #[must_use]
    pub fn verify_label(&self) -> &'static str {
        if self.verifying { "Verifying…" } else { "Verify" }
    }
}

#[must_use]
pub fn map_action_panel(snapshot: &StoreSnapshot, exercise: &Exercise) -> ActionPanelVm {
    let session = session_for(snapshot, exercise);
    ActionPanelVm {
        session_id: session.map(ExerciseSession::id),
        folder: session.and_then(|s| s.folder_path()).map(str::to_owned),
        command_args: session
            .and_then(|s| s.command_args())
            .unwrap_or_default()
            .to_owned(),
        completed: snapshot.is_completed(exercise.id()),
        busy: snapshot.in_flight.create || snapshot.in_flight.update,
        verifying: snapshot.in_flight.verify,
    }
}

#[must_use]
pub fn session_for<'a>(
    snapshot: &'a StoreSnapshot,
    exercise: &Exercise,
) -> Option<&'a ExerciseSession> {
    snapshot
        .current_session
        .as_ref()
        .filter(|session| session.exercise_id() == exercise.id())
}

/// Blank input clears the stored arguments so the default command runs.
#[must_use]
pub fn command_args_patch(raw: &str) -> Patch<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Patch::Clear
    } else {
        Patch::Set(trimmed.to_owned())
    }
}

/// Store call behind the "Save arguments" button.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveArgs {
    Create(NewSession),
    Update(SessionPatch),
}

#[must_use]
pub fn save_args_request(vm: &ActionPanelVm, exercise: &Exercise, raw: &str) -> SaveArgs {
    let patch = command_args_patch(raw);
    match vm.session_id {
        Some(id) => SaveArgs::Update(SessionPatch::new(id).command_args(patch)),
        None => {
            let mut draft = NewSession::new(exercise.id().clone());
            if let Patch::Set(command) = patch {
                draft = draft.with_command_args(command);
            }
            SaveArgs::Create(draft)
        }
    }
}

#[must_use]
pub fn verification_message(result: &Result<VerificationReport, StoreError>) -> ActionMessage {
    match result {
        Ok(report) => ActionMessage::new(Tone::Success, "Exercise complete. Nice work!")
            .with_detail(report.headline().unwrap_or_default()),
        Err(err) => store_error_message(err),
    }
}

#[must_use]
pub fn store_error_message(err: &StoreError) -> ActionMessage {
    match err {
        StoreError::VerificationFailed { report } => {
            let title = match report.exit_code {
                Some(code) => format!("Not quite yet: the program exited with code {code}."),
                None => "Not quite yet: the program did not finish cleanly.".to_owned(),
            };
            ActionMessage::new(Tone::Warning, title).with_detail(report.output.clone())
        }
        StoreError::VerificationTransportFailed(cause) => {
            ActionMessage::new(Tone::Error, "Verification could not run.")
                .with_detail(gateway_detail(cause))
        }
        StoreError::MissingFolder(_) => {
            ActionMessage::new(Tone::Info, "Choose a project folder before verifying.")
        }
        StoreError::Busy(op) => {
            ActionMessage::new(Tone::Info, format!("Please wait, {op} is still running."))
        }
        StoreError::SessionOperationFailed(cause) => {
            ActionMessage::new(Tone::Error, "Your session could not be saved.")
                .with_detail(gateway_detail(cause))
        }
        StoreError::NoActiveSession | StoreError::SessionMismatch { .. } => {
            ActionMessage::new(Tone::Info, "Choose a project folder to start this exercise.")
        }
        other => ActionMessage::new(Tone::Error, other.to_string()),
    }
}

#[must_use]
pub fn folder_picker_message(err: &GatewayError) -> ActionMessage {
    ActionMessage::new(Tone::Error, "The folder picker could not be opened.")
        .with_detail(gateway_detail(err))
}

fn gateway_detail(err: &GatewayError) -> String {
    match err {
        GatewayError::Process(detail) => format!("Could not start the command: {detail}"),
        GatewayError::NotFound(detail) => format!("Missing: {detail}"),
        other => other.to_string(),
    }
}

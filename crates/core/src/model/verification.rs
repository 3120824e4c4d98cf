use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ExerciseId, SessionId};
use crate::model::session::ExerciseSession;

/// Outcome of a verification run that actually executed.
///
/// `passed == false` means the user's solution ran and was judged wrong. A run
/// that could not execute at all is reported as an error by the gateway, never
/// as a report.
///
/// `session` is the backend's record after the run, so a pass carries the
/// `completed_on` it just stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub session_id: SessionId,
    pub exercise_id: ExerciseId,
    pub passed: bool,
    pub output: String,
    pub exit_code: Option<i32>,
    pub finished_on: DateTime<Utc>,
    pub session: ExerciseSession,
}

impl VerificationReport {
    /// Last non-empty line of the captured output, for compact display.
    #[must_use]
    pub fn headline(&self) -> Option<&str> {
        self.output.lines().rev().map(str::trim).find(|line| !line.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::session::NewSession;
    use crate::time::fixed_now;

    #[test]
    fn headline_skips_trailing_blank_lines() {
        let session = ExerciseSession::start(
            SessionId::generate(),
            NewSession::new(ExerciseId::new("a")),
            fixed_now(),
        );
        let report = VerificationReport {
            session_id: session.id(),
            exercise_id: ExerciseId::new("a"),
            passed: false,
            output: "Compiling demo\nerror: expected 42\n\n".into(),
            exit_code: Some(101),
            finished_on: fixed_now(),
            session,
        };
        assert_eq!(report.headline(), Some("error: expected 42"));
    }
}

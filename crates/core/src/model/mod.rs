mod bootstrap;
mod exercise;
mod ids;
mod session;
mod verification;

pub use ids::{ExerciseId, MarkdownRef, ParseIdError, SessionId};

pub use bootstrap::BootstrapInfo;
pub use exercise::{Exercise, ExerciseError, find_exercise};
pub use session::{ExerciseSession, NewSession, Patch, SessionError, SessionPatch};
pub use verification::VerificationReport;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static descriptive metadata shown once the application has booted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootstrapInfo {
    pub app_name: String,
    pub backend_version: String,
    /// Toolchain reported by the backend host (e.g. `rustc 1.85.0`), when available.
    pub toolchain_version: Option<String>,
    pub support_link: String,
    pub loaded_on: DateTime<Utc>,
}

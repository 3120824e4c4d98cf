use chrono::{DateTime, Utc};
use playground_core::model::BootstrapInfo;
use services::GatewayError;

/// Lines shown on the about page and in the sidebar footer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BootstrapVm {
    pub app_name: String,
    pub version_line: String,
    pub toolchain_line: String,
    pub loaded_line: String,
    pub support_link: Option<String>,
}

#[must_use]
pub fn map_bootstrap(info: &BootstrapInfo) -> BootstrapVm {
    let support_link = info.support_link.trim();
    BootstrapVm {
        app_name: info.app_name.clone(),
        version_line: format!("Version {}", info.backend_version),
        toolchain_line: info
            .toolchain_version
            .as_deref()
            .map_or_else(|| "Rust toolchain not found".to_owned(), str::to_owned),
        loaded_line: format!("Started {}", format_timestamp(info.loaded_on)),
        support_link: (!support_link.is_empty()).then(|| support_link.to_owned()),
    }
}

#[must_use]
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

#[must_use]
pub fn bootstrap_failure_message(err: &GatewayError) -> String {
    format!("The playground backend did not start: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::time::fixed_now;

    fn info(toolchain: Option<&str>, support_link: &str) -> BootstrapInfo {
        BootstrapInfo {
            app_name: "Rust Playground".into(),
            backend_version: "0.1.0".into(),
            toolchain_version: toolchain.map(str::to_owned),
            support_link: support_link.into(),
            loaded_on: fixed_now(),
        }
    }

    #[test]
    fn maps_versions_and_timestamp() {
        let vm = map_bootstrap(&info(Some("rustc 1.85.0"), "https://example.com/support"));

        assert_eq!(vm.version_line, "Version 0.1.0");
        assert_eq!(vm.toolchain_line, "rustc 1.85.0");
        assert_eq!(vm.loaded_line, "Started 2023-11-14 22:13 UTC");
        assert_eq!(vm.support_link.as_deref(), Some("https://example.com/support"));
    }

    #[test]
    fn missing_toolchain_and_blank_link() {
        let vm = map_bootstrap(&info(None, "  "));

        assert_eq!(vm.toolchain_line, "Rust toolchain not found");
        assert_eq!(vm.support_link, None);
    }
}

use std::process::Command;

use super::UiLinkOpener;

/// Hands links to the OS browser instead of navigating the webview.
pub struct DesktopLinkOpener;

impl UiLinkOpener for DesktopLinkOpener {
    fn open_url(&self, url: &str) {
        let url = url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            tracing::warn!(url, "refusing to open non-web link");
            return;
        }

        let spawned = if cfg!(target_os = "macos") {
            Command::new("open").arg(url).spawn()
        } else if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", "start", "", url]).spawn()
        } else {
            Command::new("xdg-open").arg(url).spawn()
        };

        if let Err(err) = spawned {
            tracing::warn!(%err, url, "failed to open link");
        }
    }
}

use std::sync::Arc;

use services::{AppBootstrap, BackendGateway, ExerciseStore};

use crate::platform::{DesktopLinkOpener, LinkOpenerRef};

/// What the composition root hands to the UI.
pub trait UiApp: Send + Sync {
    fn store(&self) -> Arc<ExerciseStore>;
    fn bootstrap(&self) -> Arc<AppBootstrap>;
    fn gateway(&self) -> Arc<dyn BackendGateway>;

    fn link_opener(&self) -> LinkOpenerRef {
        Arc::new(DesktopLinkOpener)
    }
}

#[derive(Clone)]
pub struct AppContext {
    store: Arc<ExerciseStore>,
    bootstrap: Arc<AppBootstrap>,
    gateway: Arc<dyn BackendGateway>,
    link_opener: LinkOpenerRef,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            store: app.store(),
            bootstrap: app.bootstrap(),
            gateway: app.gateway(),
            link_opener: app.link_opener(),
        }
    }

    #[must_use]
    pub fn store(&self) -> Arc<ExerciseStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn bootstrap(&self) -> Arc<AppBootstrap> {
        Arc::clone(&self.bootstrap)
    }

    /// Direct gateway access for reads the store does not cache (markdown, folder picker).
    #[must_use]
    pub fn gateway(&self) -> Arc<dyn BackendGateway> {
        Arc::clone(&self.gateway)
    }

    #[must_use]
    pub fn link_opener(&self) -> LinkOpenerRef {
        Arc::clone(&self.link_opener)
    }
}

// Provided by the application composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}

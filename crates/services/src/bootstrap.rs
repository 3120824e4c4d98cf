use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use playground_core::model::BootstrapInfo;

use crate::error::GatewayError;
use crate::gateway::BackendGateway;

/// Boot progress that gates the first render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BootstrapState {
    #[default]
    Loading,
    Ready(BootstrapInfo),
    Failed(GatewayError),
}

impl BootstrapState {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, BootstrapState::Loading)
    }

    #[must_use]
    pub fn info(&self) -> Option<&BootstrapInfo> {
        match self {
            BootstrapState::Ready(info) => Some(info),
            _ => None,
        }
    }
}

/// One-shot loader for the environment metadata shown at startup.
///
/// There is no retry: a failed load stays `Failed`.
pub struct AppBootstrap {
    gateway: Arc<dyn BackendGateway>,
    state: watch::Sender<BootstrapState>,
    started: AtomicBool,
}

impl AppBootstrap {
    #[must_use]
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        let (state, _) = watch::channel(BootstrapState::Loading);
        Self {
            gateway,
            state,
            started: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<BootstrapState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn state(&self) -> BootstrapState {
        self.state.borrow().clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Fetches the bootstrap metadata on the first call and returns the
    /// resulting state. Later calls return the current state unchanged.
    pub async fn load(&self) -> BootstrapState {
        if self.started.swap(true, Ordering::SeqCst) {
            return self.state();
        }

        let next = match self.gateway.load_bootstrap().await {
            Ok(info) => {
                tracing::info!(
                    app = %info.app_name,
                    version = %info.backend_version,
                    toolchain = info.toolchain_version.as_deref().unwrap_or("unknown"),
                    "bootstrap loaded"
                );
                BootstrapState::Ready(info)
            }
            Err(err) => {
                tracing::error!(%err, "bootstrap failed");
                BootstrapState::Failed(err)
            }
        };
        self.state.send_replace(next.clone());
        next
    }
}

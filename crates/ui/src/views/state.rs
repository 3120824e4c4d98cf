use dioxus::prelude::*;
use services::{BootstrapState, GatewayError, StoreSnapshot};

use crate::context::AppContext;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewError {
    NotFound,
    Unknown,
}

impl ViewError {
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            ViewError::NotFound => "This exercise has no description yet.",
            ViewError::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl From<GatewayError> for ViewError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(_) => ViewError::NotFound,
            _ => ViewError::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Ready(T),
    Error(ViewError),
}

#[must_use]
pub fn view_state_from_resource<T: Clone>(
    resource: Resource<Result<T, ViewError>>,
) -> ViewState<T> {
    match resource.state().cloned() {
        UseResourceState::Pending => ViewState::Loading,
        UseResourceState::Ready => match resource.value().read().as_ref() {
            Some(Ok(data)) => ViewState::Ready(data.clone()),
            Some(Err(err)) => ViewState::Error(*err),
            None => ViewState::Error(ViewError::Unknown),
        },
        UseResourceState::Paused | UseResourceState::Stopped => ViewState::Idle,
    }
}

/// Mirrors the store's published snapshot into a signal.
pub fn use_store_snapshot() -> Signal<StoreSnapshot> {
    let store = use_context::<AppContext>().store();
    let snapshot = use_signal(|| store.snapshot());
    use_future(move || {
        let mut rx = store.subscribe();
        let mut snapshot = snapshot;
        async move {
            loop {
                let next = rx.borrow_and_update().clone();
                if *snapshot.peek() != next {
                    snapshot.set(next);
                }
                // Closed when the store is dropped.
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    });
    snapshot
}

/// Mirrors the bootstrap loader state into a signal.
pub fn use_bootstrap_state() -> Signal<BootstrapState> {
    let bootstrap = use_context::<AppContext>().bootstrap();
    let state = use_signal(|| bootstrap.state());
    use_future(move || {
        let mut rx = bootstrap.subscribe();
        let mut state = state;
        async move {
            loop {
                let next = rx.borrow_and_update().clone();
                if *state.peek() != next {
                    state.set(next);
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
    });
    state
}

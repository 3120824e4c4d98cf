use dioxus::prelude::*;
use dioxus_router::Router;
use services::BootstrapState;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::use_bootstrap_state;
use crate::vm::bootstrap_failure_message;

#[component]
pub fn App() -> Element {
    rsx! {
        document::Stylesheet { href: asset!("/assets/style.css") }

        document::Title { "Rust Playground" }

        div { class: "app-root",
            ErrorBoundary {
                handle_error: |errors: ErrorContext| rsx! {
                    div { class: "fatal",
                        h1 { "Something went wrong" }
                        pre { "{errors:?}" }
                    }
                },
                BootGate {}
            }
        }
    }
}

/// Starts both loaders and holds the router back until bootstrap settles.
#[component]
pub fn BootGate() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_bootstrap_state();

    let bootstrap = ctx.bootstrap();
    use_future(move || {
        let bootstrap = bootstrap.clone();
        async move {
            bootstrap.load().await;
        }
    });
    let store = ctx.store();
    use_future(move || {
        let store = store.clone();
        async move {
            store.load().await;
        }
    });

    let current = state.read().clone();
    match current {
        BootstrapState::Loading => rsx! {
            div { class: "splash",
                p { "Starting Rust Playground…" }
            }
        },
        BootstrapState::Failed(err) => {
            let message = bootstrap_failure_message(&err);
            rsx! {
                div { class: "fatal",
                    h1 { "Rust Playground could not start" }
                    p { "{message}" }
                }
            }
        }
        BootstrapState::Ready(_) => rsx! { Router::<Route> {} },
    }
}

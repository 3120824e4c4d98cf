use dioxus::prelude::*;
use dioxus_router::{Link, Outlet, Routable, use_navigator};

use crate::context::AppContext;
use crate::views::{AboutView, ExerciseView, use_bootstrap_state, use_store_snapshot};
use crate::vm::{CatalogItemVm, map_catalog, map_progress};

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Layout)]
        #[route("/", ExerciseView)] Home {},
        #[route("/about", AboutView)] About {},
}

#[component]
fn Layout() -> Element {
    rsx! {
        div { class: "app",
            Sidebar {}
            main { class: "content",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn Sidebar() -> Element {
    let snapshot = use_store_snapshot();
    let bootstrap = use_bootstrap_state();
    let (items, progress) = {
        let snapshot = snapshot.read();
        (map_catalog(&snapshot), map_progress(&snapshot))
    };
    let title = bootstrap
        .read()
        .info()
        .map_or_else(|| "Rust Playground".to_owned(), |info| info.app_name.clone());
    let progress_label = progress.label();
    let bar_style = progress.bar_style();

    rsx! {
        nav { class: "sidebar",
            h1 { "{title}" }
            div { class: "progress",
                span { class: "progress-label", "{progress_label}" }
                div { class: "progress-track",
                    div { class: "progress-fill", style: "{bar_style}" }
                }
            }
            ul { class: "exercise-list",
                for item in items {
                    CatalogItem { key: "{item.id}", item: item.clone() }
                }
            }
            Link { class: "about-link", to: Route::About {}, "About" }
        }
    }
}

#[component]
fn CatalogItem(item: CatalogItemVm) -> Element {
    let store = use_context::<AppContext>().store();
    let navigator = use_navigator();
    let id = item.id.clone();

    rsx! {
        li { class: item.class(),
            button {
                r#type: "button",
                onclick: move |_| {
                    if let Err(err) = store.select_exercise(&id) {
                        tracing::warn!(%err, "exercise selection failed");
                    }
                    navigator.push(Route::Home {});
                },
                span { class: "mark", "{item.mark()}" }
                span { class: "name", "{item.name}" }
            }
        }
    }
}

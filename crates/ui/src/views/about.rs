use dioxus::prelude::*;

use crate::context::AppContext;
use crate::views::use_bootstrap_state;
use crate::vm::map_bootstrap;

#[component]
pub fn AboutView() -> Element {
    let ctx = use_context::<AppContext>();
    let state = use_bootstrap_state();
    let Some(vm) = state.read().info().map(map_bootstrap) else {
        return rsx! {
            div { class: "page",
                p { class: "muted", "Loading…" }
            }
        };
    };

    let opener = ctx.link_opener();
    let support_link = vm.support_link.clone();

    rsx! {
        div { class: "page about",
            h2 { "{vm.app_name}" }
            ul { class: "facts",
                li { "{vm.version_line}" }
                li { "{vm.toolchain_line}" }
                li { "{vm.loaded_line}" }
            }
            if let Some(link) = support_link {
                button {
                    r#type: "button",
                    class: "btn link",
                    onclick: move |_| opener.open_url(&link),
                    "Report an issue"
                }
            }
        }
    }
}

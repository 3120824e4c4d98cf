use dioxus::prelude::*;
use playground_core::model::{Exercise, MarkdownRef, NewSession, Patch, SessionPatch};

use crate::context::AppContext;
use crate::views::{ViewError, ViewState, use_store_snapshot, view_state_from_resource};
use crate::vm::{
    ActionMessage, SaveArgs, command_args_patch, folder_picker_message, map_action_panel,
    markdown_to_html, reconcile_message, save_args_request, store_error_message,
    verification_message,
};

#[component]
pub fn ExerciseView() -> Element {
    let snapshot = use_store_snapshot();
    let (loading, failure, exercise) = {
        let snapshot = snapshot.read();
        (
            snapshot.is_loading(),
            snapshot.reconcile_error().map(reconcile_message),
            snapshot.current_exercise.clone(),
        )
    };

    if loading {
        return rsx! {
            div { class: "page",
                p { class: "muted", "Loading exercises…" }
            }
        };
    }
    if let Some(message) = failure {
        return rsx! { StatusPanel { message } };
    }
    let Some(exercise) = exercise else {
        return rsx! {
            div { class: "page",
                p { class: "muted", "Pick an exercise from the list." }
            }
        };
    };

    let key = exercise.id().to_string();
    let markdown = exercise.markdown().to_string();
    let name = exercise.name().to_owned();

    rsx! {
        div { class: "page exercise",
            header { class: "exercise-header",
                h2 { "{name}" }
            }
            // Keyed so switching exercises remounts with fresh local state.
            ActionPanel { key: "{key}-actions", exercise }
            MarkdownPanel { key: "{key}-markdown", markdown }
        }
    }
}

#[component]
pub fn StatusPanel(message: String) -> Element {
    rsx! {
        div { class: "page status",
            p { class: "message warning", "{message}" }
        }
    }
}

#[component]
fn MarkdownPanel(markdown: String) -> Element {
    let gateway = use_context::<AppContext>().gateway();
    let resource = use_resource(move || {
        let gateway = gateway.clone();
        let markdown = MarkdownRef::new(markdown.clone());
        async move {
            let text = gateway.fetch_markdown(markdown.clone()).await.map_err(|err| {
                tracing::warn!(%err, %markdown, "exercise markdown unavailable");
                ViewError::from(err)
            })?;
            Ok::<_, ViewError>(markdown_to_html(&text))
        }
    });

    match view_state_from_resource(resource) {
        ViewState::Idle | ViewState::Loading => rsx! {
            p { class: "muted", "Loading…" }
        },
        ViewState::Ready(html) => rsx! {
            article { class: "markdown", dangerous_inner_html: "{html}" }
        },
        ViewState::Error(err) => rsx! {
            p { class: "message info", "{err.message()}" }
        },
    }
}

#[component]
fn ActionPanel(exercise: Exercise) -> Element {
    let ctx = use_context::<AppContext>();
    let snapshot = use_store_snapshot();
    let vm = map_action_panel(&snapshot.read(), &exercise);
    let mut args = use_signal(|| vm.command_args.clone());
    let message = use_signal(|| None::<ActionMessage>);

    let choose_folder = {
        let store = ctx.store();
        let gateway = ctx.gateway();
        let exercise_id = exercise.id().clone();
        let session_id = vm.session_id;
        move |_: MouseEvent| {
            let store = store.clone();
            let gateway = gateway.clone();
            let exercise_id = exercise_id.clone();
            let mut message = message;
            spawn(async move {
                let folder = match gateway.pick_folder().await {
                    Ok(Some(folder)) => folder,
                    Ok(None) => return,
                    Err(err) => {
                        message.set(Some(folder_picker_message(&err)));
                        return;
                    }
                };
                let result = match session_id {
                    Some(id) => {
                        let patch = SessionPatch::new(id).folder_path(Patch::Set(folder));
                        store.update_session(patch).await
                    }
                    None => {
                        let mut draft = NewSession::new(exercise_id).with_folder_path(folder);
                        if let Patch::Set(command) = command_args_patch(&args.peek()) {
                            draft = draft.with_command_args(command);
                        }
                        store.create_session(draft).await
                    }
                };
                message.set(result.err().map(|err| store_error_message(&err)));
            });
        }
    };

    let save_args = {
        let store = ctx.store();
        let vm = vm.clone();
        let exercise = exercise.clone();
        move |_: MouseEvent| {
            let store = store.clone();
            let mut message = message;
            let request = save_args_request(&vm, &exercise, &args.peek());
            spawn(async move {
                let result = match request {
                    SaveArgs::Create(draft) => store.create_session(draft).await,
                    SaveArgs::Update(patch) => store.update_session(patch).await,
                };
                message.set(result.err().map(|err| store_error_message(&err)));
            });
        }
    };

    let verify = {
        let store = ctx.store();
        let session_id = vm.session_id;
        move |_: MouseEvent| {
            let Some(id) = session_id else {
                return;
            };
            let store = store.clone();
            let mut message = message;
            spawn(async move {
                let result = store.verify_exercise(id).await;
                message.set(Some(verification_message(&result)));
            });
        }
    };

    let folder_label = vm.folder_label().to_owned();
    let can_save_args = vm.can_save_args();
    let can_verify = vm.can_verify();
    let verify_label = vm.verify_label();
    let busy = vm.busy;
    let completed = vm.completed;
    let feedback = message.read().clone();

    rsx! {
        section { class: "actions",
            if completed {
                p { class: "badge completed", "Completed" }
            }
            div { class: "row",
                span { class: "folder", "{folder_label}" }
                button {
                    r#type: "button",
                    class: "btn",
                    disabled: busy,
                    onclick: choose_folder,
                    "Choose folder…"
                }
            }
            div { class: "row",
                input {
                    r#type: "text",
                    class: "args",
                    placeholder: "cargo run",
                    value: "{args}",
                    oninput: move |evt| args.set(evt.value()),
                }
                button {
                    r#type: "button",
                    class: "btn",
                    disabled: !can_save_args,
                    onclick: save_args,
                    "Save arguments"
                }
            }
            button {
                r#type: "button",
                class: "btn primary",
                disabled: !can_verify,
                onclick: verify,
                "{verify_label}"
            }
            if let Some(feedback) = feedback {
                div { class: feedback.class(),
                    p { "{feedback.title}" }
                    if let Some(detail) = feedback.detail.as_ref() {
                        pre { "{detail}" }
                    }
                }
            }
        }
    }
}

mod action_vm;
mod bootstrap_vm;
mod catalog_vm;
mod markdown_vm;

pub use action_vm::{
    ActionMessage, ActionPanelVm, SaveArgs, Tone, command_args_patch, folder_picker_message,
    map_action_panel, save_args_request, session_for, store_error_message, verification_message,
};
pub use bootstrap_vm::{BootstrapVm, bootstrap_failure_message, format_timestamp, map_bootstrap};
pub use catalog_vm::{CatalogItemVm, ProgressVm, map_catalog, map_progress, reconcile_message};
pub use markdown_vm::{markdown_to_html, sanitize_html};

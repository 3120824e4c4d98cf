mod about;
mod exercise;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use about::AboutView;
pub use exercise::{ExerciseView, StatusPanel};
pub use state::{
    ViewError, ViewState, use_bootstrap_state, use_store_snapshot, view_state_from_resource,
};

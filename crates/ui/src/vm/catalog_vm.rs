use playground_core::model::ExerciseId;
use services::{ReconcileError, StoreSnapshot};

/// One row of the exercise list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogItemVm {
    pub id: ExerciseId,
    pub name: String,
    pub completed: bool,
    pub current: bool,
}

impl CatalogItemVm {
    #[must_use]
    pub fn class(&self) -> &'static str {
        match (self.current, self.completed) {
            (true, true) => "exercise-item current completed",
            (true, false) => "exercise-item current",
            (false, true) => "exercise-item completed",
            (false, false) => "exercise-item",
        }
    }

    #[must_use]
    pub fn mark(&self) -> &'static str {
        if self.completed { "✓" } else { "" }
    }
}

#[must_use]
pub fn map_catalog(snapshot: &StoreSnapshot) -> Vec<CatalogItemVm> {
    let current = snapshot.current_exercise.as_ref().map(|e| e.id());
    snapshot
        .catalog
        .iter()
        .map(|exercise| CatalogItemVm {
            id: exercise.id().clone(),
            name: exercise.name().to_owned(),
            completed: snapshot.is_completed(exercise.id()),
            current: current == Some(exercise.id()),
        })
        .collect()
}

/// Completion bar shown above the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgressVm {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl ProgressVm {
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} / {} completed", self.completed, self.total)
    }

    #[must_use]
    pub fn bar_style(&self) -> String {
        format!("width: {}%;", self.percent)
    }
}

#[must_use]
pub fn map_progress(snapshot: &StoreSnapshot) -> ProgressVm {
    let progress = snapshot.progress();
    ProgressVm {
        completed: progress.completed.min(progress.total),
        total: progress.total,
        percent: progress.rounded_percent(),
    }
}

/// User-facing text for a load that could not settle on an exercise.
#[must_use]
pub fn reconcile_message(err: &ReconcileError) -> String {
    match err {
        ReconcileError::CatalogUnavailable(_) => {
            "The exercise list could not be loaded. Restart the app to try again.".into()
        }
        ReconcileError::NoExercisesAvailable => "No exercises are installed yet.".into(),
        ReconcileError::DanglingSessionReference { exercise_id, .. } => format!(
            "Your last session was for \"{exercise_id}\", which is no longer available. \
             Pick an exercise from the list to continue."
        ),
        _ => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_core::model::{Exercise, MarkdownRef, SessionId};
    use services::StoreStatus;

    fn exercise(id: &str) -> Exercise {
        Exercise::new(ExerciseId::new(id), id.to_uppercase(), MarkdownRef::new(format!("{id}.md")))
            .unwrap()
    }

    fn snapshot() -> StoreSnapshot {
        let catalog = vec![exercise("intro"), exercise("traits"), exercise("async")];
        StoreSnapshot {
            status: StoreStatus::Ready,
            current_exercise: Some(catalog[1].clone()),
            completed_ids: [ExerciseId::new("intro")].into_iter().collect(),
            catalog,
            ..StoreSnapshot::default()
        }
    }

    #[test]
    fn rows_carry_completion_and_selection() {
        let items = map_catalog(&snapshot());

        assert_eq!(items.len(), 3);
        assert!(items[0].completed && !items[0].current);
        assert_eq!(items[0].mark(), "✓");
        assert!(items[1].current && !items[1].completed);
        assert_eq!(items[1].class(), "exercise-item current");
        assert_eq!(items[2].class(), "exercise-item");
    }

    #[test]
    fn progress_reports_rounded_percent() {
        let progress = map_progress(&snapshot());

        assert_eq!(progress.label(), "1 / 3 completed");
        assert_eq!(progress.percent, 33);
        assert_eq!(progress.bar_style(), "width: 33%;");
    }

    #[test]
    fn empty_catalog_has_empty_bar() {
        let progress = map_progress(&StoreSnapshot::default());
        assert_eq!(progress.percent, 0);
        assert_eq!(progress.label(), "0 / 0 completed");
    }

    #[test]
    fn dangling_reference_names_the_missing_exercise() {
        let message = reconcile_message(&ReconcileError::DanglingSessionReference {
            session_id: SessionId::generate(),
            exercise_id: ExerciseId::new("removed"),
        });
        assert!(message.contains("\"removed\""), "{message}");
    }
}

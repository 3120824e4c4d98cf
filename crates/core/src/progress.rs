//! Completion progress across the exercise catalog.

/// Completed count against catalog size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    #[must_use]
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// `100 * completed / total`, clamped to `0..=100`.
    ///
    /// An empty catalog reports zero progress.
    #[must_use]
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let percent = 100.0 * self.completed as f64 / self.total as f64;
        percent.clamp(0.0, 100.0)
    }

    /// Whole-number percent for labels.
    #[must_use]
    pub fn rounded_percent(&self) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let rounded = self.percent().round() as u8;
        rounded
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

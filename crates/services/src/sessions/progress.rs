/// Aggregated view of round progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProgress {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl RoundProgress {
    #[must_use]
    pub fn new(total: usize, completed: usize) -> Self {
        let completed = completed.min(total);
        Self {
            total,
            completed,
            remaining: total - completed,
            is_complete: total > 0 && completed == total,
        }
    }
}

// Progress domain model - loaded/total ratio and its state machine

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressState {
    /// Nothing registered yet.
    Idle,
    Loading,
    Complete,
}

impl ProgressState {
    pub fn from_counts(loaded: usize, total: usize) -> Self {
        if total == 0 {
            Self::Idle
        } else if loaded < total {
            Self::Loading
        } else {
            Self::Complete
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub loaded: usize,
    pub total: usize,
    pub state: ProgressState,
}

impl ProgressSnapshot {
    pub fn new(loaded: usize, total: usize) -> Self {
        Self {
            loaded,
            total,
            state: ProgressState::from_counts(loaded, total),
        }
    }

    /// Percentage for the progress indicator, capped at 100.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let ratio = self.loaded as f64 / self.total as f64 * 100.0;
        ratio.round().min(100.0) as u8
    }
}

impl Default for ProgressSnapshot {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_from_counts() {
        assert_eq!(ProgressState::from_counts(0, 0), ProgressState::Idle);
        assert_eq!(ProgressState::from_counts(1, 3), ProgressState::Loading);
        assert_eq!(ProgressState::from_counts(3, 3), ProgressState::Complete);
        assert_eq!(ProgressState::from_counts(4, 3), ProgressState::Complete);
    }

    #[test]
    fn test_percent() {
        assert_eq!(ProgressSnapshot::new(0, 0).percent(), 0);
        assert_eq!(ProgressSnapshot::new(1, 3).percent(), 33);
        assert_eq!(ProgressSnapshot::new(2, 3).percent(), 67);
        assert_eq!(ProgressSnapshot::new(5, 3).percent(), 100);
    }
}

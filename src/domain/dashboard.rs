// Dashboard domain model
use super::assignment::{Assignment, AssignmentData};
use super::progress::ProgressSnapshot;
use std::collections::HashMap;

/// Page-wide state behind the dashboard. Mutated only through the registry.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub assignments: HashMap<String, Assignment>,
    pub loaded_count: usize,
    pub total_count: usize,
    pub is_loading: bool,
    pub show_content: bool,
    pub urgent_threshold_hours: u32,
}

/// Result of applying a fetch outcome to the state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOutcome {
    /// Merged data, `None` when the fetch failed and nothing is known.
    pub data: Option<AssignmentData>,
    /// True only for the first completed attempt for this id.
    pub first_load: bool,
}

impl DashboardState {
    pub fn new(show_content: bool, urgent_threshold_hours: u32) -> Self {
        Self {
            assignments: HashMap::new(),
            loaded_count: 0,
            total_count: 0,
            is_loading: false,
            show_content,
            urgent_threshold_hours,
        }
    }

    /// Returns true when the id was not known before.
    pub fn register(&mut self, id: &str, link: &str, title: &str) -> bool {
        if self.assignments.contains_key(id) {
            return false;
        }
        self.assignments.insert(
            id.to_string(),
            Assignment::new(id.to_string(), link.to_string(), title.to_string()),
        );
        self.total_count += 1;
        self.refresh_loading();
        true
    }

    /// Apply a completed fetch attempt. Returns `None` for unknown ids.
    pub fn apply_result(&mut self, id: &str, data: Option<&AssignmentData>) -> Option<LoadOutcome> {
        let assignment = self.assignments.get_mut(id)?;
        if let Some(data) = data {
            assignment.merge(data);
        }

        let first_load = !assignment.loaded;
        assignment.loaded = true;
        // A failed attempt with nothing previously merged has no data to show.
        let merged = if data.is_some() || assignment.deadline.is_some() {
            Some(assignment.snapshot())
        } else {
            None
        };

        if first_load {
            self.loaded_count += 1;
            self.refresh_loading();
        }

        Some(LoadOutcome {
            data: merged,
            first_load,
        })
    }

    pub fn progress(&self) -> ProgressSnapshot {
        ProgressSnapshot::new(self.loaded_count, self.total_count)
    }

    fn refresh_loading(&mut self) {
        self.is_loading = self.loaded_count < self.total_count;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskUrgency {
    Overdue,
    Urgent,
}

/// One row of the urgent/overdue task list.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub link: String,
    pub deadline: Option<String>,
    pub content: String,
    pub diff_ms: i64,
    pub urgency: TaskUrgency,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardSummary {
    pub total: usize,
    pub completed: usize,
    pub overdue: usize,
    pub urgent: usize,
    pub remaining: usize,
    /// Overdue items (most recently overdue first) followed by urgent items
    /// (soonest first).
    pub tasks: Vec<TaskItem>,
}

impl DashboardSummary {
    pub fn urgent_or_overdue(&self) -> usize {
        self.urgent + self.overdue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let mut state = DashboardState::new(true, 72);
        assert!(state.register("1", "l", "t"));
        assert!(!state.register("1", "l", "other"));
        assert_eq!(state.total_count, 1);
        assert_eq!(state.assignments["1"].title, "t");
    }

    #[test]
    fn test_reregister_keeps_loaded_fields() {
        let mut state = DashboardState::new(true, 72);
        state.register("1", "l", "t");
        state.apply_result(
            "1",
            Some(&AssignmentData {
                title: "HW".into(),
                deadline: Some("2030-01-01T00:00:00Z".into()),
                is_submitted: true,
                content: "c".into(),
            }),
        );

        state.register("1", "l", "t");
        let assignment = &state.assignments["1"];
        assert!(assignment.loaded);
        assert!(assignment.is_submitted);
        assert_eq!(assignment.content, "c");
        assert!(assignment.deadline.is_some());
    }

    #[test]
    fn test_failure_counts_once_and_keeps_fields() {
        let mut state = DashboardState::new(true, 72);
        state.register("1", "l", "t");

        let first = state.apply_result("1", None).unwrap();
        assert!(first.first_load);
        assert_eq!(first.data, None);
        let second = state.apply_result("1", None).unwrap();
        assert!(!second.first_load);

        assert_eq!(state.loaded_count, 1);
        assert!(!state.is_loading);
        assert_eq!(state.assignments["1"].title, "t");
        assert!(state.apply_result("unknown", None).is_none());
    }
}

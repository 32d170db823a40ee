// Aggregator - Dashboard statistics from the known assignment states
use crate::domain::assignment::{Assignment, AssignmentStatus};
use crate::domain::dashboard::{DashboardSummary, TaskItem, TaskUrgency};
use chrono::{DateTime, Utc};

/// Partition `assignments` into completed, overdue, urgent and remaining.
///
/// `remaining` is derived as `total - completed - overdue - urgent`, so
/// assignments without a usable deadline land there unless submitted.
pub fn aggregate<'a, I>(assignments: I, now: DateTime<Utc>, urgent_threshold_hours: u32) -> DashboardSummary
where
    I: IntoIterator<Item = &'a Assignment>,
{
    let mut total = 0;
    let mut completed = 0;
    let mut overdue = Vec::new();
    let mut urgent = Vec::new();

    for assignment in assignments {
        total += 1;
        let status = AssignmentStatus::classify(
            assignment.deadline_at(),
            assignment.is_submitted,
            now,
            urgent_threshold_hours,
        );
        match status {
            AssignmentStatus::Submitted => completed += 1,
            AssignmentStatus::Overdue { diff_ms } => {
                overdue.push(task_item(assignment, diff_ms, TaskUrgency::Overdue))
            }
            AssignmentStatus::Urgent { diff_ms } => {
                urgent.push(task_item(assignment, diff_ms, TaskUrgency::Urgent))
            }
            AssignmentStatus::Open { .. } | AssignmentStatus::Unknown => {}
        }
    }

    // Most recently overdue first, then soonest due first.
    overdue.sort_by(|a, b| b.diff_ms.cmp(&a.diff_ms).then_with(|| a.id.cmp(&b.id)));
    urgent.sort_by(|a, b| a.diff_ms.cmp(&b.diff_ms).then_with(|| a.id.cmp(&b.id)));

    let overdue_count = overdue.len();
    let urgent_count = urgent.len();
    let mut tasks = overdue;
    tasks.extend(urgent);

    DashboardSummary {
        total,
        completed,
        overdue: overdue_count,
        urgent: urgent_count,
        remaining: total - completed - overdue_count - urgent_count,
        tasks,
    }
}

fn task_item(assignment: &Assignment, diff_ms: i64, urgency: TaskUrgency) -> TaskItem {
    TaskItem {
        id: assignment.id.clone(),
        title: assignment.title.clone(),
        link: assignment.link.clone(),
        deadline: assignment.deadline.clone(),
        content: assignment.content.clone(),
        diff_ms,
        urgency,
    }
}

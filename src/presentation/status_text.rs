// Status chip and deadline text shared by target and dashboard renderers
use crate::domain::assignment::AssignmentStatus;
use chrono::{DateTime, Local, Utc};

pub fn chip_text(status: &AssignmentStatus) -> &'static str {
    match status {
        AssignmentStatus::Submitted => "Submitted",
        AssignmentStatus::Overdue { .. } => "Overdue",
        AssignmentStatus::Urgent { .. } => "Due soon",
        AssignmentStatus::Open { .. } => "Not submitted",
        AssignmentStatus::Unknown => "No deadline",
    }
}

/// Deadline in local time, zero padded: `2024.03.05 09:00`.
pub fn format_deadline(deadline: DateTime<Utc>) -> String {
    deadline.with_timezone(&Local).format("%Y.%m.%d %H:%M").to_string()
}

/// Time left until `deadline`, e.g. `(2d 3h left)`. Empty once it has passed.
pub fn time_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = deadline - now;
    if left.num_seconds() <= 0 {
        return String::new();
    }

    let days = left.num_days();
    let hours = left.num_hours() % 24;
    let minutes = left.num_minutes() % 60;
    let text = if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes.max(1))
    };
    format!("({} left)", text)
}

// Render boundaries - Per-anchor targets and the aggregate dashboard view
use crate::domain::assignment::{AssignmentData, AssignmentStatus};
use crate::domain::dashboard::{DashboardSummary, TaskUrgency};
use crate::domain::progress::{ProgressSnapshot, ProgressState};
use crate::presentation::status_text::{chip_text, format_deadline, time_remaining};
use chrono::{DateTime, Utc};
use std::fmt::Write;
use std::sync::{Mutex, PoisonError};

/// Inputs for drawing one anchor occurrence.
#[derive(Debug, Clone)]
pub struct TargetFrame<'a> {
    /// `None` while loading, or after a failed fetch.
    pub data: Option<&'a AssignmentData>,
    pub failed: bool,
    pub url: &'a str,
    pub compact: bool,
    pub show_content: bool,
    pub urgent_threshold_hours: u32,
    pub now: DateTime<Utc>,
}

impl TargetFrame<'_> {
    pub fn status(&self) -> Option<AssignmentStatus> {
        self.data
            .map(|data| AssignmentStatus::of(data, self.now, self.urgent_threshold_hours))
    }
}

/// Where one occurrence of an assignment link is drawn.
pub trait RenderTarget: Send + Sync {
    fn render(&self, frame: &TargetFrame<'_>);
}

/// Where the aggregate dashboard is drawn.
pub trait DashboardView: Send + Sync {
    fn render_dashboard(&self, summary: &DashboardSummary, progress: &ProgressSnapshot, show_content: bool);

    /// Called when the summary gets switched off.
    fn hide(&self) {}
}

/// Renders a target as plain text and keeps the latest output.
#[derive(Debug, Default)]
pub struct TextTarget {
    output: Mutex<String>,
}

impl TextTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.output.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RenderTarget for TextTarget {
    fn render(&self, frame: &TargetFrame<'_>) {
        let text = render_target_text(frame);
        *self.output.lock().unwrap_or_else(PoisonError::into_inner) = text;
    }
}

pub fn render_target_text(frame: &TargetFrame<'_>) -> String {
    let (Some(data), Some(status)) = (frame.data, frame.status()) else {
        return if frame.failed {
            "[Unavailable]".to_string()
        } else if frame.compact {
            "...".to_string()
        } else {
            "Loading...".to_string()
        };
    };

    let due = data.deadline_at();
    let remaining = match (status, due) {
        (AssignmentStatus::Urgent { .. } | AssignmentStatus::Open { .. }, Some(due)) => {
            time_remaining(due, frame.now)
        }
        _ => String::new(),
    };

    if frame.compact {
        let clean = remaining.trim_start_matches('(').trim_end_matches(')');
        return if clean.is_empty() {
            format!("[{}] {}", chip_text(&status), frame.url)
        } else {
            format!("[{}] {} {}", chip_text(&status), clean, frame.url)
        };
    }

    let deadline = due
        .map(|d| format!("until {}", format_deadline(d)))
        .unwrap_or_else(|| "no deadline information".to_string());
    let mut text = format!("[{}] {} {}", chip_text(&status), deadline, remaining);
    text.truncate(text.trim_end().len());
    if frame.show_content && !data.content.is_empty() {
        text.push('\n');
        text.push_str(&data.content);
    }
    text
}

/// Text dashboard that logs every pass and keeps the latest rendering.
#[derive(Debug, Default)]
pub struct TextDashboard {
    output: Mutex<String>,
}

impl TextDashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.output.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl DashboardView for TextDashboard {
    fn render_dashboard(&self, summary: &DashboardSummary, progress: &ProgressSnapshot, show_content: bool) {
        let text = render_dashboard_text(summary, progress, show_content, Utc::now());
        tracing::info!(
            "Dashboard: {} completed, {} urgent/overdue, {} remaining ({}%)",
            summary.completed,
            summary.urgent_or_overdue(),
            summary.remaining,
            progress.percent()
        );
        *self.output.lock().unwrap_or_else(PoisonError::into_inner) = text;
    }

    fn hide(&self) {
        self.output.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

pub fn render_dashboard_text(
    summary: &DashboardSummary,
    progress: &ProgressSnapshot,
    show_content: bool,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::from("Assignment overview\n");
    if progress.state == ProgressState::Loading {
        let _ = writeln!(out, "Loading {}/{} ({}%)", progress.loaded, progress.total, progress.percent());
    }
    let _ = writeln!(
        out,
        "Completed {} | Urgent/overdue {} | Remaining {}",
        summary.completed,
        summary.urgent_or_overdue(),
        summary.remaining
    );

    if summary.tasks.is_empty() {
        out.push_str("No assignments are due soon or overdue.\n");
        return out;
    }

    out.push_str("Due soon / overdue:\n");
    for task in &summary.tasks {
        let chip = match task.urgency {
            TaskUrgency::Overdue => "Overdue",
            TaskUrgency::Urgent => "Due soon",
        };
        let due = task.deadline.as_deref().and_then(crate::domain::assignment::parse_deadline);
        let deadline = due.map(|d| format!(" until {}", format_deadline(d))).unwrap_or_default();
        let remaining = due.map(|d| time_remaining(d, now)).unwrap_or_default();
        let _ = writeln!(out, "- [{}] {}{} {} <{}>", chip, task.title, deadline, remaining, task.link);
        if show_content && !task.content.is_empty() {
            let _ = writeln!(out, "    {}", task.content);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dashboard::TaskItem;
    use chrono::Duration;

    fn frame<'a>(data: Option<&'a AssignmentData>, compact: bool, show_content: bool) -> TargetFrame<'a> {
        TargetFrame {
            data,
            failed: false,
            url: "https://lms/mod/assign/view.php?id=1",
            compact,
            show_content,
            urgent_threshold_hours: 72,
            now: Utc::now(),
        }
    }

    #[test]
    fn test_loading_and_failure_text() {
        assert_eq!(render_target_text(&frame(None, false, true)), "Loading...");
        assert_eq!(render_target_text(&frame(None, true, true)), "...");

        let failed = TargetFrame {
            failed: true,
            ..frame(None, false, true)
        };
        assert_eq!(render_target_text(&failed), "[Unavailable]");
    }

    #[test]
    fn test_content_follows_preference() {
        let data = AssignmentData {
            title: "HW1".into(),
            deadline: Some((Utc::now() + Duration::hours(2)).to_rfc3339()),
            is_submitted: false,
            content: "read chapter 3".into(),
        };

        let shown = render_target_text(&frame(Some(&data), false, true));
        assert!(shown.starts_with("[Due soon]"));
        assert!(shown.ends_with("read chapter 3"));

        let hidden = render_target_text(&frame(Some(&data), false, false));
        assert!(!hidden.contains("read chapter 3"));

        let compact = render_target_text(&frame(Some(&data), true, true));
        assert!(compact.contains("left"));
        assert!(!compact.contains('('));
    }

    #[test]
    fn test_dashboard_text_lists_tasks() {
        let summary = DashboardSummary {
            total: 2,
            completed: 1,
            overdue: 1,
            urgent: 0,
            remaining: 0,
            tasks: vec![TaskItem {
                id: "3".into(),
                title: "Lab".into(),
                link: "https://lms/3".into(),
                deadline: None,
                content: "late body".into(),
                diff_ms: -5,
                urgency: TaskUrgency::Overdue,
            }],
        };

        let text = render_dashboard_text(&summary, &ProgressSnapshot::new(2, 2), false, Utc::now());
        assert!(text.contains("Completed 1 | Urgent/overdue 1 | Remaining 0"));
        assert!(text.contains("- [Overdue] Lab"));
        assert!(!text.contains("late body"));
        assert!(!text.contains("Loading"));
    }
}

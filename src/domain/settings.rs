// Display settings persisted alongside the assignment cache

/// Store key for the content preview toggle.
pub const SHOW_CONTENT_KEY: &str = "showAssignmentContent";
pub const URGENT_THRESHOLD_KEY: &str = "urgentThresholdHours";
pub const ENABLE_SUMMARY_KEY: &str = "enableSummaryAtLecture";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplaySettings {
    pub show_content: bool,
    pub urgent_threshold_hours: u32,
    pub enable_summary: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_content: true,
            urgent_threshold_hours: 72,
            enable_summary: true,
        }
    }
}

// Assignment domain model
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Deadline layouts accepted in addition to RFC 3339.
const NAIVE_DEADLINE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y.%m.%d %H:%M"];

/// Snapshot of the fields fetched for one assignment.
///
/// Serialized with camelCase names so cached entries keep the same layout as
/// the browser storage they were written from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentData {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub deadline: Option<String>,
    #[serde(default)]
    pub is_submitted: bool,
    #[serde(default)]
    pub content: String,
}

impl AssignmentData {
    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        self.deadline.as_deref().and_then(parse_deadline)
    }
}

/// One logical assignment, shared by every anchor that carries its id.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub title: String,
    pub link: String,
    pub deadline: Option<String>,
    pub is_submitted: bool,
    pub content: String,
    pub loaded: bool,
}

impl Assignment {
    pub fn new(id: String, link: String, title: String) -> Self {
        Self {
            id,
            title,
            link,
            deadline: None,
            is_submitted: false,
            content: String::new(),
            loaded: false,
        }
    }

    /// Merge fetched data into this assignment. An empty fetched title keeps
    /// the anchor text.
    pub fn merge(&mut self, data: &AssignmentData) {
        if !data.title.trim().is_empty() {
            self.title = data.title.clone();
        }
        self.content = data.content.clone();
        self.is_submitted = data.is_submitted;
        self.deadline = data.deadline.clone();
    }

    pub fn snapshot(&self) -> AssignmentData {
        AssignmentData {
            title: self.title.clone(),
            deadline: self.deadline.clone(),
            is_submitted: self.is_submitted,
            content: self.content.clone(),
        }
    }

    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        self.deadline.as_deref().and_then(parse_deadline)
    }
}

/// Where an assignment stands relative to `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStatus {
    Submitted,
    /// Deadline passed; `diff_ms` is negative.
    Overdue { diff_ms: i64 },
    /// Deadline within the urgent threshold.
    Urgent { diff_ms: i64 },
    /// Deadline further away than the urgent threshold.
    Open { diff_ms: i64 },
    /// No deadline, or one that does not parse.
    Unknown,
}

impl AssignmentStatus {
    pub fn classify(
        deadline: Option<DateTime<Utc>>,
        is_submitted: bool,
        now: DateTime<Utc>,
        urgent_threshold_hours: u32,
    ) -> Self {
        if is_submitted {
            return Self::Submitted;
        }
        let Some(due) = deadline else {
            return Self::Unknown;
        };

        let diff_ms = (due - now).num_milliseconds();
        let threshold_ms = i64::from(urgent_threshold_hours) * 60 * 60 * 1000;
        if diff_ms < 0 {
            Self::Overdue { diff_ms }
        } else if diff_ms <= threshold_ms {
            Self::Urgent { diff_ms }
        } else {
            Self::Open { diff_ms }
        }
    }

    pub fn of(data: &AssignmentData, now: DateTime<Utc>, urgent_threshold_hours: u32) -> Self {
        Self::classify(data.deadline_at(), data.is_submitted, now, urgent_threshold_hours)
    }
}

/// Parse a deadline string. Returns `None` for anything unrecognised, which
/// callers treat as an unknown deadline.
pub fn parse_deadline(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    if let Ok(millis) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(millis);
    }

    NAIVE_DEADLINE_FORMATS.iter().find_map(|format| {
        let naive = NaiveDateTime::parse_from_str(raw, format).ok()?;
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|local| local.with_timezone(&Utc))
    })
}

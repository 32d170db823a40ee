// Test doubles for the network and render boundaries
use crate::application::assignment_source::AssignmentSource;
use crate::domain::assignment::{AssignmentData, AssignmentStatus};
use crate::presentation::render_target::{RenderTarget, TargetFrame};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Serves canned responses and counts calls per id. Unknown ids fail.
#[derive(Default)]
pub struct StubSource {
    responses: Mutex<HashMap<String, AssignmentData>>,
    calls: Mutex<Vec<String>>,
    latency: Duration,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    pub fn respond(&self, id: &str, data: AssignmentData) {
        self.responses.lock().unwrap().insert(id.to_string(), data);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, id: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == id).count()
    }
}

#[async_trait]
impl AssignmentSource for StubSource {
    async fn fetch_assignment_details(
        &self,
        _detail_url: &str,
        id: &str,
        _link: &str,
        _course_id: Option<&str>,
    ) -> Option<AssignmentData> {
        self.calls.lock().unwrap().push(id.to_string());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.responses.lock().unwrap().get(id).cloned()
    }
}

/// One observed render.
#[derive(Debug, Clone, PartialEq)]
pub struct Observed {
    pub data: Option<AssignmentData>,
    pub failed: bool,
    pub url: String,
    pub compact: bool,
    pub show_content: bool,
    pub status: Option<AssignmentStatus>,
}

#[derive(Default)]
pub struct RecordingTarget {
    renders: Mutex<Vec<Observed>>,
}

impl RecordingTarget {
    pub fn renders(&self) -> Vec<Observed> {
        self.renders.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Observed> {
        self.renders.lock().unwrap().last().cloned()
    }
}

impl RenderTarget for RecordingTarget {
    fn render(&self, frame: &TargetFrame<'_>) {
        self.renders.lock().unwrap().push(Observed {
            data: frame.data.cloned(),
            failed: frame.failed,
            url: frame.url.to_string(),
            compact: frame.compact,
            show_content: frame.show_content,
            status: frame.status(),
        });
    }
}

pub fn pending_data(title: &str, deadline: Option<String>, content: &str) -> AssignmentData {
    AssignmentData {
        title: title.to_string(),
        deadline,
        is_submitted: false,
        content: content.to_string(),
    }
}

// HTTP assignment source implementation
use crate::application::assignment_source::AssignmentSource;
use crate::domain::assignment::AssignmentData;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Fetches assignment details as JSON from the assignment's detail URL.
#[derive(Debug, Clone)]
pub struct HttpAssignmentSource {
    client: reqwest::Client,
}

impl HttpAssignmentSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    async fn execute_fetch(&self, detail_url: &str, course_id: Option<&str>) -> Result<AssignmentData> {
        let mut request = self
            .client
            .get(detail_url)
            .header("Accept", "application/json");
        if let Some(course_id) = course_id {
            request = request.header("X-Course-Id", course_id);
        }

        let response = request
            .send()
            .await
            .context("Failed to send assignment request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Assignment request failed with status {}: {}", status, body);
        }

        response
            .json::<AssignmentData>()
            .await
            .context("Failed to parse assignment response")
    }
}

#[async_trait]
impl AssignmentSource for HttpAssignmentSource {
    async fn fetch_assignment_details(
        &self,
        detail_url: &str,
        id: &str,
        _link: &str,
        course_id: Option<&str>,
    ) -> Option<AssignmentData> {
        tracing::debug!("Fetching assignment {} from {}", id, detail_url);
        match self.execute_fetch(detail_url, course_id).await {
            Ok(data) => Some(data),
            Err(e) => {
                tracing::warn!("Fetch for assignment {} failed: {:#}", id, e);
                None
            }
        }
    }
}

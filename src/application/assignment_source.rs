// Source trait for assignment detail lookups
use crate::domain::assignment::AssignmentData;
use async_trait::async_trait;

#[async_trait]
pub trait AssignmentSource: Send + Sync {
    /// Fetch the details behind one assignment link.
    ///
    /// `None` is a recoverable failure (network or parse error); callers mark
    /// the id loaded and move on.
    async fn fetch_assignment_details(
        &self,
        detail_url: &str,
        id: &str,
        link: &str,
        course_id: Option<&str>,
    ) -> Option<AssignmentData>;
}

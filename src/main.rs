// Main entry point - Dependency injection and page scan
use std::sync::Arc;

use anyhow::Context;
use assignment_tracker::application::key_value_store::KeyValueStore;
use assignment_tracker::application::tracker_session::TrackerSession;
use assignment_tracker::domain::anchor::AssignmentAnchor;
use assignment_tracker::infrastructure::config::{load_tracker_config, TrackerConfig};
use assignment_tracker::infrastructure::http_source::HttpAssignmentSource;
use assignment_tracker::infrastructure::json_file_store::JsonFileStore;
use assignment_tracker::infrastructure::page_scanner::{query_param, scan_anchors};
use assignment_tracker::presentation::render_target::{RenderTarget, TextDashboard, TextTarget};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_tracker_config()?;

    // Create adapters (infrastructure layer)
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(config.store_path.clone()));
    let source = Arc::new(HttpAssignmentSource::new(config.request_timeout())?);
    let dashboard_view = Arc::new(TextDashboard::new());

    // Create the session (application layer)
    let session = TrackerSession::new(&config, store, source, dashboard_view.clone()).await;

    // Scan the page
    let html = load_page(&config).await?;
    let anchors = scan_anchors(&html);
    let course_id = config
        .course_id
        .clone()
        .or_else(|| config.page_url.as_deref().and_then(|url| query_param(url, "id")));

    let mut targets: Vec<(AssignmentAnchor, Arc<TextTarget>)> = Vec::new();
    let report = session
        .discover(&anchors, course_id.as_deref(), |anchor| {
            let target = Arc::new(TextTarget::new());
            targets.push((anchor.clone(), target.clone()));
            target as Arc<dyn RenderTarget>
        })
        .await;

    tracing::info!(
        "Found {} assignment links ({} new, {} cached, {} queued)",
        report.processed,
        report.new_ids,
        report.cached,
        report.queued
    );

    if session.is_loading() {
        session.wait_for_complete().await;
    }
    session.render_dashboard_now();

    // Print results (presentation layer)
    for (anchor, target) in &targets {
        let place = if anchor.in_overview { "overview" } else { "section" };
        println!("{} [{}]\n  {}", anchor.text, place, target.contents().replace('\n', "\n  "));
    }
    if session.settings().enable_summary {
        println!("\n{}", dashboard_view.contents());
    }

    Ok(())
}

async fn load_page(config: &TrackerConfig) -> anyhow::Result<String> {
    if let Some(path) = &config.page_path {
        return tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read page {}", path.display()));
    }

    let Some(url) = &config.page_url else {
        anyhow::bail!("Set TRACKER_PAGE_PATH or TRACKER_PAGE_URL to the course page to scan");
    };
    let response = reqwest::get(url)
        .await
        .with_context(|| format!("Failed to fetch page {}", url))?;
    if !response.status().is_success() {
        anyhow::bail!("Page request failed with status {}", response.status());
    }
    Ok(response.text().await?)
}

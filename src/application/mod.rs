// Application layer - Synchronization engine and boundary traits
pub mod aggregator;
pub mod assignment_source;
pub mod cache;
pub mod dashboard;
pub mod fetch_queue;
pub mod key_value_store;
pub mod progress_tracker;
pub mod registry;
pub mod settings_store;
pub mod tracker_session;
pub mod update_scheduler;

#[cfg(test)]
pub(crate) mod testing;

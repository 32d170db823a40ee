// Domain layer - Assignment, dashboard and progress models
pub mod anchor;
pub mod assignment;
pub mod dashboard;
pub mod progress;
pub mod settings;

// Assignment tracker - Keeps every link to an assignment on a course page in
// sync with its fetched deadline, submission state and content.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Presentation layer - Render boundaries and text renderers
pub mod render_target;
pub mod status_text;

// Anchor discovered on a course page

/// One `<a>` occurrence pointing at an assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentAnchor {
    pub href: String,
    /// Visible link text with screen-reader-only spans removed.
    pub text: String,
    /// Inside the dense overview section at the top of the page.
    pub in_overview: bool,
    /// Byte offset of the tag in the scanned page; distinguishes repeated links.
    pub offset: usize,
}

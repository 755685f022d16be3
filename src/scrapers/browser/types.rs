//! Render result types.

/// HTML captured after scripts ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    /// Page URL at the time content was extracted.
    pub final_url: String,
    pub redirected: bool,
}

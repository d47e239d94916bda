//! Layout Module
//!
//! Block layout of the document using Taffy. The effects only care about the
//! vertical axis: where an element starts and how tall it is, which is what
//! visibility checks and scroll-into-view need.
//!
//! # Example
//!
//! ```ignore
//! use pagefx::layout::compute_layout;
//!
//! let layout = compute_layout(1280.0)?;
//! if let Some((top, height)) = layout.element_box(section) {
//!     println!("section spans {top}..{}", top + height);
//! }
//! ```

mod taffy_bridge;

pub use taffy_bridge::compute_layout_taffy as compute_layout;

/// Absolute block geometry for every laid-out element, indexed like the
/// element columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComputedLayout {
    pub top: Vec<f32>,
    pub height: Vec<f32>,
    pub laid_out: Vec<bool>,
    pub document_height: f32,
}

impl ComputedLayout {
    /// `(top, height)` of an element, or `None` if it was not laid out.
    pub fn element_box(&self, index: usize) -> Option<(f32, f32)> {
        if !self.laid_out.get(index).copied().unwrap_or(false) {
            return None;
        }
        Some((self.top[index], self.height[index]))
    }
}

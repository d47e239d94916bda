//! Core types for pagefx.
//!
//! Small value types shared by the document, the event surface and the effects.

// =============================================================================
// Cleanup
// =============================================================================

/// Cleanup function returned by listener registrations and components.
///
/// Call it to detach the listener and release what it holds.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Element State (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Interactive state of an element, separate from its classes.
    ///
    /// Combine with bitwise OR: `ElementState::DISABLED | ElementState::PRESSED`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElementState: u8 {
        const NONE = 0;
        /// Control is disabled; clicks on it are not dispatched.
        const DISABLED = 1 << 0;
        /// A touch is in progress on the element.
        const PRESSED = 1 << 1;
    }
}

// =============================================================================
// Dimension
// =============================================================================

/// Declared block size of an element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Dimension {
    /// Sized by its children.
    #[default]
    Auto,
    /// Fixed size in CSS pixels.
    Px(f32),
}

impl From<f32> for Dimension {
    fn from(value: f32) -> Self {
        if value < 0.0 {
            Self::Auto
        } else {
            Self::Px(value)
        }
    }
}

// =============================================================================
// Scroll Behavior
// =============================================================================

/// How a programmatic scroll reaches its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    /// Jump immediately.
    #[default]
    Instant,
    /// Animate over several frames.
    Smooth,
}

//! # pagefx
//!
//! Page enhancement effects for Rust: a carousel, a typewriter, visibility
//! triggered reveals, parallax and delayed smooth scrolling for in-page links.
//!
//! ## Architecture
//!
//! The effects run against a headless page model instead of a browser
//! document. Elements are indices into columnar arrays (ECS-style) holding
//! tag, classes, attributes, inline styles, markup and state flags. Hosts
//! feed keyboard, pointer, scroll and resize events in, and advance a virtual
//! clock that drives every deferred step.
//!
//! ```text
//! dom (arrays, registry, selectors) → layout (taffy) → state (events, timers,
//! scroll, visibility) → effects (components) → PageHandle
//! ```
//!
//! Everything is single-threaded and thread-local: one page per thread.
//!
//! ## Modules
//!
//! - [`types`] - Core types (Cleanup, ElementState, Dimension, ScrollBehavior)
//! - [`dom`] - Element arena, columns, selectors, builder
//! - [`layout`] - Block layout via Taffy
//! - [`state`] - Keyboard, pointer, scroll, timers, visibility, terminal input
//! - [`effects`] - The components and `init_page`
//! - [`config`] - TOML-loadable settings
//! - [`error`] - `PageError`

pub mod config;
pub mod dom;
pub mod effects;
pub mod error;
pub mod layout;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use config::{
    AnchorConfig, CarouselConfig, KeyboardScope, PageConfig, ParallaxConfig, ScrollConfig,
    TypewriterConfig, VisibilityConfig,
};

pub use dom::{ElementBuilder, Selector, body, query_selector, query_selector_all};

pub use effects::{
    PageHandle, anchor_nav::AnchorNavigator, carousel::Carousel, init_page,
    parallax::Parallax, reveal::Reveal, typewriter::Typewriter,
};

pub use error::{PageError, Result};

pub use layout::{ComputedLayout, compute_layout};

/// Reset the whole page: document, handlers, observers, timers and viewport.
///
/// Mostly for tests; every registry is thread-local.
pub fn reset_page() {
    state::visibility::reset_visibility_state();
    state::keyboard::reset_keyboard_state();
    state::pointer::reset_pointer_state();
    state::scroll::reset_scroll_state();
    state::timers::reset_timers();
    dom::reset_document();
}

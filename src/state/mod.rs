//! State Module - The page's host event surface
//!
//! Thread-local registries the effects subscribe to:
//!
//! - **Keyboard** - Document-level key dispatch, handler registry
//! - **Pointer** - Element-scoped click/touch dispatch with bubbling
//! - **Scroll** - Viewport, scroll offset, smooth scrolling
//! - **Timers** - Cooperative timers on a virtual clock
//! - **Visibility** - Intersection observers
//! - **Input** - crossterm event conversion for terminal hosts
//!
//! Every subscription returns a cleanup closure.

pub mod input;
pub mod keyboard;
pub mod pointer;
pub mod scroll;
pub mod timers;
pub mod visibility;

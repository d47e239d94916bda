//! Pointer Module - Element-scoped click and touch dispatch
//!
//! Handler registry for clicks and touches on specific elements. Events are
//! delivered to the target first and then bubble through its ancestors.
//!
//! # Semantics
//!
//! - Clicks on a disabled element are not dispatched at all
//! - Any handler may call `prevent_default()` or `stop_propagation()`
//! - If no handler prevented it, a click inside an `<a href="#id">` jumps
//!   instantly to the element with that id
//! - `touchstart`/`touchend` set and clear `ElementState::PRESSED` on the target
//!
//! # Example
//!
//! ```ignore
//! use pagefx::state::pointer::{self, PointerEvent};
//!
//! let cleanup = pointer::on_click(next_button, |event| {
//!     event.prevent_default();
//!     println!("next");
//! });
//!
//! pointer::dispatch(&PointerEvent::click(next_button));
//! cleanup();
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::dom;
use crate::state::scroll;
use crate::types::{ElementState, ScrollBehavior};

// =============================================================================
// TYPES
// =============================================================================

/// Pointer event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Click,
    TouchStart,
    TouchEnd,
}

/// Pointer event, shared by reference with every handler on the bubble path.
#[derive(Debug)]
pub struct PointerEvent {
    pub kind: PointerKind,
    /// Element the event was aimed at.
    pub target: usize,
    /// Horizontal screen coordinate (touch events).
    pub screen_x: f32,
    /// Vertical screen coordinate (touch events).
    pub screen_y: f32,
    current_target: Cell<usize>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, target: usize, screen_x: f32, screen_y: f32) -> Self {
        Self {
            kind,
            target,
            screen_x,
            screen_y,
            current_target: Cell::new(target),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    pub fn click(target: usize) -> Self {
        Self::new(PointerKind::Click, target, 0.0, 0.0)
    }

    pub fn touch_start(target: usize, screen_x: f32, screen_y: f32) -> Self {
        Self::new(PointerKind::TouchStart, target, screen_x, screen_y)
    }

    pub fn touch_end(target: usize, screen_x: f32, screen_y: f32) -> Self {
        Self::new(PointerKind::TouchEnd, target, screen_x, screen_y)
    }

    /// Element whose handler is currently running.
    pub fn current_target(&self) -> usize {
        self.current_target.get()
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }
}

/// Handler for pointer events.
pub type PointerHandler = Rc<dyn Fn(&PointerEvent)>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    element_handlers: HashMap<(usize, PointerKind), Vec<(usize, PointerHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            element_handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn handlers_for(&self, index: usize, kind: PointerKind) -> Vec<PointerHandler> {
        self.element_handlers
            .get(&(index, kind))
            .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// PUBLIC API - REGISTRATION
// =============================================================================

/// Register a handler for `kind` events on element `index`.
/// Returns cleanup function.
pub fn on<F>(index: usize, kind: PointerKind, handler: F) -> impl FnOnce()
where
    F: Fn(&PointerEvent) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.element_handlers
            .entry((index, kind))
            .or_default()
            .push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            if let Some(handlers) = reg.element_handlers.get_mut(&(index, kind)) {
                handlers.retain(|(handler_id, _)| *handler_id != id);
                if handlers.is_empty() {
                    reg.element_handlers.remove(&(index, kind));
                }
            }
        });
    }
}

/// Register a click handler. Returns cleanup function.
pub fn on_click<F>(index: usize, handler: F) -> impl FnOnce()
where
    F: Fn(&PointerEvent) + 'static,
{
    on(index, PointerKind::Click, handler)
}

/// Drop every handler attached to an element.
/// Called when the element is released.
pub fn cleanup_index(index: usize) {
    REGISTRY.with(|reg| {
        reg.borrow_mut()
            .element_handlers
            .retain(|(element, _), _| *element != index);
    });
}

/// Number of handlers attached to an element.
pub fn handler_count(index: usize) -> usize {
    REGISTRY.with(|reg| {
        reg.borrow()
            .element_handlers
            .iter()
            .filter(|((element, _), _)| *element == index)
            .map(|(_, hs)| hs.len())
            .sum()
    })
}

/// Reset pointer state (for testing)
pub fn reset_pointer_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::new());
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a pointer event along the target's bubble path.
///
/// Returns true if the default action was prevented.
pub fn dispatch(event: &PointerEvent) -> bool {
    if !dom::is_allocated(event.target) {
        return false;
    }
    if event.kind == PointerKind::Click && dom::is_disabled(event.target) {
        tracing::trace!(element = event.target, "click on disabled element ignored");
        return false;
    }

    match event.kind {
        PointerKind::TouchStart => dom::set_state_flag(event.target, ElementState::PRESSED, true),
        PointerKind::TouchEnd => dom::set_state_flag(event.target, ElementState::PRESSED, false),
        PointerKind::Click => {}
    }

    let mut current = Some(event.target);
    while let Some(index) = current {
        event.current_target.set(index);
        let handlers = REGISTRY.with(|reg| reg.borrow().handlers_for(index, event.kind));
        for handler in handlers {
            handler(event);
        }
        if event.propagation_stopped.get() {
            break;
        }
        current = dom::parent_of(index);
    }

    if event.default_prevented() {
        return true;
    }
    if event.kind == PointerKind::Click {
        run_default_click(event.target);
    }
    false
}

/// Convenience: dispatch a click on `index`.
pub fn click(index: usize) -> bool {
    dispatch(&PointerEvent::click(index))
}

/// Convenience: a full swipe gesture (touchstart then touchend) on `index`.
pub fn swipe(index: usize, from_x: f32, to_x: f32) {
    dispatch(&PointerEvent::touch_start(index, from_x, 0.0));
    dispatch(&PointerEvent::touch_end(index, to_x, 0.0));
}

/// Default click action: follow in-page links.
fn run_default_click(target: usize) {
    let mut current = Some(target);
    while let Some(index) = current {
        if dom::tag(index) == "a" {
            if let Some(fragment) = dom::attribute(index, "href")
                .as_deref()
                .and_then(|href| href.strip_prefix('#'))
                .filter(|fragment| !fragment.is_empty())
            {
                if let Some(destination) = dom::get_element_by_id(fragment) {
                    tracing::debug!(fragment, "following in-page link");
                    scroll::scroll_into_view(destination, ScrollBehavior::Instant);
                }
            }
            return;
        }
        current = dom::parent_of(index);
    }
}

// =============================================================================
// TESTS
// =============================================================================

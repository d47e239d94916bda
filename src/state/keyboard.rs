//! Keyboard Module - Document-level key event dispatch
//!
//! State and handler registry for key presses anywhere on the page.
//! Does NOT read a terminal or a browser; hosts feed events through
//! `dispatch` (see the `input` module for terminal conversion).
//!
//! # API
//!
//! - `last_event` - Get last keyboard event
//! - `last_key` - Get last key pressed
//! - `on(handler)` - Subscribe to all keyboard events
//! - `on_key(key, fn)` - Subscribe to specific key
//! - `on_keys(keys, fn)` - Subscribe to several keys with one handler
//!
//! Every subscription returns a cleanup closure that detaches it.
//!
//! # Example
//!
//! ```ignore
//! use pagefx::state::keyboard;
//!
//! let cleanup = keyboard::on_key("ArrowRight", || {
//!     println!("next!");
//!     false // let other listeners see it too
//! });
//!
//! keyboard::dispatch(keyboard::KeyboardEvent::new("ArrowRight"));
//! cleanup();
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

// =============================================================================
// TYPES
// =============================================================================

/// Keyboard modifier state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self { ctrl: true, ..Self::default() }
    }
}

/// Key event state (press, repeat, release)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyState {
    #[default]
    Press,
    Repeat,
    Release,
}

/// Keyboard event
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardEvent {
    /// Key name (e.g., "a", "Enter", "ArrowLeft")
    pub key: String,
    pub modifiers: Modifiers,
    pub state: KeyState,
}

impl KeyboardEvent {
    /// Create a simple key press event
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            modifiers: Modifiers::default(),
            state: KeyState::Press,
        }
    }

    pub fn with_modifiers(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            state: KeyState::Press,
        }
    }

    /// Key-down semantics: presses and auto-repeats both count.
    pub fn is_keydown(&self) -> bool {
        self.state != KeyState::Release
    }
}

/// Handler for keyboard events. Return true to consume the event.
pub type KeyHandler = Rc<dyn Fn(&KeyboardEvent) -> bool>;

/// Handler for a specific key. Return true to consume the event.
pub type KeySpecificHandler = Rc<dyn Fn() -> bool>;

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_EVENT: RefCell<Option<KeyboardEvent>> = const { RefCell::new(None) };
}

/// Get the last keyboard event
pub fn last_event() -> Option<KeyboardEvent> {
    LAST_EVENT.with(|s| s.borrow().clone())
}

/// Get the last key pressed
pub fn last_key() -> String {
    last_event().map(|e| e.key).unwrap_or_default()
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    global_handlers: Vec<(usize, KeyHandler)>,
    key_handlers: HashMap<String, Vec<(usize, KeySpecificHandler)>>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            global_handlers: Vec::new(),
            key_handlers: HashMap::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// EVENT DISPATCH
// =============================================================================

/// Dispatch a keyboard event to all registered handlers.
/// Returns true if any handler consumed the event.
///
/// Key-specific handlers run first, then global handlers, in subscription
/// order. Release events only update `last_event`.
pub fn dispatch(event: KeyboardEvent) -> bool {
    LAST_EVENT.with(|s| *s.borrow_mut() = Some(event.clone()));

    if !event.is_keydown() {
        return false;
    }

    // Snapshot handlers so they may (un)subscribe while running
    let (key_handlers, global_handlers): (Vec<KeySpecificHandler>, Vec<KeyHandler>) =
        REGISTRY.with(|reg| {
            let reg = reg.borrow();
            let key_handlers = reg
                .key_handlers
                .get(&event.key)
                .map(|hs| hs.iter().map(|(_, h)| h.clone()).collect())
                .unwrap_or_default();
            let global_handlers = reg.global_handlers.iter().map(|(_, h)| h.clone()).collect();
            (key_handlers, global_handlers)
        });

    for handler in key_handlers {
        if handler() {
            return true;
        }
    }
    for handler in global_handlers {
        if handler(&event) {
            return true;
        }
    }
    false
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all keyboard events.
/// Return true from handler to consume the event.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&KeyboardEvent) -> bool + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.global_handlers.push((id, Rc::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.global_handlers.retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Subscribe to a specific key.
/// Return true to consume the event.
/// Returns cleanup function.
pub fn on_key<F>(key: &str, handler: F) -> impl FnOnce() + use<F>
where
    F: Fn() -> bool + 'static,
{
    on_keys(&[key], handler)
}

/// Subscribe to multiple keys with the same handler.
/// Returns cleanup function.
pub fn on_keys<F>(keys: &[&str], handler: F) -> impl FnOnce() + use<F>
where
    F: Fn() -> bool + 'static,
{
    let handler: KeySpecificHandler = Rc::new(handler);
    let ids: Vec<(String, usize)> = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        keys.iter()
            .map(|key| {
                let id = reg.next_id();
                reg.key_handlers
                    .entry(key.to_string())
                    .or_default()
                    .push((id, handler.clone()));
                (key.to_string(), id)
            })
            .collect()
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            for (key, id) in &ids {
                if let Some(handlers) = reg.key_handlers.get_mut(key) {
                    handlers.retain(|(handler_id, _)| handler_id != id);
                    if handlers.is_empty() {
                        reg.key_handlers.remove(key);
                    }
                }
            }
        });
    }
}

/// Number of live subscriptions (global plus per-key).
pub fn handler_count() -> usize {
    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        reg.global_handlers.len() + reg.key_handlers.values().map(Vec::len).sum::<usize>()
    })
}

/// Reset keyboard state (for testing)
pub fn reset_keyboard_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = HandlerRegistry::new());
    LAST_EVENT.with(|s| *s.borrow_mut() = None);
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn setup() {
        reset_keyboard_state();
    }

    #[test]
    fn test_initial_state() {
        setup();
        assert!(last_event().is_none());
        assert_eq!(last_key(), "");
    }

    #[test]
    fn test_dispatch_updates_state() {
        setup();

        dispatch(KeyboardEvent::new("ArrowLeft"));
        assert_eq!(last_key(), "ArrowLeft");

        dispatch(KeyboardEvent::new("Enter"));
        assert_eq!(last_key(), "Enter");
    }

    #[test]
    fn test_global_handler() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();

        let cleanup = on(move |_event| {
            count_clone.set(count_clone.get() + 1);
            false
        });

        dispatch(KeyboardEvent::new("a"));
        dispatch(KeyboardEvent::new("b"));
        assert_eq!(count.get(), 2);

        cleanup();

        dispatch(KeyboardEvent::new("c"));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_key_specific_handler() {
        setup();

        let right = Rc::new(Cell::new(0));
        let right_clone = right.clone();

        let cleanup = on_key("ArrowRight", move || {
            right_clone.set(right_clone.get() + 1);
            false
        });

        dispatch(KeyboardEvent::new("ArrowLeft"));
        assert_eq!(right.get(), 0);

        dispatch(KeyboardEvent::new("ArrowRight"));
        dispatch(KeyboardEvent::new("ArrowRight"));
        assert_eq!(right.get(), 2);

        cleanup();
        assert_eq!(handler_count(), 0);

        dispatch(KeyboardEvent::new("ArrowRight"));
        assert_eq!(right.get(), 2);
    }

    #[test]
    fn test_every_listener_sees_unconsumed_event() {
        setup();

        let count = Rc::new(Cell::new(0));
        let _cleanups: Vec<_> = (0..3)
            .map(|_| {
                let count = count.clone();
                on_key("ArrowRight", move || {
                    count.set(count.get() + 1);
                    false
                })
            })
            .collect();

        dispatch(KeyboardEvent::new("ArrowRight"));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn test_handler_consumption() {
        setup();

        let _c1 = on_key("Enter", || true);

        let reached = Rc::new(Cell::new(false));
        let reached_clone = reached.clone();
        let _c2 = on(move |_| {
            reached_clone.set(true);
            false
        });

        assert!(dispatch(KeyboardEvent::new("Enter")));
        assert!(!reached.get());
    }

    #[test]
    fn test_release_not_dispatched() {
        setup();

        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let _cleanup = on(move |_| {
            count_clone.set(count_clone.get() + 1);
            false
        });

        dispatch(KeyboardEvent { state: KeyState::Repeat, ..KeyboardEvent::new("a") });
        assert_eq!(count.get(), 1);

        dispatch(KeyboardEvent { state: KeyState::Release, ..KeyboardEvent::new("a") });
        assert_eq!(count.get(), 1);
        assert_eq!(last_key(), "a");
    }

    #[test]
    fn test_handler_may_unsubscribe_during_dispatch() {
        setup();

        let slot: Rc<RefCell<Option<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(None));
        let slot_clone = slot.clone();
        let cleanup = on_key("x", move || {
            if let Some(cleanup) = slot_clone.borrow_mut().take() {
                cleanup();
            }
            false
        });
        *slot.borrow_mut() = Some(Box::new(cleanup));

        dispatch(KeyboardEvent::new("x"));
        assert_eq!(handler_count(), 0);
    }

    #[test]
    fn test_modifiers() {
        setup();

        let ctrl_pressed = Rc::new(Cell::new(false));
        let ctrl_clone = ctrl_pressed.clone();

        let _cleanup = on(move |event| {
            if event.modifiers.ctrl && event.key == "c" {
                ctrl_clone.set(true);
            }
            false
        });

        dispatch(KeyboardEvent::with_modifiers("c", Modifiers::ctrl()));
        assert!(ctrl_pressed.get());
    }
}

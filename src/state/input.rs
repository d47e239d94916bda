//! Input Module - Terminal event conversion and polling
//!
//! Bridges crossterm's event system with the page's keyboard, pointer and
//! scroll modules, so a page can be driven from a terminal.
//!
//! Terminal cells map onto page pixels with a fixed cell size; a click on
//! row `r` hits the deepest element whose box covers document y
//! `scroll_y + r * CELL_HEIGHT_PX`.
//!
//! # API
//!
//! - `convert_key_event` - Convert crossterm KeyEvent to our KeyboardEvent
//! - `convert_mouse_event` - Convert crossterm MouseEvent to an InputEvent
//! - `poll_event` - Non-blocking event check with timeout
//! - `read_event` - Blocking event read
//! - `route_event` - Dispatch event to the page
//! - `enable_mouse` / `disable_mouse` - Control mouse capture
//!
//! # Example
//!
//! ```ignore
//! use pagefx::state::input::{poll_event, route_event};
//! use std::time::Duration;
//!
//! loop {
//!     if let Ok(Some(event)) = poll_event(Duration::from_millis(16)) {
//!         route_event(event);
//!     }
//! }
//! ```

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event as CrosstermEvent, KeyCode, KeyEventKind,
    KeyModifiers, KeyEvent as CrosstermKeyEvent, MouseButton, MouseEvent as CrosstermMouseEvent,
    MouseEventKind, poll, read,
};
use crossterm::execute;
use std::io::stdout;
use std::time::Duration;

use super::keyboard::{self, KeyState, KeyboardEvent, Modifiers};
use super::{pointer, scroll};
use crate::dom;
use crate::layout;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Page pixels per terminal column.
pub const CELL_WIDTH_PX: f32 = 8.0;

/// Page pixels per terminal row.
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// Rows scrolled per wheel notch.
pub const WHEEL_ROWS: f32 = 3.0;

// =============================================================================
// INPUT EVENT ENUM
// =============================================================================

/// Unified event type for the page
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Keyboard event (key press, release, etc.)
    Key(KeyboardEvent),
    /// Primary button press at a terminal cell
    Click { column: u16, row: u16 },
    /// Wheel scroll, positive is down (page pixels)
    Wheel(f32),
    /// Terminal resize event (new columns, rows)
    Resize(u16, u16),
    /// No event or unhandled event type
    None,
}

// =============================================================================
// KEY EVENT CONVERSION
// =============================================================================

/// Convert crossterm KeyEvent to our KeyboardEvent
pub fn convert_key_event(event: CrosstermKeyEvent) -> KeyboardEvent {
    let key = match event.code {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        _ => String::new(),
    };

    let state = match event.kind {
        KeyEventKind::Press => KeyState::Press,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Release,
    };

    KeyboardEvent {
        key,
        modifiers: Modifiers {
            ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
            alt: event.modifiers.contains(KeyModifiers::ALT),
            shift: event.modifiers.contains(KeyModifiers::SHIFT),
            meta: false, // Not exposed by crossterm
        },
        state,
    }
}

// =============================================================================
// MOUSE EVENT CONVERSION
// =============================================================================

/// Convert crossterm MouseEvent. Only left presses and vertical wheel
/// notches mean anything to the page.
pub fn convert_mouse_event(event: CrosstermMouseEvent) -> InputEvent {
    match event.kind {
        MouseEventKind::Down(MouseButton::Left) => InputEvent::Click {
            column: event.column,
            row: event.row,
        },
        MouseEventKind::ScrollDown => InputEvent::Wheel(WHEEL_ROWS * CELL_HEIGHT_PX),
        MouseEventKind::ScrollUp => InputEvent::Wheel(-WHEEL_ROWS * CELL_HEIGHT_PX),
        _ => InputEvent::None,
    }
}

// =============================================================================
// EVENT POLLING
// =============================================================================

/// Poll for an event with timeout.
/// Returns None if no event within timeout.
pub fn poll_event(timeout: Duration) -> std::io::Result<Option<InputEvent>> {
    if poll(timeout)? {
        Ok(Some(read_event()?))
    } else {
        Ok(None)
    }
}

/// Read the next event (blocking).
pub fn read_event() -> std::io::Result<InputEvent> {
    match read()? {
        CrosstermEvent::Key(key) => Ok(InputEvent::Key(convert_key_event(key))),
        CrosstermEvent::Mouse(mouse) => Ok(convert_mouse_event(mouse)),
        CrosstermEvent::Resize(w, h) => Ok(InputEvent::Resize(w, h)),
        _ => Ok(InputEvent::None),
    }
}

// =============================================================================
// EVENT ROUTING
// =============================================================================

/// Deepest laid-out element covering document y `doc_y`.
pub fn element_at(doc_y: f32) -> Option<usize> {
    let (width, _) = scroll::viewport();
    let computed = match layout::compute_layout(width) {
        Ok(computed) => computed,
        Err(err) => {
            tracing::warn!(error = %err, "layout failed, cannot hit-test");
            return None;
        }
    };

    // Pre-order: later matches are nested inside earlier ones
    let root = dom::body();
    std::iter::once(root)
        .chain(dom::descendants(root))
        .filter(|&index| {
            computed
                .element_box(index)
                .is_some_and(|(top, height)| doc_y >= top && doc_y < top + height)
        })
        .last()
}

/// Route an event to the page.
/// Returns true if a handler consumed it (or prevented its default).
pub fn route_event(event: InputEvent) -> bool {
    match event {
        InputEvent::Key(key) => keyboard::dispatch(key),
        InputEvent::Click { row, .. } => {
            let doc_y = scroll::scroll_y() + f32::from(row) * CELL_HEIGHT_PX;
            match element_at(doc_y) {
                Some(target) => pointer::click(target),
                None => false,
            }
        }
        InputEvent::Wheel(delta) => scroll::scroll_by(delta),
        InputEvent::Resize(w, h) => {
            scroll::set_viewport(f32::from(w) * CELL_WIDTH_PX, f32::from(h) * CELL_HEIGHT_PX);
            false
        }
        InputEvent::None => false,
    }
}

// =============================================================================
// MOUSE CAPTURE
// =============================================================================

/// Enable mouse capture.
pub fn enable_mouse() -> std::io::Result<()> {
    execute!(stdout(), EnableMouseCapture)
}

/// Disable mouse capture.
pub fn disable_mouse() -> std::io::Result<()> {
    execute!(stdout(), DisableMouseCapture)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementBuilder, body};
    use crossterm::event::KeyEventState;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() {
        crate::reset_page();
    }

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> CrosstermKeyEvent {
        CrosstermKeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> CrosstermMouseEvent {
        CrosstermMouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        }
    }

    #[test]
    fn test_convert_key_all_arrows() {
        let arrows = [
            (KeyCode::Up, "ArrowUp"),
            (KeyCode::Down, "ArrowDown"),
            (KeyCode::Left, "ArrowLeft"),
            (KeyCode::Right, "ArrowRight"),
        ];

        for (code, expected) in arrows {
            let event = convert_key_event(key(code, KeyModifiers::empty(), KeyEventKind::Press));
            assert_eq!(event.key, expected);
        }
    }

    #[test]
    fn test_convert_key_with_modifiers() {
        let event = convert_key_event(key(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
            KeyEventKind::Press,
        ));

        assert_eq!(event.key, "c");
        assert!(event.modifiers.ctrl);
        assert!(event.modifiers.shift);
        assert!(!event.modifiers.alt);
        assert!(!event.modifiers.meta);
    }

    #[test]
    fn test_convert_key_states() {
        let states = [
            (KeyEventKind::Press, KeyState::Press),
            (KeyEventKind::Repeat, KeyState::Repeat),
            (KeyEventKind::Release, KeyState::Release),
        ];

        for (kind, expected) in states {
            let event = convert_key_event(key(KeyCode::Char('a'), KeyModifiers::empty(), kind));
            assert_eq!(event.state, expected);
        }
    }

    #[test]
    fn test_convert_mouse() {
        assert_eq!(
            convert_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 4, 7)),
            InputEvent::Click { column: 4, row: 7 }
        );
        assert_eq!(
            convert_mouse_event(mouse(MouseEventKind::ScrollDown, 0, 0)),
            InputEvent::Wheel(48.0)
        );
        assert_eq!(
            convert_mouse_event(mouse(MouseEventKind::ScrollUp, 0, 0)),
            InputEvent::Wheel(-48.0)
        );
        assert_eq!(
            convert_mouse_event(mouse(MouseEventKind::Down(MouseButton::Right), 0, 0)),
            InputEvent::None
        );
        assert_eq!(convert_mouse_event(mouse(MouseEventKind::Moved, 3, 3)), InputEvent::None);
    }

    #[test]
    fn test_route_resize_sets_viewport() {
        setup();
        route_event(InputEvent::Resize(100, 40));
        assert_eq!(scroll::viewport(), (800.0, 640.0));
    }

    #[test]
    fn test_route_click_hits_deepest_element() {
        setup();
        let header = ElementBuilder::new("header").height(160.0).mount(body());
        let section = ElementBuilder::new("section")
            .height(400.0)
            .child(ElementBuilder::new("button").height(32.0))
            .mount(body());
        let button = dom::children_of(section)[0];

        let hits = Rc::new(RefCell::new(Vec::new()));
        let _cleanups: Vec<_> = [header, button]
            .into_iter()
            .map(|index| {
                let hits = hits.clone();
                pointer::on_click(index, move |_| hits.borrow_mut().push(index))
            })
            .collect();

        // Row 10 → y 160: first row of the section, inside the button
        route_event(InputEvent::Click { column: 0, row: 10 });
        // Row 2 → y 32: header
        route_event(InputEvent::Click { column: 0, row: 2 });

        assert_eq!(*hits.borrow(), vec![button, header]);
        assert_eq!(element_at(170.0), Some(button));
        assert_eq!(element_at(300.0), Some(section));
    }

    #[test]
    fn test_route_wheel_scrolls() {
        setup();
        ElementBuilder::new("main").height(2000.0).mount(body());
        assert!(route_event(InputEvent::Wheel(48.0)));
        assert_eq!(scroll::scroll_y(), 48.0);
    }
}

//! Scroll State Module
//!
//! Manages the page viewport:
//! - Viewport size (resizes notify listeners)
//! - Vertical scroll offset, clamped to the document height from layout
//! - Scroll listeners (the page's `scroll` event)
//! - Instant and smooth programmatic scrolling, scroll-into-view
//!
//! Smooth scrolling runs on the timer queue: one frame every `frame_ms`,
//! following a cubic ease-out curve, landing exactly on the destination.
//! Starting a new scroll cancels a smooth scroll in flight.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::dom;
use crate::layout;
use crate::state::timers::{self, TimerId};
use crate::types::ScrollBehavior;

// =============================================================================
// SCROLL CONSTANTS
// =============================================================================

pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 800.0;

/// Default smooth scroll duration (ms).
pub const SMOOTH_DURATION_MS: u64 = 400;

/// Default smooth scroll frame interval (ms, ~60fps).
pub const FRAME_MS: u64 = 16;

// =============================================================================
// STATE
// =============================================================================

/// What a viewport listener is notified about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportChange {
    Scroll,
    Resize,
}

struct ScrollState {
    viewport_width: f32,
    viewport_height: f32,
    scroll_y: f32,
    smooth_timer: Option<TimerId>,
    smooth_duration_ms: u64,
    frame_ms: u64,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            scroll_y: 0.0,
            smooth_timer: None,
            smooth_duration_ms: SMOOTH_DURATION_MS,
            frame_ms: FRAME_MS,
        }
    }
}

#[derive(Default)]
struct ListenerRegistry {
    listeners: Vec<(usize, ViewportChange, Rc<dyn Fn()>)>,
    next_id: usize,
}

thread_local! {
    static STATE: RefCell<ScrollState> = RefCell::new(ScrollState::default());
    static LISTENERS: RefCell<ListenerRegistry> = RefCell::new(ListenerRegistry::default());
}

// =============================================================================
// SCROLL STATE ACCESS
// =============================================================================

/// Current vertical scroll offset (the page's `pageYOffset`).
pub fn scroll_y() -> f32 {
    STATE.with(|s| s.borrow().scroll_y)
}

/// Viewport `(width, height)`.
pub fn viewport() -> (f32, f32) {
    STATE.with(|s| {
        let s = s.borrow();
        (s.viewport_width, s.viewport_height)
    })
}

/// Largest valid scroll offset for the current document.
pub fn max_scroll() -> f32 {
    let (width, height) = viewport();
    match layout::compute_layout(width) {
        Ok(computed) => (computed.document_height - height).max(0.0),
        Err(err) => {
            tracing::warn!(error = %err, "layout failed, scroll range unknown");
            scroll_y()
        }
    }
}

pub fn is_smooth_scrolling() -> bool {
    STATE.with(|s| s.borrow().smooth_timer.is_some())
}

/// Configure smooth scroll timing.
pub fn set_smooth_timing(duration_ms: u64, frame_ms: u64) {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        s.smooth_duration_ms = duration_ms;
        s.frame_ms = frame_ms.max(1);
    });
}

// =============================================================================
// LISTENERS
// =============================================================================

fn subscribe<F>(change: ViewportChange, handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    let id = LISTENERS.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        reg.listeners.push((id, change, Rc::new(handler)));
        id
    });

    move || {
        LISTENERS.with(|reg| {
            reg.borrow_mut().listeners.retain(|(listener_id, _, _)| *listener_id != id);
        });
    }
}

/// Subscribe to scroll notifications. Returns cleanup function.
pub fn on_scroll<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    subscribe(ViewportChange::Scroll, handler)
}

/// Subscribe to viewport resizes. Returns cleanup function.
pub fn on_resize<F>(handler: F) -> impl FnOnce()
where
    F: Fn() + 'static,
{
    subscribe(ViewportChange::Resize, handler)
}

pub fn listener_count() -> usize {
    LISTENERS.with(|reg| reg.borrow().listeners.len())
}

fn notify(change: ViewportChange) {
    let handlers: Vec<Rc<dyn Fn()>> = LISTENERS.with(|reg| {
        reg.borrow()
            .listeners
            .iter()
            .filter(|(_, kind, _)| *kind == change)
            .map(|(_, _, handler)| handler.clone())
            .collect()
    });
    for handler in handlers {
        handler();
    }
}

// =============================================================================
// SCROLL OPERATIONS
// =============================================================================

/// Move to `y` (clamped) and notify if the position changed.
fn set_position(y: f32) -> bool {
    let clamped = y.clamp(0.0, max_scroll());
    let changed = STATE.with(|s| {
        let mut s = s.borrow_mut();
        if s.scroll_y == clamped {
            return false;
        }
        s.scroll_y = clamped;
        true
    });
    if changed {
        notify(ViewportChange::Scroll);
    }
    changed
}

/// Stop a smooth scroll in flight, leaving the offset where it is.
pub fn cancel_smooth() -> bool {
    match STATE.with(|s| s.borrow_mut().smooth_timer.take()) {
        Some(id) => {
            timers::clear_timeout(id);
            tracing::debug!(at = scroll_y(), "smooth scroll cancelled");
            true
        }
        None => false,
    }
}

/// Resize the viewport, re-clamping the scroll offset.
pub fn set_viewport(width: f32, height: f32) {
    STATE.with(|s| {
        let mut s = s.borrow_mut();
        s.viewport_width = width.max(0.0);
        s.viewport_height = height.max(0.0);
    });
    notify(ViewportChange::Resize);
    set_position(scroll_y());
}

/// Jump to `y` (clamped). Returns true if the position changed.
///
/// A non-finite `y` is ignored.
pub fn scroll_to(y: f32) -> bool {
    if !y.is_finite() {
        tracing::debug!(y, "ignoring non-finite scroll destination");
        return false;
    }
    cancel_smooth();
    set_position(y)
}

/// Scroll by a delta. Returns true if the position changed.
pub fn scroll_by(delta_y: f32) -> bool {
    scroll_to(scroll_y() + delta_y)
}

pub fn scroll_to_top() -> bool {
    scroll_to(0.0)
}

pub fn scroll_to_bottom() -> bool {
    scroll_to(f32::MAX)
}

/// Animate to `y` (clamped). Returns false if already there or if `y` is
/// not finite.
pub fn smooth_scroll_to(y: f32) -> bool {
    if !y.is_finite() {
        tracing::debug!(y, "ignoring non-finite scroll destination");
        return false;
    }
    cancel_smooth();

    let from = scroll_y();
    let to = y.clamp(0.0, max_scroll());
    if from == to {
        return false;
    }

    let (duration, frame) = STATE.with(|s| {
        let s = s.borrow();
        (s.smooth_duration_ms, s.frame_ms)
    });
    if duration == 0 {
        return set_position(to);
    }

    tracing::debug!(from, to, duration, "smooth scroll started");
    schedule_frame(from, to, timers::now(), duration, frame);
    true
}

fn schedule_frame(from: f32, to: f32, started: u64, duration: u64, frame: u64) {
    let id = timers::set_timeout(Duration::from_millis(frame), move || {
        let elapsed = timers::now().saturating_sub(started);
        let t = (elapsed as f64 / duration as f64).min(1.0);
        if t >= 1.0 {
            STATE.with(|s| s.borrow_mut().smooth_timer = None);
            set_position(to);
        } else {
            set_position(lerp(from, to, ease_out_cubic(t)));
            schedule_frame(from, to, started, duration, frame);
        }
    });
    STATE.with(|s| s.borrow_mut().smooth_timer = Some(id));
}

/// Scroll so the element's top edge is at the top of the viewport.
///
/// Returns false if the element is not laid out.
pub fn scroll_into_view(index: usize, behavior: ScrollBehavior) -> bool {
    let (width, _) = viewport();
    let top = match layout::compute_layout(width) {
        Ok(computed) => computed.element_box(index).map(|(top, _)| top),
        Err(err) => {
            tracing::warn!(error = %err, "layout failed, cannot scroll into view");
            None
        }
    };
    let Some(top) = top else {
        tracing::debug!(element = index, tag = %dom::tag(index), "element not laid out");
        return false;
    };

    match behavior {
        ScrollBehavior::Instant => {
            scroll_to(top);
        }
        ScrollBehavior::Smooth => {
            smooth_scroll_to(top);
        }
    }
    true
}

/// Reset viewport, offset and listeners (for testing)
pub fn reset_scroll_state() {
    STATE.with(|s| *s.borrow_mut() = ScrollState::default());
    LISTENERS.with(|reg| *reg.borrow_mut() = ListenerRegistry::default());
}

// =============================================================================
// EASING
// =============================================================================

/// Cubic ease-out: f(t) = 1 - (1-t)³
#[inline]
fn ease_out_cubic(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

#[inline]
fn lerp(from: f32, to: f32, t: f64) -> f32 {
    (from as f64 + (to as f64 - from as f64) * t) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementBuilder, body};
    use std::cell::Cell;

    fn setup() {
        crate::reset_page();
        // 3000px document, 800px viewport → max scroll 2200
        ElementBuilder::new("main").height(3000.0).mount(body());
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_scroll_clamps_to_document() {
        setup();
        assert_eq!(max_scroll(), 2200.0);

        assert!(scroll_to(5000.0));
        assert_eq!(scroll_y(), 2200.0);

        assert!(scroll_to(-10.0));
        assert_eq!(scroll_y(), 0.0);
        assert!(!scroll_to_top());
    }

    #[test]
    fn test_listener_only_on_change() {
        setup();
        let count = Rc::new(Cell::new(0));
        let count_clone = count.clone();
        let cleanup = on_scroll(move || count_clone.set(count_clone.get() + 1));

        scroll_by(100.0);
        scroll_by(0.0);
        assert_eq!(count.get(), 1);

        cleanup();
        scroll_by(100.0);
        assert_eq!(count.get(), 1);
        assert_eq!(listener_count(), 0);
    }

    #[test]
    fn test_smooth_scroll_lands_exactly() {
        setup();
        assert!(smooth_scroll_to(1000.0));
        assert!(is_smooth_scrolling());

        timers::advance(ms(200));
        let midway = scroll_y();
        assert!(midway > 500.0 && midway < 1000.0, "ease-out passes halfway early: {midway}");

        timers::advance(ms(200));
        assert_eq!(scroll_y(), 1000.0);
        assert!(!is_smooth_scrolling());
        assert_eq!(timers::pending_count(), 0);
    }

    #[test]
    fn test_smooth_scroll_is_monotonic() {
        setup();
        let positions = Rc::new(RefCell::new(Vec::new()));
        let positions_clone = positions.clone();
        let _cleanup = on_scroll(move || positions_clone.borrow_mut().push(scroll_y()));

        smooth_scroll_to(800.0);
        timers::advance(ms(1000));

        let positions = positions.borrow();
        assert!(positions.len() > 2);
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(positions.last().copied(), Some(800.0));
    }

    #[test]
    fn test_instant_scroll_cancels_smooth() {
        setup();
        smooth_scroll_to(1500.0);
        timers::advance(ms(32));
        scroll_to(10.0);

        timers::advance(ms(1000));
        assert_eq!(scroll_y(), 10.0);
    }

    #[test]
    fn test_cancel_smooth_stops_in_place() {
        setup();
        assert!(!cancel_smooth());
        smooth_scroll_to(1500.0);
        timers::advance(ms(48));
        let stopped_at = scroll_y();
        assert!(stopped_at > 0.0);

        assert!(cancel_smooth());
        assert!(!is_smooth_scrolling());
        assert_eq!(timers::pending_count(), 0);

        timers::advance(ms(1000));
        assert_eq!(scroll_y(), stopped_at);
    }

    #[test]
    fn test_non_finite_destinations_ignored() {
        setup();
        scroll_to(300.0);

        assert!(!scroll_to(f32::NAN));
        assert!(!scroll_by(f32::INFINITY));
        assert!(!smooth_scroll_to(f32::NAN));
        assert_eq!(scroll_y(), 300.0);

        assert!(scroll_by(50.0));
        assert_eq!(scroll_y(), 350.0);
        assert!(scroll_to_bottom());
        assert_eq!(scroll_y(), 2200.0);
    }

    #[test]
    fn test_resize_reclamps() {
        setup();
        scroll_to(2200.0);
        set_viewport(1280.0, 1000.0);
        assert_eq!(scroll_y(), 2000.0);
    }

    #[test]
    fn test_scroll_into_view() {
        setup();
        let target = ElementBuilder::new("section").id("contact").height(10.0).mount(body());
        // Appended after the 3000px main: top = 3000, clamped to max 2210
        assert!(scroll_into_view(target, ScrollBehavior::Instant));
        assert_eq!(scroll_y(), 2210.0);

        let detached = dom::create_element("div");
        assert!(!scroll_into_view(detached, ScrollBehavior::Instant));
    }

    #[test]
    fn test_easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert!(ease_out_cubic(0.5) > 0.5);
    }
}

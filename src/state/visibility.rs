//! Visibility Module - Intersection observers
//!
//! Reports when elements enter or leave the viewport. An observer watches a
//! fixed set of elements against one threshold (the fraction of an element's
//! height that must be inside the viewport) and is re-evaluated:
//!
//! - once, synchronously, when it starts observing
//! - on every scroll notification
//! - on every viewport resize
//!
//! The callback receives only the entries whose intersecting flag changed
//! since the last evaluation (every target on the first one).
//!
//! # Example
//!
//! ```ignore
//! use pagefx::state::visibility;
//!
//! let disconnect = visibility::observe(vec![section], 0.3, |entries| {
//!     for entry in entries {
//!         println!("{} visible: {}", entry.target, entry.is_intersecting);
//!     }
//! });
//! // ...
//! disconnect();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::layout::{self, ComputedLayout};
use crate::state::scroll;

// =============================================================================
// TYPES
// =============================================================================

/// One observed element's visibility at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: usize,
    /// Visible fraction of the element's height, 0..=1
    pub ratio: f32,
    pub is_intersecting: bool,
}

pub type IntersectionCallback = Rc<dyn Fn(&[IntersectionEntry])>;

struct Observer {
    id: usize,
    targets: Vec<usize>,
    threshold: f32,
    /// Last reported flag per target; None until first evaluation
    last: Vec<Option<bool>>,
    callback: IntersectionCallback,
}

#[derive(Default)]
struct ObserverRegistry {
    observers: Vec<Observer>,
    next_id: usize,
}

thread_local! {
    static REGISTRY: RefCell<ObserverRegistry> = RefCell::new(ObserverRegistry::default());
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Visible fraction of the span `top..top+height` inside the viewport
/// `view_top..view_top+view_height`.
///
/// A zero-height element counts as fully visible when its top lies inside
/// the viewport.
pub fn intersection_ratio(top: f32, height: f32, view_top: f32, view_height: f32) -> f32 {
    let view_bottom = view_top + view_height;
    if height <= 0.0 {
        return if top >= view_top && top < view_bottom { 1.0 } else { 0.0 };
    }
    let visible = (top + height).min(view_bottom) - top.max(view_top);
    (visible / height).clamp(0.0, 1.0)
}

/// Threshold test. A zero threshold still needs some overlap.
pub fn meets_threshold(ratio: f32, threshold: f32) -> bool {
    if threshold <= 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold
    }
}

fn entry_for(layout: &ComputedLayout, target: usize, threshold: f32) -> IntersectionEntry {
    let (_, view_height) = scroll::viewport();
    let ratio = layout
        .element_box(target)
        .map(|(top, height)| intersection_ratio(top, height, scroll::scroll_y(), view_height))
        .unwrap_or(0.0);
    IntersectionEntry {
        target,
        ratio,
        is_intersecting: meets_threshold(ratio, threshold),
    }
}

// =============================================================================
// EVALUATION
// =============================================================================

fn current_layout() -> Option<ComputedLayout> {
    let (width, _) = scroll::viewport();
    match layout::compute_layout(width) {
        Ok(computed) => Some(computed),
        Err(err) => {
            tracing::warn!(error = %err, "layout failed, skipping visibility check");
            None
        }
    }
}

fn check_observer(id: usize, layout: &ComputedLayout) {
    let pending = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let observer = reg.observers.iter_mut().find(|o| o.id == id)?;

        let mut changed = Vec::new();
        for (slot, &target) in observer.targets.iter().enumerate() {
            let entry = entry_for(layout, target, observer.threshold);
            if observer.last[slot] != Some(entry.is_intersecting) {
                observer.last[slot] = Some(entry.is_intersecting);
                changed.push(entry);
            }
        }
        Some((observer.callback.clone(), changed))
    });

    // Registry borrow released: the callback may observe or disconnect
    if let Some((callback, entries)) = pending {
        if !entries.is_empty() {
            callback(&entries);
        }
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Observe `targets` against `threshold`. Returns a disconnect function.
pub fn observe<F>(targets: Vec<usize>, threshold: f32, callback: F) -> impl FnOnce()
where
    F: Fn(&[IntersectionEntry]) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id;
        reg.next_id += 1;
        let last = vec![None; targets.len()];
        reg.observers.push(Observer {
            id,
            targets,
            threshold,
            last,
            callback: Rc::new(callback),
        });
        id
    });

    let stop_scroll = scroll::on_scroll(move || {
        if let Some(layout) = current_layout() {
            check_observer(id, &layout);
        }
    });
    let stop_resize = scroll::on_resize(move || {
        if let Some(layout) = current_layout() {
            check_observer(id, &layout);
        }
    });

    if let Some(layout) = current_layout() {
        check_observer(id, &layout);
    }

    move || {
        stop_scroll();
        stop_resize();
        REGISTRY.with(|reg| reg.borrow_mut().observers.retain(|o| o.id != id));
    }
}

pub fn observer_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().observers.len())
}

/// Drop all observers (for testing)
pub fn reset_visibility_state() {
    REGISTRY.with(|reg| *reg.borrow_mut() = ObserverRegistry::default());
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementBuilder, body};
    use std::cell::Cell;

    fn setup() {
        crate::reset_page();
    }

    #[test]
    fn test_intersection_ratio() {
        // Fully inside
        assert_eq!(intersection_ratio(100.0, 200.0, 0.0, 800.0), 1.0);
        // Half below the fold
        assert_eq!(intersection_ratio(700.0, 200.0, 0.0, 800.0), 0.5);
        // Entirely below
        assert_eq!(intersection_ratio(900.0, 200.0, 0.0, 800.0), 0.0);
        // Scrolled past
        assert_eq!(intersection_ratio(0.0, 100.0, 500.0, 800.0), 0.0);
        // Zero height
        assert_eq!(intersection_ratio(10.0, 0.0, 0.0, 800.0), 1.0);
        assert_eq!(intersection_ratio(800.0, 0.0, 0.0, 800.0), 0.0);
    }

    #[test]
    fn test_meets_threshold() {
        assert!(meets_threshold(0.5, 0.5));
        assert!(!meets_threshold(0.49, 0.5));
        assert!(!meets_threshold(0.0, 0.0));
        assert!(meets_threshold(0.01, 0.0));
    }

    #[test]
    fn test_observe_reports_initial_and_changes() {
        setup();
        ElementBuilder::new("div").height(1000.0).mount(body());
        let target = ElementBuilder::new("div").height(200.0).mount(body());
        ElementBuilder::new("div").height(1000.0).mount(body());

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        let disconnect = observe(vec![target], 0.5, move |entries| {
            seen_clone
                .borrow_mut()
                .extend(entries.iter().map(|e| e.is_intersecting));
        });

        // Initial evaluation: below the fold
        assert_eq!(*seen.borrow(), vec![false]);

        // 50px of 200 visible: not enough
        scroll::scroll_to(250.0);
        assert_eq!(seen.borrow().len(), 1);

        // 100 of 200 visible: enters
        scroll::scroll_to(300.0);
        assert_eq!(*seen.borrow(), vec![false, true]);

        // Still in: no new entry
        scroll::scroll_to(400.0);
        assert_eq!(seen.borrow().len(), 2);

        // Scrolled past
        scroll::scroll_to(1300.0);
        assert_eq!(*seen.borrow(), vec![false, true, false]);

        disconnect();
        assert_eq!(observer_count(), 0);
        scroll::scroll_to(300.0);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn test_resize_reevaluates() {
        setup();
        ElementBuilder::new("div").height(900.0).mount(body());
        let target = ElementBuilder::new("div").height(100.0).mount(body());

        let visible = Rc::new(Cell::new(false));
        let visible_clone = visible.clone();
        let _disconnect = observe(vec![target], 0.3, move |entries| {
            visible_clone.set(entries[0].is_intersecting);
        });
        assert!(!visible.get());

        scroll::set_viewport(1280.0, 1000.0);
        assert!(visible.get());
    }

    #[test]
    fn test_hidden_element_never_intersects() {
        setup();
        let target = ElementBuilder::new("div")
            .height(100.0)
            .style("display", "none")
            .mount(body());

        let entries_seen = Rc::new(RefCell::new(Vec::new()));
        let clone = entries_seen.clone();
        let _disconnect = observe(vec![target], 0.1, move |entries| {
            clone.borrow_mut().extend_from_slice(entries);
        });

        let entries = entries_seen.borrow();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ratio, 0.0);
        assert!(!entries[0].is_intersecting);
    }
}

//! Carousel - Slider regions with prev/next controls, indicators and swipe
//!
//! One `Carousel` per `.slider-wrapper` region. Each instance owns its own
//! position; every input channel funnels into the same three operations:
//!
//! - `go_to_slide(i)` - clamp into `[0, N-1]`, then render
//! - `next_slide()` - no-op on the last panel
//! - `prev_slide()` - no-op on the first panel
//!
//! Render keeps the container transform, the active indicator and the
//! controls' disabled flags consistent with the current position.
//!
//! # Region structure
//!
//! ```text
//! <div>                          region parent
//!   <div class="slider-wrapper">
//!     <div class="slider-container">
//!       <div class="slider-item">...</div>   × N
//!     </div>
//!     <button class="slider-btn prev">
//!     <button class="slider-btn next">
//!   </div>
//!   <div class="slider-dots"></div>          rebuilt on mount
//! </div>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pagefx::effects::carousel::{Carousel, ActiveRegion};
//!
//! let carousel = Carousel::mount(wrapper, 0, &config.carousel, ActiveRegion::default())?;
//! carousel.next_slide();
//! assert_eq!(carousel.current_index(), Some(1));
//! carousel.detach();
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::config::{CarouselConfig, KeyboardScope};
use crate::dom::{self, ElementBuilder, ElementRef};
use crate::error::{PageError, Result};
use crate::state::keyboard;
use crate::state::pointer::{self, PointerKind};
use crate::types::Cleanup;

// =============================================================================
// SLIDE CURSOR
// =============================================================================

/// Bounded position over `len` panels. No wraparound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideCursor {
    len: usize,
    current: usize,
}

impl SlideCursor {
    pub fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Current position; `None` when there are no panels.
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.current)
    }

    /// Jump to `index`, clamped into `[0, len-1]`.
    pub fn go_to(&mut self, index: isize) {
        if self.len == 0 {
            return;
        }
        let last = self.len - 1;
        self.current = usize::try_from(index.max(0)).unwrap_or(0).min(last);
    }

    /// Step forward. Returns false at the last panel.
    pub fn next(&mut self) -> bool {
        if self.at_end() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Step back. Returns false at the first panel.
    pub fn prev(&mut self) -> bool {
        if self.at_start() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn at_start(&self) -> bool {
        self.current == 0
    }

    /// True on the last panel, and always when there are no panels.
    pub fn at_end(&self) -> bool {
        self.len == 0 || self.current == self.len - 1
    }
}

// =============================================================================
// SWIPE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Next,
    Prev,
}

/// Classify a horizontal swipe. `distance = start_x - end_x`; anything
/// inside `[-threshold, threshold]` is a tap.
pub fn swipe_direction(start_x: f32, end_x: f32, threshold: f32) -> Option<SwipeDirection> {
    let distance = start_x - end_x;
    if distance > threshold {
        Some(SwipeDirection::Next)
    } else if distance < -threshold {
        Some(SwipeDirection::Prev)
    } else {
        None
    }
}

// =============================================================================
// REGION PARTS
// =============================================================================

/// The elements a slider region is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderParts {
    pub wrapper: usize,
    pub container: usize,
    pub prev: usize,
    pub next: usize,
    pub dots: usize,
}

impl SliderParts {
    /// Locate the parts of region `region` rooted at `wrapper`.
    ///
    /// The indicator strip lives next to the wrapper, so it is looked up in
    /// the wrapper's parent.
    pub fn find(wrapper: usize, region: usize) -> Result<Self> {
        let require = |scope: Option<usize>, selector: &str, part: &'static str| -> Result<usize> {
            let found = match scope {
                Some(scope) => dom::query_selector(scope, selector)?,
                None => None,
            };
            found.ok_or(PageError::MissingSliderPart { region, part })
        };

        Ok(Self {
            wrapper,
            container: require(Some(wrapper), ".slider-container", "slider container")?,
            prev: require(Some(wrapper), ".slider-btn.prev", "previous control")?,
            next: require(Some(wrapper), ".slider-btn.next", "next control")?,
            dots: require(dom::parent_of(wrapper), ".slider-dots", "indicator strip")?,
        })
    }
}

// =============================================================================
// KEYBOARD SCOPE
// =============================================================================

/// The region the user last touched or clicked, shared by every carousel on
/// a page. Only consulted with `KeyboardScope::Focused`.
#[derive(Debug, Clone, Default)]
pub struct ActiveRegion(Rc<Cell<Option<usize>>>);

impl ActiveRegion {
    pub fn get(&self) -> Option<usize> {
        self.0.get()
    }

    pub fn set(&self, region: usize) {
        self.0.set(Some(region));
    }
}

// =============================================================================
// CAROUSEL
// =============================================================================

struct SliderState {
    region: usize,
    parts: SliderParts,
    slides: Vec<usize>,
    dots: Vec<ElementRef>,
    cursor: Cell<SlideCursor>,
}

impl SliderState {
    fn render(&self) {
        let cursor = self.cursor.get();
        let current = cursor.current().unwrap_or(0);

        dom::set_style(
            self.parts.container,
            "transform",
            &format!("translateX(-{}%)", current * 100),
        );
        // Another region may have regenerated the strip since
        for (i, dot) in self.dots.iter().enumerate() {
            if dot.is_live() {
                dom::toggle_class(dot.index(), "active", cursor.current() == Some(i));
            }
        }
        dom::set_disabled(self.parts.prev, cursor.is_empty() || cursor.at_start());
        dom::set_disabled(self.parts.next, cursor.at_end());
    }

    fn go_to_slide(&self, index: isize) {
        let mut cursor = self.cursor.get();
        cursor.go_to(index);
        self.cursor.set(cursor);
        tracing::debug!(region = self.region, index = ?cursor.current(), "go to slide");
        self.render();
    }

    fn next_slide(&self) {
        let mut cursor = self.cursor.get();
        if cursor.next() {
            self.cursor.set(cursor);
            tracing::debug!(region = self.region, index = ?cursor.current(), "next slide");
            self.render();
        }
    }

    fn prev_slide(&self) {
        let mut cursor = self.cursor.get();
        if cursor.prev() {
            self.cursor.set(cursor);
            tracing::debug!(region = self.region, index = ?cursor.current(), "previous slide");
            self.render();
        }
    }
}

/// A mounted slider region and the listeners it owns.
pub struct Carousel {
    state: Rc<SliderState>,
    cleanups: Vec<Cleanup>,
}

impl Carousel {
    /// Wire the region rooted at `wrapper`.
    ///
    /// Fails without touching the page if any required part is missing.
    pub fn mount(
        wrapper: usize,
        region: usize,
        config: &CarouselConfig,
        active: ActiveRegion,
    ) -> Result<Self> {
        let parts = SliderParts::find(wrapper, region)?;
        let slides = dom::query_selector_all(parts.container, ".slider-item")?;

        // Regenerate indicators, one per panel
        dom::clear_children(parts.dots);
        let dots: Vec<ElementRef> = slides
            .iter()
            .map(|_| ElementRef::new(ElementBuilder::new("span").class("dot").mount(parts.dots)))
            .collect();

        let state = Rc::new(SliderState {
            region,
            parts,
            cursor: Cell::new(SlideCursor::new(slides.len())),
            slides,
            dots,
        });
        let mut cleanups: Vec<Cleanup> = Vec::new();

        // ---------------------------------------------------------------------
        // Pointer: controls and indicators
        // ---------------------------------------------------------------------

        let s = state.clone();
        cleanups.push(Box::new(pointer::on_click(parts.prev, move |event| {
            event.prevent_default();
            s.prev_slide();
        })));

        let s = state.clone();
        cleanups.push(Box::new(pointer::on_click(parts.next, move |event| {
            event.prevent_default();
            s.next_slide();
        })));

        for (i, dot) in state.dots.iter().enumerate() {
            let s = state.clone();
            let active = active.clone();
            let target = isize::try_from(i).unwrap_or(isize::MAX);
            cleanups.push(Box::new(pointer::on_click(dot.index(), move |_| {
                active.set(s.region);
                s.go_to_slide(target);
            })));
        }

        // Any click or touch inside the region makes it the keyboard target
        for kind in [PointerKind::Click, PointerKind::TouchStart] {
            let active = active.clone();
            cleanups.push(Box::new(pointer::on(wrapper, kind, move |_| active.set(region))));
        }

        // ---------------------------------------------------------------------
        // Keyboard
        // ---------------------------------------------------------------------

        let scope = config.keyboard_scope;
        let accepts_keys = {
            let active = active.clone();
            move || match scope {
                KeyboardScope::All => true,
                KeyboardScope::Focused => active.get() == Some(region),
            }
        };

        let s = state.clone();
        let accepts = accepts_keys.clone();
        cleanups.push(Box::new(keyboard::on_key("ArrowLeft", move || {
            if accepts() {
                s.prev_slide();
            }
            false
        })));

        let s = state.clone();
        let accepts = accepts_keys;
        cleanups.push(Box::new(keyboard::on_key("ArrowRight", move || {
            if accepts() {
                s.next_slide();
            }
            false
        })));

        // ---------------------------------------------------------------------
        // Touch
        // ---------------------------------------------------------------------

        let touch_start_x = Rc::new(Cell::new(0.0_f32));

        let start = touch_start_x.clone();
        cleanups.push(Box::new(pointer::on(
            parts.container,
            PointerKind::TouchStart,
            move |event| start.set(event.screen_x),
        )));

        let s = state.clone();
        let threshold = config.swipe_threshold;
        cleanups.push(Box::new(pointer::on(
            parts.container,
            PointerKind::TouchEnd,
            move |event| match swipe_direction(touch_start_x.get(), event.screen_x, threshold) {
                Some(SwipeDirection::Next) => s.next_slide(),
                Some(SwipeDirection::Prev) => s.prev_slide(),
                None => {}
            },
        )));

        state.render();
        tracing::debug!(region, slides = state.slides.len(), "carousel mounted");

        Ok(Self { state, cleanups })
    }

    pub fn go_to_slide(&self, index: isize) {
        self.state.go_to_slide(index);
    }

    pub fn next_slide(&self) {
        self.state.next_slide();
    }

    pub fn prev_slide(&self) {
        self.state.prev_slide();
    }

    /// Current panel; `None` for a region without panels.
    pub fn current_index(&self) -> Option<usize> {
        self.state.cursor.get().current()
    }

    pub fn slide_count(&self) -> usize {
        self.state.slides.len()
    }

    pub fn region(&self) -> usize {
        self.state.region
    }

    pub fn parts(&self) -> SliderParts {
        self.state.parts
    }

    pub fn slides(&self) -> &[usize] {
        &self.state.slides
    }

    /// Indicators this region created that are still in the page.
    pub fn indicators(&self) -> Vec<usize> {
        self.state
            .dots
            .iter()
            .filter(|dot| dot.is_live())
            .map(ElementRef::index)
            .collect()
    }

    /// Detach every listener. The page keeps its last rendered state.
    pub fn detach(self) {
        for cleanup in self.cleanups {
            cleanup();
        }
        tracing::debug!(region = self.state.region, "carousel detached");
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::body;
    use crate::state::keyboard::KeyboardEvent;

    fn setup() {
        crate::reset_page();
    }

    /// Build a region with `panels` slides; returns the wrapper.
    fn build_region(panels: usize) -> usize {
        let section = ElementBuilder::new("div")
            .class("project")
            .child(
                ElementBuilder::new("div")
                    .class("slider-wrapper")
                    .child(ElementBuilder::new("div").class("slider-container").children(
                        (0..panels).map(|_| ElementBuilder::new("div").class("slider-item")),
                    ))
                    .child(ElementBuilder::new("button").classes("slider-btn prev"))
                    .child(ElementBuilder::new("button").classes("slider-btn next")),
            )
            .child(
                ElementBuilder::new("div")
                    .class("slider-dots")
                    .child(ElementBuilder::new("span").class("stale")),
            )
            .mount(body());
        dom::children_of(section)[0]
    }

    fn mount(wrapper: usize, region: usize) -> Carousel {
        Carousel::mount(wrapper, region, &CarouselConfig::default(), ActiveRegion::default())
            .expect("region is complete")
    }

    fn press(key: &str) {
        keyboard::dispatch(KeyboardEvent::new(key));
    }

    #[test]
    fn test_cursor_clamps() {
        for i in -5..10 {
            let mut cursor = SlideCursor::new(4);
            cursor.go_to(i);
            assert_eq!(cursor.current(), Some(i.clamp(0, 3) as usize));
        }

        let mut empty = SlideCursor::new(0);
        empty.go_to(3);
        assert_eq!(empty.current(), None);
        assert!(!empty.next());
        assert!(!empty.prev());
    }

    #[test]
    fn test_cursor_boundaries_are_idempotent() {
        let mut cursor = SlideCursor::new(3);
        assert!(!cursor.prev());
        assert!(cursor.next());
        assert!(cursor.next());
        assert!(!cursor.next());
        assert!(!cursor.next());
        assert_eq!(cursor.current(), Some(2));
    }

    #[test]
    fn test_swipe_direction() {
        assert_eq!(swipe_direction(200.0, 100.0, 50.0), Some(SwipeDirection::Next));
        assert_eq!(swipe_direction(100.0, 200.0, 50.0), Some(SwipeDirection::Prev));
        assert_eq!(swipe_direction(100.0, 150.0, 50.0), None);
        assert_eq!(swipe_direction(150.0, 100.0, 50.0), None);
        assert_eq!(swipe_direction(100.0, 110.0, 50.0), None);

        // distance 60, 40 and -60
        assert_eq!(swipe_direction(260.0, 200.0, 50.0), Some(SwipeDirection::Next));
        assert_eq!(swipe_direction(240.0, 200.0, 50.0), None);
        assert_eq!(swipe_direction(200.0, 260.0, 50.0), Some(SwipeDirection::Prev));
    }

    #[test]
    fn test_mount_renders_initial_state() {
        setup();
        let carousel = mount(build_region(4), 0);
        let parts = carousel.parts();

        assert_eq!(carousel.current_index(), Some(0));
        assert_eq!(carousel.slide_count(), 4);

        // Indicators regenerated: stale child gone, one dot per panel
        let dots = dom::children_of(parts.dots);
        assert_eq!(dots, carousel.indicators());
        assert_eq!(dots.len(), 4);
        assert!(dots.iter().all(|&d| dom::tag(d) == "span" && dom::has_class(d, "dot")));
        assert!(dom::has_class(dots[0], "active"));
        assert!(!dom::has_class(dots[1], "active"));

        assert_eq!(dom::style(parts.container, "transform").as_deref(), Some("translateX(-0%)"));
        assert!(dom::is_disabled(parts.prev));
        assert!(!dom::is_disabled(parts.next));
    }

    #[test]
    fn test_right_arrow_on_four_panels() {
        setup();
        let carousel = mount(build_region(4), 0);
        let parts = carousel.parts();

        press("ArrowRight");

        assert_eq!(carousel.current_index(), Some(1));
        let dots = carousel.indicators();
        assert!(dom::has_class(dots[1], "active"));
        assert_eq!(dots.iter().filter(|&&d| dom::has_class(d, "active")).count(), 1);
        assert!(!dom::is_disabled(parts.prev));
        assert!(!dom::is_disabled(parts.next));
        assert_eq!(dom::style(parts.container, "transform").as_deref(), Some("translateX(-100%)"));
    }

    #[test]
    fn test_go_to_slide_clamps_and_renders() {
        setup();
        let carousel = mount(build_region(4), 0);
        let parts = carousel.parts();

        carousel.go_to_slide(9);
        assert_eq!(carousel.current_index(), Some(3));
        assert!(dom::is_disabled(parts.next));
        assert_eq!(dom::style(parts.container, "transform").as_deref(), Some("translateX(-300%)"));

        carousel.go_to_slide(-2);
        assert_eq!(carousel.current_index(), Some(0));
        assert!(dom::is_disabled(parts.prev));
    }

    #[test]
    fn test_controls_and_indicators() {
        setup();
        let carousel = mount(build_region(3), 0);
        let parts = carousel.parts();

        // Disabled prev control receives nothing
        assert!(!pointer::click(parts.prev));
        assert_eq!(carousel.current_index(), Some(0));

        // Next suppresses the default action
        assert!(pointer::click(parts.next));
        assert_eq!(carousel.current_index(), Some(1));

        pointer::click(carousel.indicators()[2]);
        assert_eq!(carousel.current_index(), Some(2));
        assert!(dom::is_disabled(parts.next));

        // Boundary: next is disabled now, clicking it changes nothing
        pointer::click(parts.next);
        assert_eq!(carousel.current_index(), Some(2));

        pointer::click(parts.prev);
        assert_eq!(carousel.current_index(), Some(1));
    }

    #[test]
    fn test_swipe_navigation() {
        setup();
        let carousel = mount(build_region(3), 0);
        let container = carousel.parts().container;

        pointer::swipe(container, 300.0, 240.0);
        assert_eq!(carousel.current_index(), Some(1));

        // Dead zone
        pointer::swipe(container, 300.0, 250.0);
        assert_eq!(carousel.current_index(), Some(1));

        // Touch on a panel bubbles to the container
        let panel = carousel.slides()[1];
        pointer::swipe(panel, 100.0, 200.0);
        assert_eq!(carousel.current_index(), Some(0));
    }

    #[test]
    fn test_swipe_distances_move_one_slide() {
        setup();
        let carousel = mount(build_region(4), 0);
        let container = carousel.parts().container;

        pointer::swipe(container, 260.0, 200.0);
        assert_eq!(carousel.current_index(), Some(1));
        pointer::swipe(container, 260.0, 200.0);
        assert_eq!(carousel.current_index(), Some(2));

        pointer::swipe(container, 240.0, 200.0);
        assert_eq!(carousel.current_index(), Some(2));

        pointer::swipe(container, 200.0, 260.0);
        assert_eq!(carousel.current_index(), Some(1));
    }

    #[test]
    fn test_shared_strip_keeps_instances_apart() {
        setup();
        let section = ElementBuilder::new("section")
            .children((0..2).map(|_| {
                ElementBuilder::new("div")
                    .class("slider-wrapper")
                    .child(ElementBuilder::new("div").class("slider-container").children(
                        (0..3).map(|_| ElementBuilder::new("div").class("slider-item")),
                    ))
                    .child(ElementBuilder::new("button").classes("slider-btn prev"))
                    .child(ElementBuilder::new("button").classes("slider-btn next"))
            }))
            .child(ElementBuilder::new("div").class("slider-dots"))
            .mount(body());
        let wrappers = dom::children_of(section);

        let first = mount(wrappers[0], 0);
        let second = mount(wrappers[1], 1);
        let strip = second.parts().dots;
        assert_eq!(first.parts().dots, strip);

        // The strip now belongs to the second region only
        assert!(first.indicators().is_empty());
        assert_eq!(second.indicators(), dom::children_of(strip));

        second.go_to_slide(1);
        first.go_to_slide(0);
        first.next_slide();
        first.go_to_slide(0);

        let active: Vec<bool> = second
            .indicators()
            .iter()
            .map(|&dot| dom::has_class(dot, "active"))
            .collect();
        assert_eq!(active, vec![false, true, false]);
        assert_eq!(first.current_index(), Some(0));
    }

    #[test]
    fn test_zero_panels() {
        setup();
        let carousel = mount(build_region(0), 0);
        let parts = carousel.parts();

        assert_eq!(carousel.current_index(), None);
        assert!(carousel.indicators().is_empty());
        assert!(dom::is_disabled(parts.prev));
        assert!(dom::is_disabled(parts.next));

        press("ArrowRight");
        press("ArrowLeft");
        carousel.go_to_slide(2);
        pointer::swipe(parts.container, 300.0, 100.0);
        assert_eq!(carousel.current_index(), None);
    }

    #[test]
    fn test_missing_part() {
        setup();
        let wrapper = build_region(2);
        let next = dom::query_selector(wrapper, ".slider-btn.next").unwrap().unwrap();
        dom::remove_class(next, "next");

        let result = Carousel::mount(wrapper, 3, &CarouselConfig::default(), ActiveRegion::default());
        match result {
            Err(PageError::MissingSliderPart { region, part }) => {
                assert_eq!(region, 3);
                assert_eq!(part, "next control");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("region without a next control mounted"),
        }
        assert_eq!(keyboard::handler_count(), 0);
    }

    #[test]
    fn test_keyboard_broadcasts_to_every_instance() {
        setup();
        let first = mount(build_region(3), 0);
        let second = mount(build_region(3), 1);

        press("ArrowRight");
        assert_eq!(first.current_index(), Some(1));
        assert_eq!(second.current_index(), Some(1));
    }

    #[test]
    fn test_focused_keyboard_scope() {
        setup();
        let config = CarouselConfig {
            keyboard_scope: KeyboardScope::Focused,
            ..CarouselConfig::default()
        };
        let active = ActiveRegion::default();
        let first = Carousel::mount(build_region(3), 0, &config, active.clone()).unwrap();
        let second = Carousel::mount(build_region(3), 1, &config, active.clone()).unwrap();

        // Nothing touched yet
        press("ArrowRight");
        assert_eq!(first.current_index(), Some(0));
        assert_eq!(second.current_index(), Some(0));

        pointer::swipe(second.parts().container, 100.0, 100.0);
        assert_eq!(active.get(), Some(1));
        press("ArrowRight");
        assert_eq!(first.current_index(), Some(0));
        assert_eq!(second.current_index(), Some(1));

        pointer::click(first.indicators()[1]);
        press("ArrowRight");
        assert_eq!(first.current_index(), Some(2));
        assert_eq!(second.current_index(), Some(1));
    }

    #[test]
    fn test_detach() {
        setup();
        let carousel = mount(build_region(3), 0);
        let parts = carousel.parts();
        let dot = carousel.indicators()[2];
        carousel.detach();

        assert_eq!(keyboard::handler_count(), 0);
        assert_eq!(pointer::handler_count(parts.next), 0);
        assert_eq!(pointer::handler_count(dot), 0);

        press("ArrowRight");
        pointer::click(dot);
        assert_eq!(dom::style(parts.container, "transform").as_deref(), Some("translateX(-0%)"));
    }
}

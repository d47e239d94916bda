//! Parallax Updater - Scroll-linked vertical translation
//!
//! On every scroll notification each element carrying a speed factor
//! (`data-parallax` by default) gets `transform: translateY(-(scroll_y * speed)px)`.
//! Stateless between notifications.

use crate::config::ParallaxConfig;
use crate::dom;
use crate::state::scroll;
use crate::types::Cleanup;

/// Vertical offset for `speed` at `scroll_y`. Never negative zero.
pub fn parallax_offset(scroll_y: f32, speed: f32) -> f32 {
    let offset = -(scroll_y * speed);
    if offset == 0.0 { 0.0 } else { offset }
}

/// `translateY(...)` value for an offset in pixels.
pub fn translate_y(offset: f32) -> String {
    format!("translateY({offset}px)")
}

/// Apply the current scroll offset to every element carrying `attribute`.
/// Returns the number of elements updated.
pub fn update_parallax(attribute: &str) -> usize {
    let scroll_y = scroll::scroll_y();
    let root = dom::body();
    let mut updated = 0;

    for index in dom::descendants(root) {
        let Some(raw) = dom::attribute(index, attribute) else {
            continue;
        };
        match raw.trim().parse::<f32>() {
            Ok(speed) if speed.is_finite() => {
                dom::set_style(index, "transform", &translate_y(parallax_offset(scroll_y, speed)));
                updated += 1;
            }
            _ => tracing::debug!(element = index, speed = %raw, "skipping non-numeric parallax speed"),
        }
    }
    updated
}

/// Keeps parallax elements in step with scrolling until detached.
pub struct Parallax {
    cleanup: Cleanup,
}

impl Parallax {
    pub fn mount(config: &ParallaxConfig) -> Self {
        let attribute = config.attribute.clone();
        let cleanup = scroll::on_scroll(move || {
            update_parallax(&attribute);
        });
        Self { cleanup: Box::new(cleanup) }
    }

    pub fn detach(self) {
        (self.cleanup)();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementBuilder, body};

    fn setup() -> (usize, usize) {
        crate::reset_page();
        let slow = ElementBuilder::new("div")
            .class("orbit")
            .attr("data-parallax", "0.5")
            .mount(body());
        let fast = ElementBuilder::new("div").attr("data-parallax", "1.25").mount(body());
        ElementBuilder::new("main").height(3000.0).mount(body());
        (slow, fast)
    }

    #[test]
    fn test_parallax_offset() {
        assert_eq!(parallax_offset(200.0, 0.5), -100.0);
        assert_eq!(parallax_offset(100.0, -0.2), 20.0);
        assert!(parallax_offset(0.0, 0.5).is_sign_positive());
        assert_eq!(translate_y(parallax_offset(0.0, 0.5)), "translateY(0px)");
        assert_eq!(translate_y(-12.5), "translateY(-12.5px)");
    }

    #[test]
    fn test_updates_on_scroll() {
        let (slow, fast) = setup();
        let parallax = Parallax::mount(&ParallaxConfig::default());

        // Nothing until the first scroll notification
        assert_eq!(dom::style(slow, "transform"), None);

        scroll::scroll_to(200.0);
        assert_eq!(dom::style(slow, "transform").as_deref(), Some("translateY(-100px)"));
        assert_eq!(dom::style(fast, "transform").as_deref(), Some("translateY(-250px)"));

        scroll::scroll_to(0.0);
        assert_eq!(dom::style(slow, "transform").as_deref(), Some("translateY(0px)"));

        parallax.detach();
        scroll::scroll_to(400.0);
        assert_eq!(dom::style(slow, "transform").as_deref(), Some("translateY(0px)"));
    }

    #[test]
    fn test_skips_non_numeric_speed() {
        let (slow, _) = setup();
        let bad = ElementBuilder::new("div").attr("data-parallax", "fast").mount(body());
        scroll::scroll_to(100.0);

        assert_eq!(update_parallax("data-parallax"), 2);
        assert_eq!(dom::style(bad, "transform"), None);
        assert_eq!(dom::style(slow, "transform").as_deref(), Some("translateY(-50px)"));
    }
}

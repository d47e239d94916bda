//! Visibility Trigger - Skill bars and scale-on-scroll reveals
//!
//! Two independent observers:
//!
//! - **Skill bars** (`.skill-progress`, threshold 0.5): on entry, publish
//!   `data-width` as the `--target-width` style property and add `animate`.
//!   Permanent; leaving the viewport changes nothing.
//! - **Scale reveals** (`.scale-on-scroll`, threshold 0.3): `active` is added
//!   on entry and removed on exit.

use crate::config::VisibilityConfig;
use crate::dom;
use crate::error::Result;
use crate::state::visibility::{self, IntersectionEntry};
use crate::types::Cleanup;

fn animate_skill_bar(entry: &IntersectionEntry) {
    if !entry.is_intersecting {
        return;
    }
    let bar = entry.target;
    if let Some(width) = dom::attribute(bar, "data-width") {
        dom::set_style(bar, "--target-width", &width);
    }
    if dom::add_class(bar, "animate") {
        tracing::trace!(element = bar, "skill bar animated");
    }
}

fn toggle_reveal(entry: &IntersectionEntry) {
    dom::toggle_class(entry.target, "active", entry.is_intersecting);
}

/// Both visibility observers for a page.
pub struct Reveal {
    skill_bars: usize,
    scale_reveals: usize,
    disconnects: Vec<Cleanup>,
}

impl Reveal {
    pub fn mount(config: &VisibilityConfig) -> Result<Self> {
        let root = dom::body();
        let bars = dom::query_selector_all(root, &config.skill_selector)?;
        let reveals = dom::query_selector_all(root, &config.reveal_selector)?;
        let skill_bars = bars.len();
        let scale_reveals = reveals.len();

        let mut disconnects: Vec<Cleanup> = Vec::new();
        disconnects.push(Box::new(visibility::observe(
            bars,
            config.skill_threshold,
            |entries| entries.iter().for_each(animate_skill_bar),
        )));
        disconnects.push(Box::new(visibility::observe(
            reveals,
            config.reveal_threshold,
            |entries| entries.iter().for_each(toggle_reveal),
        )));

        tracing::debug!(skill_bars, scale_reveals, "visibility triggers mounted");
        Ok(Self {
            skill_bars,
            scale_reveals,
            disconnects,
        })
    }

    pub fn skill_bar_count(&self) -> usize {
        self.skill_bars
    }

    pub fn scale_reveal_count(&self) -> usize {
        self.scale_reveals
    }

    pub fn detach(self) {
        for disconnect in self.disconnects {
            disconnect();
        }
    }
}

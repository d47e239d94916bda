//! Anchor Navigator - Delayed smooth scrolling for in-page links
//!
//! For each configured target name, every `a[href="#name"]` on the page has
//! its default jump suppressed; after a fixed delay (300ms by default) the
//! element with id `name` is smooth-scrolled into view. The target is looked
//! up when the delay fires, so it may be added after mounting. Links to other
//! ids keep the default instant jump. A target name that cannot be turned
//! into a selector is logged and skipped; the other targets still mount.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::AnchorConfig;
use crate::dom;
use crate::state::pointer;
use crate::state::scroll;
use crate::state::timers::{self, TimerId};
use crate::types::{Cleanup, ScrollBehavior};

/// Wired anchor links plus any scrolls still waiting on their delay.
pub struct AnchorNavigator {
    links: Vec<usize>,
    pending: Rc<RefCell<Vec<TimerId>>>,
    cleanups: Vec<Cleanup>,
}

impl AnchorNavigator {
    pub fn mount(config: &AnchorConfig) -> Self {
        let delay = Duration::from_millis(config.delay_ms);
        let pending: Rc<RefCell<Vec<TimerId>>> = Rc::new(RefCell::new(Vec::new()));
        let mut links = Vec::new();
        let mut cleanups: Vec<Cleanup> = Vec::new();

        for name in &config.targets {
            let selector = format!("a[href=\"#{name}\"]");
            let targets = match dom::query_selector_all(dom::body(), &selector) {
                Ok(targets) => targets,
                Err(err) => {
                    tracing::warn!(anchor = %name, error = %err, "anchor target skipped");
                    continue;
                }
            };
            for link in targets {
                let name = name.clone();
                let pending_for_link = pending.clone();
                cleanups.push(Box::new(pointer::on_click(link, move |event| {
                    event.prevent_default();
                    schedule_scroll(&name, delay, &pending_for_link);
                })));
                links.push(link);
            }
        }

        tracing::debug!(links = links.len(), "anchor navigation mounted");
        Self { links, pending, cleanups }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Scrolls clicked for but not yet started.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Detach every link handler, cancel scrolls still waiting and stop a
    /// smooth scroll already under way.
    pub fn detach(self) {
        for cleanup in self.cleanups {
            cleanup();
        }
        for id in self.pending.borrow_mut().drain(..) {
            timers::clear_timeout(id);
        }
        scroll::cancel_smooth();
    }
}

fn schedule_scroll(name: &str, delay: Duration, pending: &Rc<RefCell<Vec<TimerId>>>) {
    let name = name.to_string();
    let pending_for_timer = pending.clone();
    let id = timers::set_timeout(delay, move || {
        pending_for_timer.borrow_mut().retain(|&id| timers::is_pending(id));
        match dom::get_element_by_id(&name) {
            Some(destination) => {
                tracing::debug!(anchor = %name, "smooth scrolling to anchor");
                scroll::scroll_into_view(destination, ScrollBehavior::Smooth);
            }
            None => tracing::warn!(anchor = %name, "anchor target not found"),
        }
    });
    pending.borrow_mut().push(id);
}

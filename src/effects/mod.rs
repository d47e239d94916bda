//! Effects - The page enhancements
//!
//! Five independent components wired onto the page surface:
//!
//! - [`reveal`] - Skill bars and scale-on-scroll reveals (visibility triggers)
//! - [`parallax`] - Scroll-linked translation
//! - [`typewriter`] - Phrase typing loop
//! - [`anchor_nav`] - Delayed smooth scrolling for in-page links
//! - [`carousel`] - Slider regions
//!
//! # Lifecycle
//!
//! `init_page` is the page-ready entry point. It mounts every component,
//! logging and skipping any instance whose elements are missing, and returns
//! a `PageHandle` owning every subscription. `PageHandle::teardown` detaches
//! them all and stops the typewriter; dropping the handle leaves the page
//! wired.
//!
//! # Example
//!
//! ```ignore
//! use pagefx::{init_page, PageConfig};
//!
//! let page = init_page(&PageConfig::default());
//! pagefx::state::timers::advance(Duration::from_millis(16));
//! page.teardown();
//! ```

pub mod anchor_nav;
pub mod carousel;
pub mod parallax;
pub mod reveal;
pub mod typewriter;

use crate::config::{CarouselConfig, PageConfig};
use crate::dom;
use crate::error::PageError;
use crate::state::scroll;

use anchor_nav::AnchorNavigator;
use carousel::{ActiveRegion, Carousel};
use parallax::Parallax;
use reveal::Reveal;
use typewriter::Typewriter;

// =============================================================================
// PAGE HANDLE
// =============================================================================

/// Every component mounted by `init_page`.
pub struct PageHandle {
    reveal: Option<Reveal>,
    parallax: Parallax,
    typewriter: Option<Typewriter>,
    anchors: AnchorNavigator,
    carousels: Vec<Carousel>,
    active_region: ActiveRegion,
}

impl PageHandle {
    pub fn carousels(&self) -> &[Carousel] {
        &self.carousels
    }

    pub fn typewriter(&self) -> Option<&Typewriter> {
        self.typewriter.as_ref()
    }

    pub fn anchors(&self) -> &AnchorNavigator {
        &self.anchors
    }

    pub fn reveal(&self) -> Option<&Reveal> {
        self.reveal.as_ref()
    }

    /// Region that receives arrow keys under the focused keyboard scope.
    pub fn active_region(&self) -> Option<usize> {
        self.active_region.get()
    }

    /// Stop the typewriter and detach every listener.
    pub fn teardown(self) {
        if let Some(typewriter) = &self.typewriter {
            typewriter.stop();
        }
        if let Some(reveal) = self.reveal {
            reveal.detach();
        }
        self.parallax.detach();
        self.anchors.detach();
        for carousel in self.carousels {
            carousel.detach();
        }
        tracing::info!("page torn down");
    }
}

// =============================================================================
// INIT
// =============================================================================

/// Mount every component onto the current document.
///
/// Never fails: a component or region that cannot be mounted is logged and
/// skipped, the rest carry on.
pub fn init_page(config: &PageConfig) -> PageHandle {
    scroll::set_smooth_timing(config.scroll.smooth_duration_ms, config.scroll.frame_ms);

    let reveal = Reveal::mount(&config.visibility)
        .inspect_err(|err| tracing::warn!(error = %err, "visibility triggers skipped"))
        .ok();

    let parallax = Parallax::mount(&config.parallax);

    let typewriter = match Typewriter::mount(&config.typewriter) {
        Ok(typewriter) => {
            typewriter.start();
            Some(typewriter)
        }
        Err(err) => {
            tracing::warn!(error = %err, "typewriter skipped");
            None
        }
    };

    let anchors = AnchorNavigator::mount(&config.anchors);

    let active_region = ActiveRegion::default();
    let carousels = init_carousels(&config.carousel, &active_region);

    tracing::info!(
        carousels = carousels.len(),
        typewriter = typewriter.is_some(),
        "page initialised"
    );

    PageHandle {
        reveal,
        parallax,
        typewriter,
        anchors,
        carousels,
        active_region,
    }
}

fn init_carousels(config: &CarouselConfig, active: &ActiveRegion) -> Vec<Carousel> {
    let wrappers = match dom::query_selector_all(dom::body(), &config.wrapper_selector) {
        Ok(wrappers) => wrappers,
        Err(err) => {
            tracing::warn!(error = %err, "carousels skipped");
            return Vec::new();
        }
    };

    if wrappers.is_empty() {
        tracing::warn!("{}", PageError::NoSliderRegions);
        return Vec::new();
    }

    wrappers
        .into_iter()
        .enumerate()
        .filter_map(|(region, wrapper)| {
            Carousel::mount(wrapper, region, config, active.clone())
                .inspect_err(|err| tracing::warn!(region, error = %err, "slider region skipped"))
                .ok()
        })
        .collect()
}

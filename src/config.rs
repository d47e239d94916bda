//! Page configuration.
//!
//! Every selector, phrase, delay and threshold the effects use. Defaults match
//! the portfolio page the effects were written for, so `PageConfig::default()`
//! needs no file at all. A TOML file may override any subset of sections.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PageError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub typewriter: TypewriterConfig,
    #[serde(default)]
    pub anchors: AnchorConfig,
    #[serde(default)]
    pub visibility: VisibilityConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
    #[serde(default)]
    pub scroll: ScrollConfig,
}

impl PageConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: PageConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        let typewriter = &self.typewriter;
        if typewriter.phrases.is_empty() {
            return Err(PageError::Config("typewriter.phrases must not be empty".into()));
        }
        if let Some(pos) = typewriter.phrases.iter().position(|p| p.is_empty()) {
            return Err(PageError::Config(format!(
                "typewriter.phrases[{pos}] must not be empty"
            )));
        }

        for (name, value) in [
            ("visibility.skill_threshold", self.visibility.skill_threshold),
            ("visibility.reveal_threshold", self.visibility.reveal_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PageError::Config(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }

        if !(self.carousel.swipe_threshold >= 0.0) {
            return Err(PageError::Config(
                "carousel.swipe_threshold must be non-negative".into(),
            ));
        }
        if self.scroll.frame_ms == 0 {
            return Err(PageError::Config("scroll.frame_ms must be at least 1".into()));
        }
        Ok(())
    }
}

// =============================================================================
// Carousel
// =============================================================================

/// Which carousel instances react to arrow keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyboardScope {
    /// Every carousel on the page moves on every arrow key.
    #[default]
    All,
    /// Only the carousel last clicked or touched moves.
    Focused,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarouselConfig {
    #[serde(default = "default_wrapper_selector")]
    pub wrapper_selector: String,
    /// Minimum horizontal travel, in pixels, for a touch to count as a swipe.
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold: f32,
    #[serde(default)]
    pub keyboard_scope: KeyboardScope,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            wrapper_selector: default_wrapper_selector(),
            swipe_threshold: default_swipe_threshold(),
            keyboard_scope: KeyboardScope::default(),
        }
    }
}

// =============================================================================
// Typewriter
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypewriterConfig {
    #[serde(default = "default_typewriter_selector")]
    pub selector: String,
    #[serde(default = "default_phrases")]
    pub phrases: Vec<String>,
    #[serde(default = "default_type_ms")]
    pub type_ms: u64,
    #[serde(default = "default_delete_ms")]
    pub delete_ms: u64,
    /// Pause once a phrase is fully typed.
    #[serde(default = "default_hold_full_ms")]
    pub hold_full_ms: u64,
    /// Pause once a phrase is fully deleted.
    #[serde(default = "default_hold_empty_ms")]
    pub hold_empty_ms: u64,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            selector: default_typewriter_selector(),
            phrases: default_phrases(),
            type_ms: default_type_ms(),
            delete_ms: default_delete_ms(),
            hold_full_ms: default_hold_full_ms(),
            hold_empty_ms: default_hold_empty_ms(),
        }
    }
}

impl TypewriterConfig {
    pub fn type_delay(&self) -> Duration {
        Duration::from_millis(self.type_ms)
    }

    pub fn delete_delay(&self) -> Duration {
        Duration::from_millis(self.delete_ms)
    }

    pub fn hold_full(&self) -> Duration {
        Duration::from_millis(self.hold_full_ms)
    }

    pub fn hold_empty(&self) -> Duration {
        Duration::from_millis(self.hold_empty_ms)
    }
}

// =============================================================================
// Anchors
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Element ids whose `#id` links scroll smoothly.
    #[serde(default = "default_anchor_targets")]
    pub targets: Vec<String>,
    #[serde(default = "default_anchor_delay_ms")]
    pub delay_ms: u64,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            targets: default_anchor_targets(),
            delay_ms: default_anchor_delay_ms(),
        }
    }
}

// =============================================================================
// Visibility
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    #[serde(default = "default_skill_selector")]
    pub skill_selector: String,
    #[serde(default = "default_skill_threshold")]
    pub skill_threshold: f32,
    #[serde(default = "default_reveal_selector")]
    pub reveal_selector: String,
    #[serde(default = "default_reveal_threshold")]
    pub reveal_threshold: f32,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            skill_selector: default_skill_selector(),
            skill_threshold: default_skill_threshold(),
            reveal_selector: default_reveal_selector(),
            reveal_threshold: default_reveal_threshold(),
        }
    }
}

// =============================================================================
// Parallax
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Attribute carrying the per-element speed factor.
    #[serde(default = "default_parallax_attribute")]
    pub attribute: String,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            attribute: default_parallax_attribute(),
        }
    }
}

// =============================================================================
// Scroll
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_smooth_duration_ms")]
    pub smooth_duration_ms: u64,
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_duration_ms: default_smooth_duration_ms(),
            frame_ms: default_frame_ms(),
        }
    }
}

// Default value functions
fn default_wrapper_selector() -> String {
    ".slider-wrapper".to_string()
}

fn default_swipe_threshold() -> f32 {
    50.0
}

fn default_typewriter_selector() -> String {
    ".webdev".to_string()
}

fn default_phrases() -> Vec<String> {
    ["Web Developer", "Frontend Developer", "Backend Developer", "QA Tester"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_type_ms() -> u64 {
    100
}

fn default_delete_ms() -> u64 {
    50
}

fn default_hold_full_ms() -> u64 {
    1500
}

fn default_hold_empty_ms() -> u64 {
    500
}

fn default_anchor_targets() -> Vec<String> {
    ["about", "services", "contact", "project"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_anchor_delay_ms() -> u64 {
    300
}

fn default_skill_selector() -> String {
    ".skill-progress".to_string()
}

fn default_skill_threshold() -> f32 {
    0.5
}

fn default_reveal_selector() -> String {
    ".scale-on-scroll".to_string()
}

fn default_reveal_threshold() -> f32 {
    0.3
}

fn default_parallax_attribute() -> String {
    "data-parallax".to_string()
}

fn default_smooth_duration_ms() -> u64 {
    400
}

fn default_frame_ms() -> u64 {
    16
}

//! Typewriter - Cycles phrases by typing and deleting one character at a time
//!
//! A single cooperative timer loop: every firing performs one step, renders
//! the visible prefix followed by a cursor marker, and schedules the next
//! step. With the default timing:
//!
//! - typing: one character every 100ms, then hold 1500ms on the full phrase
//! - deleting: one character every 50ms, then hold 500ms on the empty text
//!   and move on to the next phrase (wrapping after the last)
//!
//! The loop is owned by a `Typewriter` controller: `start()` runs the first
//! step immediately, `stop()` cancels the pending step, and a later
//! `start()` resumes where it left off.
//!
//! # Example
//!
//! ```ignore
//! use pagefx::effects::typewriter::Typewriter;
//!
//! let typewriter = Typewriter::mount(&config.typewriter)?;
//! typewriter.start();
//! timers::advance(Duration::from_millis(300));
//! println!("{}", typewriter.text()); // "Web "
//! typewriter.stop();
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::config::TypewriterConfig;
use crate::dom;
use crate::error::{PageError, Result};
use crate::state::timers::{self, TimerId};

// =============================================================================
// STATE MACHINE
// =============================================================================

/// Position in the phrase cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypewriterState {
    pub role_index: usize,
    /// Visible characters of the current phrase
    pub char_index: usize,
    pub is_typing: bool,
}

impl Default for TypewriterState {
    fn default() -> Self {
        Self {
            role_index: 0,
            char_index: 0,
            is_typing: true,
        }
    }
}

impl TypewriterState {
    /// Advance one step. Returns the visible text and the delay before the
    /// next step.
    ///
    /// `config.phrases` must be non-empty with no empty phrase.
    pub fn step(&mut self, config: &TypewriterConfig) -> (String, Duration) {
        let phrase = &config.phrases[self.role_index % config.phrases.len()];
        let length = phrase.chars().count();

        if self.is_typing {
            self.char_index = (self.char_index + 1).min(length);
            let text = prefix(phrase, self.char_index);
            if self.char_index == length {
                self.is_typing = false;
                (text, config.hold_full())
            } else {
                (text, config.type_delay())
            }
        } else {
            self.char_index = self.char_index.saturating_sub(1);
            let text = prefix(phrase, self.char_index);
            if self.char_index == 0 {
                self.is_typing = true;
                self.role_index = (self.role_index + 1) % config.phrases.len();
                (text, config.hold_empty())
            } else {
                (text, config.delete_delay())
            }
        }
    }
}

fn prefix(phrase: &str, chars: usize) -> String {
    phrase.chars().take(chars).collect()
}

// =============================================================================
// RENDERING
// =============================================================================

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Markup for the visible text plus the cursor marker.
pub fn render_markup(text: &str) -> String {
    format!("<span>{}<span class=\"cursor\">|</span></span>", escape_html(text))
}

// =============================================================================
// CONTROLLER
// =============================================================================

struct Loop {
    target: usize,
    config: TypewriterConfig,
    state: Cell<TypewriterState>,
    text: RefCell<String>,
    timer: Cell<Option<TimerId>>,
}

fn tick(lp: &Rc<Loop>) {
    let mut state = lp.state.get();
    let (text, delay) = state.step(&lp.config);
    lp.state.set(state);

    dom::set_markup(lp.target, &render_markup(&text));
    tracing::trace!(role = state.role_index, chars = state.char_index, "typewriter step");
    *lp.text.borrow_mut() = text;

    let next = lp.clone();
    let id = timers::set_timeout(delay, move || {
        next.timer.set(None);
        tick(&next);
    });
    lp.timer.set(Some(id));
}

/// Owns the typing loop for one target element.
pub struct Typewriter {
    inner: Rc<Loop>,
}

impl Typewriter {
    /// Find the target by `config.selector` and build a stopped controller.
    pub fn mount(config: &TypewriterConfig) -> Result<Self> {
        let target = dom::query_selector(dom::body(), &config.selector)?
            .ok_or_else(|| PageError::MissingTypewriterTarget(config.selector.clone()))?;
        Self::new(target, config.clone())
    }

    /// Build a stopped controller writing into `target`.
    pub fn new(target: usize, config: TypewriterConfig) -> Result<Self> {
        if config.phrases.is_empty() {
            return Err(PageError::Config("typewriter needs at least one phrase".into()));
        }
        if config.phrases.iter().any(String::is_empty) {
            return Err(PageError::Config("typewriter phrases must not be empty".into()));
        }
        Ok(Self {
            inner: Rc::new(Loop {
                target,
                config,
                state: Cell::new(TypewriterState::default()),
                text: RefCell::new(String::new()),
                timer: Cell::new(None),
            }),
        })
    }

    /// Run the first step now and keep going on the timer queue.
    /// Returns false if already running.
    pub fn start(&self) -> bool {
        if self.is_running() {
            return false;
        }
        tracing::debug!(target_element = self.inner.target, "typewriter started");
        tick(&self.inner);
        true
    }

    /// Cancel the pending step. Returns false if it was not running.
    pub fn stop(&self) -> bool {
        match self.inner.timer.take() {
            Some(id) => {
                timers::clear_timeout(id);
                tracing::debug!(target_element = self.inner.target, "typewriter stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.inner.timer.get().is_some()
    }

    pub fn state(&self) -> TypewriterState {
        self.inner.state.get()
    }

    /// Currently visible text, without the cursor marker.
    pub fn text(&self) -> String {
        self.inner.text.borrow().clone()
    }

    pub fn target(&self) -> usize {
        self.inner.target
    }
}

// =============================================================================
// TESTS
// =============================================================================

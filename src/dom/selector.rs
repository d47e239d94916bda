//! Selector Module - Structural queries over the element tree.
//!
//! Supports the subset of CSS selectors the effects need:
//!
//! - type: `a`, `span`, `*`
//! - class: `.slider-btn.prev`
//! - id: `#about`
//! - attribute presence / equality: `[data-parallax]`, `a[href="#about"]`
//! - descendant combinator: `.slider-wrapper .dot`
//!
//! # Example
//!
//! ```ignore
//! use pagefx::dom::{query_selector, query_selector_all};
//!
//! let wrappers = query_selector_all(body(), ".slider-wrapper")?;
//! let prev = query_selector(wrappers[0], ".slider-btn.prev")?;
//! ```

use std::fmt;
use std::str::FromStr;

use super::arrays;
use super::registry;
use crate::error::{PageError, Result};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, index: usize) -> bool {
        if let Some(tag) = &self.tag {
            if arrays::tag(index) != *tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if arrays::element_id(index).as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|cls| arrays::has_class(index, cls)) {
            return false;
        }
        self.attrs.iter().all(|attr| match &attr.value {
            None => arrays::has_attribute(index, &attr.name),
            Some(value) => arrays::attribute(index, &attr.name).as_deref() == Some(value.as_str()),
        })
    }
}

/// A parsed selector: compounds joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self> {
        source.parse()
    }

    /// Check whether the element at `index` matches.
    pub fn matches(&self, index: usize) -> bool {
        let Some((last, ancestors)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(index) {
            return false;
        }

        // Remaining compounds must match ancestors, innermost first
        let mut current = arrays::parent_of(index);
        for compound in ancestors.iter().rev() {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = arrays::parent_of(candidate);
                if compound.matches(candidate) {
                    break;
                }
            }
        }
        true
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

// =============================================================================
// PARSER
// =============================================================================

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn ident(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.bump();
        }
        &self.src[start..self.pos]
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn invalid(source: &str, reason: impl Into<String>) -> PageError {
    PageError::InvalidSelector {
        selector: source.to_string(),
        reason: reason.into(),
    }
}

fn parse_attr(cursor: &mut Cursor<'_>, source: &str) -> Result<AttrMatch> {
    cursor.skip_whitespace();
    let name = cursor.ident();
    if name.is_empty() {
        return Err(invalid(source, "expected attribute name"));
    }
    cursor.skip_whitespace();

    let value = match cursor.bump() {
        Some(']') => return Ok(AttrMatch { name: name.to_string(), value: None }),
        Some('=') => {
            cursor.skip_whitespace();
            match cursor.peek() {
                Some(quote @ ('"' | '\'')) => {
                    cursor.bump();
                    let start = cursor.pos;
                    loop {
                        match cursor.bump() {
                            Some(c) if c == quote => break,
                            Some(_) => {}
                            None => return Err(invalid(source, "unterminated string")),
                        }
                    }
                    cursor.src[start..cursor.pos - quote.len_utf8()].to_string()
                }
                _ => {
                    let value = cursor.ident();
                    if value.is_empty() {
                        return Err(invalid(source, "expected attribute value"));
                    }
                    value.to_string()
                }
            }
        }
        _ => return Err(invalid(source, "expected `]` or `=`")),
    };

    cursor.skip_whitespace();
    if cursor.bump() != Some(']') {
        return Err(invalid(source, "expected `]`"));
    }
    Ok(AttrMatch { name: name.to_string(), value: Some(value) })
}

fn parse_compound(cursor: &mut Cursor<'_>, source: &str) -> Result<Compound> {
    let mut compound = Compound::default();

    if cursor.peek() == Some('*') {
        cursor.bump();
    } else {
        let tag = cursor.ident();
        if !tag.is_empty() {
            compound.tag = Some(tag.to_ascii_lowercase());
        }
    }

    while let Some(c) = cursor.peek() {
        match c {
            '.' => {
                cursor.bump();
                let name = cursor.ident();
                if name.is_empty() {
                    return Err(invalid(source, "expected class name after `.`"));
                }
                compound.classes.push(name.to_string());
            }
            '#' => {
                cursor.bump();
                let name = cursor.ident();
                if name.is_empty() {
                    return Err(invalid(source, "expected id after `#`"));
                }
                compound.id = Some(name.to_string());
            }
            '[' => {
                cursor.bump();
                compound.attrs.push(parse_attr(cursor, source)?);
            }
            c if c.is_whitespace() => break,
            c => return Err(invalid(source, format!("unexpected character {c:?}"))),
        }
    }
    Ok(compound)
}

impl FromStr for Selector {
    type Err = PageError;

    fn from_str(source: &str) -> Result<Self> {
        let mut cursor = Cursor { src: source, pos: 0 };
        let mut compounds = Vec::new();

        loop {
            cursor.skip_whitespace();
            if cursor.peek().is_none() {
                break;
            }
            let start = cursor.pos;
            let compound = parse_compound(&mut cursor, source)?;
            if cursor.pos == start {
                return Err(invalid(source, "empty compound"));
            }
            compounds.push(compound);
        }

        if compounds.is_empty() {
            return Err(invalid(source, "empty selector"));
        }
        Ok(Self { source: source.trim().to_string(), compounds })
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// All descendants of `scope` matching `selector`, in document order.
pub fn query_selector_all(scope: usize, selector: &str) -> Result<Vec<usize>> {
    let selector = Selector::parse(selector)?;
    Ok(select_all(scope, &selector))
}

/// First descendant of `scope` matching `selector`.
pub fn query_selector(scope: usize, selector: &str) -> Result<Option<usize>> {
    let selector = Selector::parse(selector)?;
    Ok(registry::descendants(scope)
        .into_iter()
        .find(|&index| selector.matches(index)))
}

pub fn select_all(scope: usize, selector: &Selector) -> Vec<usize> {
    registry::descendants(scope)
        .into_iter()
        .filter(|&index| selector.matches(index))
        .collect()
}

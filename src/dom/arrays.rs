//! Element columns - Parallel arrays holding all element data.
//!
//! Each array index corresponds to one element. The registry allocates and
//! releases indices; everything else reads and writes through the accessors
//! below.
//!
//! # Columns
//!
//! - **tag / id**: element name and optional id
//! - **classes**: presentation-state markers, insertion ordered
//! - **attributes**: declared markup attributes (`data-*`, `href`, ...)
//! - **styles**: inline style properties (`transform`, `--target-width`, ...)
//! - **markup**: replaced inner markup (typewriter output)
//! - **state**: `ElementState` flags
//! - **height**: declared block size for layout
//! - **parent / children**: tree structure

use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::types::{Dimension, ElementState};

#[derive(Default)]
struct Columns {
    tag: Vec<String>,
    id: Vec<Option<String>>,
    classes: Vec<Vec<String>>,
    attributes: Vec<BTreeMap<String, String>>,
    styles: Vec<BTreeMap<String, String>>,
    markup: Vec<String>,
    state: Vec<ElementState>,
    height: Vec<Dimension>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
}

thread_local! {
    static COLUMNS: RefCell<Columns> = RefCell::new(Columns::default());
}

// =============================================================================
// Capacity
// =============================================================================

/// Ensure all columns have a slot for `index`.
pub(crate) fn ensure_capacity(index: usize) {
    COLUMNS.with(|c| {
        let mut c = c.borrow_mut();
        let len = index + 1;
        if c.tag.len() < len {
            c.tag.resize(len, String::new());
            c.id.resize(len, None);
            c.classes.resize(len, Vec::new());
            c.attributes.resize(len, BTreeMap::new());
            c.styles.resize(len, BTreeMap::new());
            c.markup.resize(len, String::new());
            c.state.resize(len, ElementState::NONE);
            c.height.resize(len, Dimension::Auto);
            c.parent.resize(len, None);
            c.children.resize(len, Vec::new());
        }
    });
}

/// Clear every column at `index`.
pub(crate) fn clear_at_index(index: usize) {
    COLUMNS.with(|c| {
        let mut c = c.borrow_mut();
        if index >= c.tag.len() {
            return;
        }
        c.tag[index].clear();
        c.id[index] = None;
        c.classes[index].clear();
        c.attributes[index].clear();
        c.styles[index].clear();
        c.markup[index].clear();
        c.state[index] = ElementState::NONE;
        c.height[index] = Dimension::Auto;
        c.parent[index] = None;
        c.children[index].clear();
    });
}

pub(crate) fn reset() {
    COLUMNS.with(|c| *c.borrow_mut() = Columns::default());
}

// =============================================================================
// Tag / Id
// =============================================================================

pub fn tag(index: usize) -> String {
    COLUMNS.with(|c| c.borrow().tag.get(index).cloned().unwrap_or_default())
}

pub(crate) fn set_tag(index: usize, tag: &str) {
    COLUMNS.with(|c| {
        if let Some(slot) = c.borrow_mut().tag.get_mut(index) {
            *slot = tag.to_ascii_lowercase();
        }
    });
}

pub fn element_id(index: usize) -> Option<String> {
    COLUMNS.with(|c| c.borrow().id.get(index).cloned().flatten())
}

pub(crate) fn store_element_id(index: usize, id: Option<String>) {
    COLUMNS.with(|c| {
        if let Some(slot) = c.borrow_mut().id.get_mut(index) {
            *slot = id;
        }
    });
}

// =============================================================================
// Classes
// =============================================================================

pub fn has_class(index: usize, name: &str) -> bool {
    COLUMNS.with(|c| {
        c.borrow()
            .classes
            .get(index)
            .is_some_and(|classes| classes.iter().any(|cls| cls == name))
    })
}

pub fn classes(index: usize) -> Vec<String> {
    COLUMNS.with(|c| c.borrow().classes.get(index).cloned().unwrap_or_default())
}

/// Add a class. Returns false if it was already present.
pub fn add_class(index: usize, name: &str) -> bool {
    COLUMNS.with(|c| {
        let mut c = c.borrow_mut();
        let Some(classes) = c.classes.get_mut(index) else {
            return false;
        };
        if classes.iter().any(|cls| cls == name) {
            return false;
        }
        classes.push(name.to_string());
        true
    })
}

/// Remove a class. Returns false if it was not present.
pub fn remove_class(index: usize, name: &str) -> bool {
    COLUMNS.with(|c| {
        let mut c = c.borrow_mut();
        let Some(classes) = c.classes.get_mut(index) else {
            return false;
        };
        let before = classes.len();
        classes.retain(|cls| cls != name);
        classes.len() != before
    })
}

/// Force a class on or off.
pub fn toggle_class(index: usize, name: &str, on: bool) {
    if on {
        add_class(index, name);
    } else {
        remove_class(index, name);
    }
}

// =============================================================================
// Attributes
// =============================================================================

pub fn attribute(index: usize, name: &str) -> Option<String> {
    COLUMNS.with(|c| {
        c.borrow()
            .attributes
            .get(index)
            .and_then(|attrs| attrs.get(name).cloned())
    })
}

pub fn has_attribute(index: usize, name: &str) -> bool {
    COLUMNS.with(|c| {
        c.borrow()
            .attributes
            .get(index)
            .is_some_and(|attrs| attrs.contains_key(name))
    })
}

pub fn set_attribute(index: usize, name: &str, value: &str) {
    COLUMNS.with(|c| {
        if let Some(attrs) = c.borrow_mut().attributes.get_mut(index) {
            attrs.insert(name.to_string(), value.to_string());
        }
    });
}

// =============================================================================
// Inline Styles
// =============================================================================

pub fn style(index: usize, property: &str) -> Option<String> {
    COLUMNS.with(|c| {
        c.borrow()
            .styles
            .get(index)
            .and_then(|styles| styles.get(property).cloned())
    })
}

pub fn set_style(index: usize, property: &str, value: &str) {
    COLUMNS.with(|c| {
        if let Some(styles) = c.borrow_mut().styles.get_mut(index) {
            styles.insert(property.to_string(), value.to_string());
        }
    });
}

// =============================================================================
// Markup
// =============================================================================

pub fn markup(index: usize) -> String {
    COLUMNS.with(|c| c.borrow().markup.get(index).cloned().unwrap_or_default())
}

pub fn set_markup(index: usize, markup: &str) {
    COLUMNS.with(|c| {
        if let Some(slot) = c.borrow_mut().markup.get_mut(index) {
            markup.clone_into(slot);
        }
    });
}

// =============================================================================
// State Flags
// =============================================================================

pub fn state(index: usize) -> ElementState {
    COLUMNS.with(|c| c.borrow().state.get(index).copied().unwrap_or_default())
}

pub fn set_state_flag(index: usize, flag: ElementState, on: bool) {
    COLUMNS.with(|c| {
        if let Some(state) = c.borrow_mut().state.get_mut(index) {
            state.set(flag, on);
        }
    });
}

pub fn is_disabled(index: usize) -> bool {
    state(index).contains(ElementState::DISABLED)
}

pub fn set_disabled(index: usize, disabled: bool) {
    set_state_flag(index, ElementState::DISABLED, disabled);
}

// =============================================================================
// Geometry
// =============================================================================

pub fn height(index: usize) -> Dimension {
    COLUMNS.with(|c| c.borrow().height.get(index).copied().unwrap_or_default())
}

pub fn set_height(index: usize, height: Dimension) {
    COLUMNS.with(|c| {
        if let Some(slot) = c.borrow_mut().height.get_mut(index) {
            *slot = height;
        }
    });
}

// =============================================================================
// Tree
// =============================================================================

pub fn parent_of(index: usize) -> Option<usize> {
    COLUMNS.with(|c| c.borrow().parent.get(index).copied().flatten())
}

pub fn children_of(index: usize) -> Vec<usize> {
    COLUMNS.with(|c| c.borrow().children.get(index).cloned().unwrap_or_default())
}

/// Append `child` as the last child of `parent`, detaching it first.
pub(crate) fn link_child(parent: usize, child: usize) {
    unlink_child(child);
    COLUMNS.with(|c| {
        let mut c = c.borrow_mut();
        if parent >= c.children.len() || child >= c.parent.len() {
            return;
        }
        c.children[parent].push(child);
        c.parent[child] = Some(parent);
    });
}

/// Detach `child` from its parent, if any.
pub(crate) fn unlink_child(child: usize) {
    COLUMNS.with(|c| {
        let mut c = c.borrow_mut();
        let Some(parent) = c.parent.get(child).copied().flatten() else {
            return;
        };
        c.children[parent].retain(|&i| i != child);
        c.parent[child] = None;
    });
}

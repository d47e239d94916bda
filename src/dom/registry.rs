//! Element Registry - Index allocation for the element columns.
//!
//! Manages the lifecycle of element indices:
//! - Free index pool for O(1) reuse
//! - Id → index lookup (`get_element_by_id`)
//! - The document body, which is always index 0 after a reset
//! - Recursive release of subtrees

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};

use super::arrays;

// =============================================================================
// Registry State
// =============================================================================

#[derive(Default)]
struct Registry {
    /// Element id to array index.
    id_to_index: HashMap<String, usize>,
    /// Currently allocated indices.
    allocated: BTreeSet<usize>,
    /// Pool of freed indices for reuse.
    free: Vec<usize>,
    /// Next index to allocate if the pool is empty.
    next: usize,
    /// The body element, once created.
    body: Option<usize>,
    /// Bumped every time an index is released.
    generations: HashMap<usize, u64>,
}

thread_local! {
    static REGISTRY: RefCell<Registry> = RefCell::new(Registry::default());
}

// =============================================================================
// Document
// =============================================================================

/// Get the document body, creating it on first use.
pub fn body() -> usize {
    if let Some(body) = REGISTRY.with(|r| r.borrow().body) {
        return body;
    }
    let body = allocate_index("body");
    REGISTRY.with(|r| r.borrow_mut().body = Some(body));
    body
}

/// Drop every element and start with an empty body.
pub fn reset_document() {
    REGISTRY.with(|r| *r.borrow_mut() = Registry::default());
    arrays::reset();
    body();
}

// =============================================================================
// Index Allocation
// =============================================================================

/// Allocate an index for a new, detached element.
pub fn allocate_index(tag: &str) -> usize {
    let index = REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        let index = match r.free.pop() {
            Some(index) => index,
            None => {
                let index = r.next;
                r.next += 1;
                index
            }
        };
        r.allocated.insert(index);
        index
    });

    arrays::ensure_capacity(index);
    arrays::set_tag(index, tag);
    index
}

/// Release an element and its whole subtree back to the pool.
///
/// Event handlers attached to released elements are dropped too.
pub fn release_index(index: usize) {
    if !is_allocated(index) {
        return;
    }

    // Children first; collect before mutating
    for child in arrays::children_of(index) {
        release_index(child);
    }

    arrays::unlink_child(index);
    if let Some(id) = arrays::element_id(index) {
        REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            if r.id_to_index.get(&id) == Some(&index) {
                r.id_to_index.remove(&id);
            }
        });
    }
    crate::state::pointer::cleanup_index(index);
    arrays::clear_at_index(index);

    REGISTRY.with(|r| {
        let mut r = r.borrow_mut();
        r.allocated.remove(&index);
        r.free.push(index);
        *r.generations.entry(index).or_default() += 1;
        if r.body == Some(index) {
            r.body = None;
        }
    });
}

pub fn is_allocated(index: usize) -> bool {
    REGISTRY.with(|r| r.borrow().allocated.contains(&index))
}

pub fn element_count() -> usize {
    REGISTRY.with(|r| r.borrow().allocated.len())
}

fn generation(index: usize) -> u64 {
    REGISTRY.with(|r| r.borrow().generations.get(&index).copied().unwrap_or(0))
}

/// An element index pinned to the allocation it was taken from.
///
/// Indices are recycled, so a plain `usize` kept past a release can end up
/// naming someone else's element. An `ElementRef` goes stale instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    index: usize,
    generation: u64,
}

impl ElementRef {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            generation: generation(index),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Still the same element it was created for.
    pub fn is_live(&self) -> bool {
        is_allocated(self.index) && generation(self.index) == self.generation
    }
}

// =============================================================================
// Ids
// =============================================================================

/// Assign (or clear) an element's id, keeping the lookup table in sync.
pub fn set_element_id(index: usize, id: Option<&str>) {
    if let Some(old) = arrays::element_id(index) {
        REGISTRY.with(|r| {
            let mut r = r.borrow_mut();
            if r.id_to_index.get(&old) == Some(&index) {
                r.id_to_index.remove(&old);
            }
        });
    }
    if let Some(id) = id {
        REGISTRY.with(|r| {
            r.borrow_mut().id_to_index.insert(id.to_string(), index);
        });
    }
    arrays::store_element_id(index, id.map(str::to_string));
}

pub fn get_element_by_id(id: &str) -> Option<usize> {
    REGISTRY.with(|r| r.borrow().id_to_index.get(id).copied())
}

// =============================================================================
// Tree Mutation
// =============================================================================

/// Create a detached element.
pub fn create_element(tag: &str) -> usize {
    allocate_index(tag)
}

/// Append `child` to `parent`, moving it if it already has a parent.
pub fn append_child(parent: usize, child: usize) {
    if parent == child || !is_allocated(parent) || !is_allocated(child) {
        return;
    }
    // Refuse to create a cycle
    let mut ancestor = Some(parent);
    while let Some(a) = ancestor {
        if a == child {
            return;
        }
        ancestor = arrays::parent_of(a);
    }
    arrays::link_child(parent, child);
}

/// Release every child of `parent`.
pub fn clear_children(parent: usize) {
    for child in arrays::children_of(parent) {
        release_index(child);
    }
}

/// All descendants of `root` in document (pre-order) order, excluding `root`.
pub fn descendants(root: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack: Vec<usize> = arrays::children_of(root).into_iter().rev().collect();
    while let Some(index) = stack.pop() {
        out.push(index);
        stack.extend(arrays::children_of(index).into_iter().rev());
    }
    out
}

//! Document Module - Headless page surface
//!
//! The element tree the effects query and mutate. Elements are indices into
//! parallel columns (see [`arrays`]); the registry hands indices out and takes
//! them back.
//!
//! - **registry** - index allocation, body, ids, tree mutation
//! - **arrays** - per-element columns (classes, attributes, styles, ...)
//! - **selector** - structural queries
//! - **builder** - declarative page construction

pub mod arrays;
mod builder;
mod registry;
mod selector;

pub use arrays::{
    add_class, attribute, children_of, classes, element_id, has_attribute, has_class, height,
    is_disabled, markup, parent_of, remove_class, set_attribute, set_disabled,
    set_height, set_markup, set_state_flag, set_style, state, style, tag, toggle_class,
};
pub use builder::ElementBuilder;
pub use registry::{
    ElementRef, allocate_index, append_child, body, clear_children, create_element, descendants,
    element_count, get_element_by_id, is_allocated, release_index, reset_document,
    set_element_id,
};
pub use selector::{Selector, query_selector, query_selector_all, select_all};

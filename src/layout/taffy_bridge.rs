//! Taffy Bridge - Integration with Taffy layout engine
//!
//! Converts element columns to Taffy styles, runs layout computation,
//! and extracts absolute block positions back into a `ComputedLayout`.
//!
//! Every element is a flex column: children stack vertically in document
//! order, elements with a declared height keep it, the rest size to their
//! children. Elements styled `display: none` and their subtrees take no space.

use std::collections::HashMap;

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, Display, FlexDirection, NodeId, Size, Style,
    TaffyTree,
};

use crate::dom;
use crate::error::Result;
use crate::types::Dimension;

use super::ComputedLayout;

// =============================================================================
// STYLE BUILDING
// =============================================================================

fn to_taffy_dimension(dim: Dimension) -> TaffyDimension {
    match dim {
        Dimension::Auto => TaffyDimension::Auto,
        Dimension::Px(px) => TaffyDimension::Length(px),
    }
}

fn is_hidden(index: usize) -> bool {
    dom::style(index, "display").as_deref() == Some("none")
}

/// Build a Taffy Style from an element's columns.
fn build_style(index: usize) -> Style {
    Style {
        display: Display::Flex,
        flex_direction: FlexDirection::Column,
        flex_shrink: 0.0,
        size: Size {
            width: TaffyDimension::Auto,
            height: to_taffy_dimension(dom::height(index)),
        },
        ..Default::default()
    }
}

// =============================================================================
// MAIN ENTRY POINT
// =============================================================================

/// Compute block layout for the whole document.
///
/// # Arguments
///
/// * `viewport_width` - Available width in CSS pixels
pub fn compute_layout_taffy(viewport_width: f32) -> Result<ComputedLayout> {
    let root = dom::body();
    let mut order = vec![root];
    order.extend(dom::descendants(root));

    let array_size = order.iter().max().copied().unwrap_or(0) + 1;
    let mut result = ComputedLayout {
        top: vec![0.0; array_size],
        height: vec![0.0; array_size],
        laid_out: vec![false; array_size],
        document_height: 0.0,
    };

    let mut tree: TaffyTree<()> = TaffyTree::new();
    let mut index_to_node: HashMap<usize, NodeId> = HashMap::new();

    // Document order guarantees parents are visited before their children,
    // so children are appended in sibling order.
    for &index in &order {
        if is_hidden(index) {
            continue;
        }
        let parent_node = match dom::parent_of(index) {
            Some(parent) => match index_to_node.get(&parent) {
                Some(&node) => Some(node),
                // Parent hidden: subtree takes no space
                None => continue,
            },
            None if index == root => None,
            None => continue,
        };

        let node = tree.new_leaf(build_style(index))?;
        if let Some(parent_node) = parent_node {
            tree.add_child(parent_node, node)?;
        }
        index_to_node.insert(index, node);
    }

    let Some(&root_node) = index_to_node.get(&root) else {
        return Ok(result);
    };

    let available = Size {
        width: AvailableSpace::Definite(viewport_width),
        height: AvailableSpace::MaxContent,
    };
    tree.compute_layout(root_node, available)?;

    // Extract results, accumulating parent offsets into absolute tops
    for &index in &order {
        let Some(&node) = index_to_node.get(&index) else {
            continue;
        };
        let layout = tree.layout(node)?;
        let parent_top = dom::parent_of(index)
            .filter(|&parent| index != root && result.laid_out[parent])
            .map(|parent| result.top[parent])
            .unwrap_or(0.0);

        result.top[index] = parent_top + layout.location.y;
        result.height[index] = layout.size.height;
        result.laid_out[index] = true;
    }
    result.document_height = result.height[root];

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{ElementBuilder, body, reset_document};

    fn setup() {
        reset_document();
    }

    #[test]
    fn test_empty_document() {
        setup();
        let layout = compute_layout_taffy(1280.0).unwrap();
        assert_eq!(layout.document_height, 0.0);
    }

    #[test]
    fn test_sections_stack_vertically() {
        setup();
        let hero = ElementBuilder::new("section").height(600.0).mount(body());
        let about = ElementBuilder::new("section").height(400.0).mount(body());

        let layout = compute_layout_taffy(1280.0).unwrap();
        assert_eq!(layout.element_box(hero), Some((0.0, 600.0)));
        assert_eq!(layout.element_box(about), Some((600.0, 400.0)));
        assert_eq!(layout.document_height, 1000.0);
    }

    #[test]
    fn test_nested_offsets_are_absolute() {
        setup();
        ElementBuilder::new("section").height(500.0).mount(body());
        let skills = ElementBuilder::new("section")
            .child(ElementBuilder::new("div").height(100.0))
            .child(ElementBuilder::new("div").height(50.0))
            .mount(body());
        let bars = dom::children_of(skills);

        let layout = compute_layout_taffy(1280.0).unwrap();
        assert_eq!(layout.element_box(skills), Some((500.0, 150.0)));
        assert_eq!(layout.element_box(bars[1]), Some((600.0, 50.0)));
    }

    #[test]
    fn test_hidden_subtree_takes_no_space() {
        setup();
        let hidden = ElementBuilder::new("div")
            .style("display", "none")
            .height(300.0)
            .child(ElementBuilder::new("div").height(20.0))
            .mount(body());
        let after = ElementBuilder::new("div").height(10.0).mount(body());

        let layout = compute_layout_taffy(1280.0).unwrap();
        assert_eq!(layout.element_box(hidden), None);
        assert_eq!(layout.element_box(after), Some((0.0, 10.0)));
    }
}

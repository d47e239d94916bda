//! Element builder - Declarative page construction.
//!
//! Pages are assembled from nested builders and mounted under a parent:
//!
//! ```ignore
//! use pagefx::dom::{ElementBuilder, body};
//!
//! ElementBuilder::new("section")
//!     .id("project")
//!     .child(
//!         ElementBuilder::new("div")
//!             .class("slider-wrapper")
//!             .child(ElementBuilder::new("div").class("slider-container")),
//!     )
//!     .mount(body());
//! ```

use super::arrays;
use super::registry;
use crate::types::Dimension;

#[derive(Debug, Clone, Default)]
pub struct ElementBuilder {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    styles: Vec<(String, String)>,
    markup: Option<String>,
    height: Dimension,
    disabled: bool,
    children: Vec<ElementBuilder>,
}

impl ElementBuilder {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, name: impl Into<String>) -> Self {
        self.classes.push(name.into());
        self
    }

    /// Add several whitespace-separated classes, like a `class` attribute.
    pub fn classes(mut self, names: &str) -> Self {
        self.classes
            .extend(names.split_whitespace().map(String::from));
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn style(mut self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.styles.push((property.into(), value.into()));
        self
    }

    pub fn markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = Some(markup.into());
        self
    }

    /// Declared block height in pixels.
    pub fn height(mut self, px: f32) -> Self {
        self.height = Dimension::from(px);
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn child(mut self, child: ElementBuilder) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = ElementBuilder>) -> Self {
        self.children.extend(children);
        self
    }

    /// Create the element (and its subtree) as the last child of `parent`.
    pub fn mount(self, parent: usize) -> usize {
        let index = registry::create_element(&self.tag);
        if let Some(id) = self.id.as_deref() {
            registry::set_element_id(index, Some(id));
        }
        for class in &self.classes {
            arrays::add_class(index, class);
        }
        for (name, value) in &self.attributes {
            arrays::set_attribute(index, name, value);
        }
        for (property, value) in &self.styles {
            arrays::set_style(index, property, value);
        }
        if let Some(markup) = &self.markup {
            arrays::set_markup(index, markup);
        }
        arrays::set_height(index, self.height);
        arrays::set_disabled(index, self.disabled);
        registry::append_child(parent, index);

        for child in self.children {
            child.mount(index);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{body, reset_document};

    #[test]
    fn test_mount_nested() {
        reset_document();
        let section = ElementBuilder::new("SECTION")
            .id("about")
            .classes("scale-on-scroll  hero")
            .height(400.0)
            .child(ElementBuilder::new("div").attr("data-width", "85%"))
            .mount(body());

        assert_eq!(arrays::tag(section), "section");
        assert_eq!(registry::get_element_by_id("about"), Some(section));
        assert_eq!(arrays::classes(section), vec!["scale-on-scroll", "hero"]);
        assert_eq!(arrays::height(section), Dimension::Px(400.0));

        let children = arrays::children_of(section);
        assert_eq!(children.len(), 1);
        assert_eq!(arrays::attribute(children[0], "data-width").as_deref(), Some("85%"));
    }
}

//! # Choice Contexts
//!
//! A [`ChoiceContext`] records, for one resolution call, which candidate
//! type each field actually resolved to and the nested contexts of the
//! objects resolved beneath it. It mirrors the shape of the data, not the
//! shape of the schema: a collection of three line items produces three
//! keyed child contexts.
//!
//! Contexts are created fresh for every call and never shared.

use indexmap::IndexMap;
use vellum_core::{GroupSet, TypeDescriptor};

/// Per-call resolution record of one object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceContext {
    class: String,
    groups: GroupSet,
    properties: IndexMap<String, ChoiceProperty>,
}

/// Resolution record of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChoiceProperty {
    chosen: Option<TypeDescriptor>,
    children: Vec<ChoiceChild>,
}

/// Nested context, keyed by collection index for collection elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceChild {
    key: Option<String>,
    context: ChoiceContext,
}

impl ChoiceContext {
    pub fn new(class: impl Into<String>, groups: GroupSet) -> Self {
        Self {
            class: class.into(),
            groups,
            properties: IndexMap::new(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    /// Record of `field`, created on first access.
    pub fn property_mut(&mut self, field: &str) -> &mut ChoiceProperty {
        self.properties.entry(field.to_string()).or_default()
    }

    pub fn property(&self, field: &str) -> Option<&ChoiceProperty> {
        self.properties.get(field)
    }

    /// Type chosen for `field`, if the field went through a cast.
    pub fn chosen(&self, field: &str) -> Option<&TypeDescriptor> {
        self.property(field).and_then(ChoiceProperty::chosen)
    }

    /// Recorded fields in resolution order.
    pub fn properties(&self) -> impl Iterator<Item = (&str, &ChoiceProperty)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl ChoiceProperty {
    pub fn chosen(&self) -> Option<&TypeDescriptor> {
        self.chosen.as_ref()
    }

    pub fn set_chosen(&mut self, ty: TypeDescriptor) {
        self.chosen = Some(ty);
    }

    pub fn push_child(&mut self, key: Option<String>, context: ChoiceContext) {
        self.children.push(ChoiceChild { key, context });
    }

    pub fn children(&self) -> &[ChoiceChild] {
        &self.children
    }

    /// Child context recorded under collection key `key`.
    pub fn child(&self, key: &str) -> Option<&ChoiceContext> {
        self.children
            .iter()
            .find(|c| c.key.as_deref() == Some(key))
            .map(|c| &c.context)
    }

    /// The unkeyed child of a single nested object.
    pub fn single(&self) -> Option<&ChoiceContext> {
        self.children
            .iter()
            .find(|c| c.key.is_none())
            .map(|c| &c.context)
    }
}

impl ChoiceChild {
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn context(&self) -> &ChoiceContext {
        &self.context
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_created_lazily() {
        let mut ctx = ChoiceContext::new("Order", GroupSet::new());
        assert!(ctx.property("items").is_none());
        ctx.property_mut("items")
            .set_chosen(TypeDescriptor::collect_object("LineItem"));
        assert_eq!(
            ctx.chosen("items"),
            Some(&TypeDescriptor::collect_object("LineItem"))
        );
    }

    #[test]
    fn test_keyed_and_single_children() {
        let mut ctx = ChoiceContext::new("Order", GroupSet::new());
        let prop = ctx.property_mut("items");
        prop.push_child(Some("a".into()), ChoiceContext::new("LineItem", GroupSet::new()));
        prop.push_child(Some("b".into()), ChoiceContext::new("LineItem", GroupSet::new()));

        let prop = ctx.property("items").unwrap();
        assert_eq!(prop.children().len(), 2);
        assert_eq!(prop.child("b").unwrap().class(), "LineItem");
        assert!(prop.single().is_none());

        ctx.property_mut("owner")
            .push_child(None, ChoiceContext::new("User", GroupSet::new()));
        assert_eq!(ctx.property("owner").unwrap().single().unwrap().class(), "User");
        let order: Vec<&str> = ctx.properties().map(|(k, _)| k).collect();
        assert_eq!(order, vec!["items", "owner"]);
    }
}

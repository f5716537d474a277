//! # Group Resolution
//!
//! The [`GroupResolver`] decides which groups a field belongs to and which
//! groups a class uses by default. The schema builder asks it once per field
//! per build; the answer is frozen into the tree as the field's `excluded`
//! flag.

use vellum_core::{GroupSet, SchemaError, DEFAULT_GROUP};

use crate::descriptor::{ClassDescriptor, FieldDescriptor};

/// Source of group membership.
pub trait GroupResolver: Send + Sync + std::fmt::Debug {
    /// Groups used by the class when a field declares none, and when a
    /// caller requests no groups at all.
    fn default_groups_of(&self, class: &ClassDescriptor) -> GroupSet;

    /// Groups the field belongs to.
    fn groups_of(&self, field: &FieldDescriptor, class: &ClassDescriptor) -> GroupSet;

    /// Check that every requested group is declared somewhere in the class.
    fn validate(&self, class: &ClassDescriptor, requested: &GroupSet) -> Result<(), SchemaError> {
        let declared = self.declared_groups(class);
        match requested.iter().find(|g| !declared.contains(g)) {
            Some(group) => Err(SchemaError::UnknownGroup {
                class: class.name().to_string(),
                group: group.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Union of the class default groups and every field's groups.
    fn declared_groups(&self, class: &ClassDescriptor) -> GroupSet {
        class
            .fields()
            .iter()
            .fold(self.default_groups_of(class), |acc, field| {
                acc.union(&self.groups_of(field, class))
            })
    }

    /// Short tag distinguishing resolvers that shape trees differently. It
    /// becomes part of the schema cache key; empty for the stock behaviour.
    fn fingerprint(&self) -> String {
        String::new()
    }
}

/// Resolver reading the groups declared on the descriptors.
///
/// A field without groups inherits the class default groups; a class without
/// default groups falls back to the configured default group.
#[derive(Debug, Clone)]
pub struct DeclaredGroupResolver {
    default_group: String,
}

impl DeclaredGroupResolver {
    pub fn new(default_group: impl Into<String>) -> Self {
        Self {
            default_group: default_group.into(),
        }
    }

    pub fn default_group(&self) -> &str {
        &self.default_group
    }
}

impl Default for DeclaredGroupResolver {
    fn default() -> Self {
        Self::new(DEFAULT_GROUP)
    }
}

impl GroupResolver for DeclaredGroupResolver {
    fn default_groups_of(&self, class: &ClassDescriptor) -> GroupSet {
        let declared = class.declared_default_groups();
        if declared.is_empty() {
            GroupSet::single(self.default_group.clone())
        } else {
            declared.clone()
        }
    }

    fn groups_of(&self, field: &FieldDescriptor, class: &ClassDescriptor) -> GroupSet {
        let declared = field.declared_groups();
        if declared.is_empty() {
            self.default_groups_of(class)
        } else {
            declared.clone()
        }
    }

    fn fingerprint(&self) -> String {
        if self.default_group == DEFAULT_GROUP {
            String::new()
        } else {
            format!("default={}", self.default_group)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_core::TypeDescriptor;

    fn user() -> ClassDescriptor {
        ClassDescriptor::new("User")
            .default_groups(["public"])
            .field(FieldDescriptor::of("id", TypeDescriptor::int()))
            .field(FieldDescriptor::of("email", TypeDescriptor::string()).groups(["admin"]))
    }

    #[test]
    fn test_field_inherits_class_defaults() {
        let resolver = DeclaredGroupResolver::default();
        let class = user();
        assert_eq!(
            resolver.groups_of(&class.fields()[0], &class),
            GroupSet::single("public")
        );
        assert_eq!(
            resolver.groups_of(&class.fields()[1], &class),
            GroupSet::single("admin")
        );
    }

    #[test]
    fn test_class_without_defaults_uses_default_group() {
        let resolver = DeclaredGroupResolver::default();
        let class = ClassDescriptor::new("Plain");
        assert_eq!(resolver.default_groups_of(&class), GroupSet::single("default"));

        let custom = DeclaredGroupResolver::new("everyone");
        assert_eq!(custom.default_groups_of(&class), GroupSet::single("everyone"));
        assert_eq!(custom.fingerprint(), "default=everyone");
        assert_eq!(resolver.fingerprint(), "");
    }

    #[test]
    fn test_validate_accepts_declared_groups() {
        let resolver = DeclaredGroupResolver::default();
        let class = user();
        resolver.validate(&class, &GroupSet::from(["public", "admin"])).unwrap();
        resolver.validate(&class, &GroupSet::new()).unwrap();
    }

    #[test]
    fn test_validate_rejects_unknown_group() {
        let resolver = DeclaredGroupResolver::default();
        let err = resolver
            .validate(&user(), &GroupSet::from(["public", "internal"]))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownGroup {
                class: "User".into(),
                group: "internal".into()
            }
        );
    }

    #[test]
    fn test_declared_groups_union() {
        let resolver = DeclaredGroupResolver::default();
        assert_eq!(resolver.declared_groups(&user()).signature(), "admin|public");
    }
}

//! # Group Sets
//!
//! A group is a named visibility profile (`"public"`, `"admin"`, ...). Each
//! field belongs to a set of groups; a resolution pass requests a set of
//! groups and only fields whose set intersects it participate.
//!
//! `GroupSet` is always kept sorted and de-duplicated, so its
//! [`signature`](GroupSet::signature) is canonical and can be used directly
//! in cache keys.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Group every field belongs to when neither the field nor its class
/// declares any.
pub const DEFAULT_GROUP: &str = "default";

/// Canonical, ordered set of group names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupSet(BTreeSet<String>);

impl GroupSet {
    /// The empty set.
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// A set holding exactly one group.
    pub fn single(group: impl Into<String>) -> Self {
        let mut set = BTreeSet::new();
        set.insert(group.into());
        Self(set)
    }

    /// Add a group. Returns false if it was already present.
    pub fn insert(&mut self, group: impl Into<String>) -> bool {
        self.0.insert(group.into())
    }

    /// Returns true if the set holds `group`.
    pub fn contains(&self, group: &str) -> bool {
        self.0.contains(group)
    }

    /// Returns true if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if at least one group is shared with `other`.
    pub fn intersects(&self, other: &GroupSet) -> bool {
        // Iterate the smaller side.
        let (small, large) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        small.0.iter().any(|g| large.0.contains(g))
    }

    /// Returns true if every group of `self` is in `other`.
    pub fn is_subset(&self, other: &GroupSet) -> bool {
        self.0.is_subset(&other.0)
    }

    /// Union of both sets.
    pub fn union(&self, other: &GroupSet) -> GroupSet {
        GroupSet(self.0.union(&other.0).cloned().collect())
    }

    /// Iterate over group names in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }

    /// Canonical signature: sorted names joined with `|`.
    pub fn signature(&self) -> String {
        self.iter().collect::<Vec<_>>().join("|")
    }
}

impl fmt::Display for GroupSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.iter().collect::<Vec<_>>().join(", "))
    }
}

impl<S: Into<String>> FromIterator<S> for GroupSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for GroupSet {
    fn from(groups: [S; N]) -> Self {
        groups.into_iter().collect()
    }
}

impl From<Vec<String>> for GroupSet {
    fn from(groups: Vec<String>) -> Self {
        groups.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_is_canonical() {
        let a = GroupSet::from(["admin", "public", "admin"]);
        let b = GroupSet::from(["public", "admin"]);
        assert_eq!(a, b);
        assert_eq!(a.signature(), "admin|public");
        assert_eq!(GroupSet::new().signature(), "");
    }

    #[test]
    fn test_intersects() {
        let a = GroupSet::from(["admin", "public"]);
        assert!(a.intersects(&GroupSet::single("public")));
        assert!(!a.intersects(&GroupSet::single("internal")));
        assert!(!a.intersects(&GroupSet::new()));
    }

    #[test]
    fn test_subset_and_union() {
        let a = GroupSet::single("a");
        let ab = GroupSet::from(["a", "b"]);
        assert!(a.is_subset(&ab));
        assert!(!ab.is_subset(&a));
        assert_eq!(a.union(&GroupSet::single("b")), ab);
    }

    #[test]
    fn test_display() {
        assert_eq!(GroupSet::from(["b", "a"]).to_string(), "[a, b]");
    }

    #[test]
    fn test_serde_transparent() {
        let set: GroupSet = serde_json::from_str(r#"["public","admin"]"#).unwrap();
        assert_eq!(set.signature(), "admin|public");
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["admin","public"]"#);
    }
}

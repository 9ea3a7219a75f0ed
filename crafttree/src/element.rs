//! Element names and the closed set of base elements.
//!
//! Element names are compared by value but cloned by reference count, so a tree
//! can mention the same element hundreds of times without copying the string.

use std::{borrow::Borrow, collections::BTreeSet, fmt, ops::Deref, sync::Arc};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Name of an element of the crafting domain.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementName(Arc<str>);

impl ElementName {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for ElementName {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ElementName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ElementName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ElementName {
    fn from(value: String) -> Self {
        Self(Arc::from(value))
    }
}

impl PartialEq<str> for ElementName {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ElementName {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Display for ElementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The four primitives every recipe eventually bottoms out in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, EnumString)]
pub enum CanonicalElement {
    Air,
    Earth,
    Fire,
    Water,
}

impl From<CanonicalElement> for ElementName {
    fn from(value: CanonicalElement) -> Self {
        ElementName::new(value.to_string())
    }
}

/// Closed set of element names that have no producing recipe.
///
/// Base elements are always leaves: neither the static builder nor the
/// expansion policy attaches a recipe below them, even if a path happens to
/// contain a step producing one. The set is a plain value so that a ruleset
/// with different primitives can swap it out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BaseElements {
    names: BTreeSet<ElementName>,
}

impl BaseElements {
    pub fn new(names: impl IntoIterator<Item = impl Into<ElementName>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The canonical `Air`, `Earth`, `Fire`, `Water` set.
    pub fn canonical() -> Self {
        Self::new(CanonicalElement::iter())
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementName> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for BaseElements {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn canonical_set_has_four_primitives() {
        let base = BaseElements::canonical();
        assert_eq!(base.len(), 4);
        for name in ["Air", "Earth", "Fire", "Water"] {
            assert!(base.contains(name), "{name} should be a base element");
        }
        assert!(!base.contains("Lava"));
        assert!(!base.contains("fire"));
    }

    #[test]
    fn canonical_element_parses_from_name() {
        assert_eq!(
            CanonicalElement::from_str("Earth").unwrap(),
            CanonicalElement::Earth
        );
        assert!(CanonicalElement::from_str("Mud").is_err());
    }

    #[test]
    fn custom_ruleset_replaces_canonical_set() {
        let base = BaseElements::new(["Light", "Dark"]);
        assert!(base.contains("Light"));
        assert!(!base.contains("Fire"));
    }

    #[test]
    fn element_names_compare_by_value() {
        let a = ElementName::new("Steam");
        let b: ElementName = String::from("Steam").into();
        assert_eq!(a, b);
        assert_eq!(a, "Steam");
        assert_eq!(a.to_string(), "Steam");
    }
}

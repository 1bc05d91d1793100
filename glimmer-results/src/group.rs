// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical test names.
//!
//! Tests live in an arbitrary-depth namespace of groups, written as
//! `/`-separated paths such as `spec/arb_clear/clear-depth`. The final
//! component names the test itself; everything before it names the groups it
//! belongs to. Report formats with a flatter namespace fold these paths into
//! their own separators; this module is the source of truth they fold from.

use std::{fmt, str::FromStr};
use thiserror::Error;

/// Separator between components of a hierarchical name.
pub const SEPARATOR: char = '/';

/// A hierarchical test name: zero or more group components plus a leaf.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct GroupPath {
    // Invariant: never empty; the last component is the leaf.
    components: Vec<String>,
}

impl GroupPath {
    /// Creates a path consisting of a bare leaf with no enclosing groups.
    pub fn new(leaf: impl Into<String>) -> Self {
        Self {
            components: vec![leaf.into()],
        }
    }

    /// Creates a path from its group components and leaf name.
    pub fn with_groups(groups: Vec<String>, leaf: impl Into<String>) -> Self {
        let mut components = groups;
        components.push(leaf.into());
        Self { components }
    }

    /// All components in order, the leaf last.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The group components, without the leaf.
    pub fn groups(&self) -> &[String] {
        &self.components[..self.components.len() - 1]
    }

    /// The final component.
    pub fn leaf(&self) -> &str {
        self.components[self.components.len() - 1].as_str()
    }

    /// Returns a new path with `component` appended.
    pub fn join(&self, component: impl Into<String>) -> Self {
        let mut components = self.components.clone();
        components.push(component.into());
        Self { components }
    }
}

impl fmt::Display for GroupPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, component) in self.components.iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            f.write_str(component)?;
        }
        Ok(())
    }
}

/// Error parsing a hierarchical name from its `/`-separated form.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("empty test name")]
pub struct ParseGroupPathError;

impl FromStr for GroupPath {
    type Err = ParseGroupPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseGroupPathError);
        }
        Ok(Self {
            components: s.split(SEPARATOR).map(str::to_owned).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let path: GroupPath = "a/group/test1".parse().unwrap();
        assert_eq!(path.groups(), ["a", "group"]);
        assert_eq!(path.leaf(), "test1");
        assert_eq!(path.to_string(), "a/group/test1");
    }

    #[test]
    fn bare_leaf() {
        let path: GroupPath = "test1".parse().unwrap();
        assert!(path.groups().is_empty());
        assert_eq!(path.leaf(), "test1");
    }

    #[test]
    fn empty_name_is_an_error() {
        assert_eq!("".parse::<GroupPath>(), Err(ParseGroupPathError));
    }

    #[test]
    fn join_appends_a_component() {
        let path = GroupPath::new("a").join("group").join("test1");
        assert_eq!(path.to_string(), "a/group/test1");
    }

    #[test]
    fn with_groups_matches_parse() {
        let built = GroupPath::with_groups(vec!["a".to_owned(), "group".to_owned()], "test1");
        let parsed: GroupPath = "a/group/test1".parse().unwrap();
        assert_eq!(built, parsed);
    }
}

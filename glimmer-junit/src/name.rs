// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folding hierarchical names into flat JUnit names and back.
//!
//! Report viewers treat the dots in a `classname` as hierarchy separators,
//! so literal dots inside a group component are escaped to `_` before the
//! components are dot-joined. Viewers also route a few literal case names
//! (`api`, `search`) to special pages; such a leaf gets a trailing `_`
//! appended, which the loader strips again. Stripping only happens when the
//! remainder is one of the reserved names, so every other name maps back to
//! itself exactly.

use crate::errors::FlatNameError;
use glimmer_results::GroupPath;

/// Fixed token every classname is rooted under.
///
/// Keeping all entries under one named testsuite lets these reports coexist
/// with other suites' results in the same report viewer.
pub const ROOT_NAME: &str = "glimmer";

/// Case names some report viewers treat as special routes rather than
/// literal text.
pub const RESERVED_NAMES: &[&str] = &["api", "search"];

fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// Escapes one group component for use inside a dotted classname.
fn escape_component(component: &str) -> String {
    let mut escaped = component.replace('.', "_");
    if is_reserved(&escaped) {
        escaped.push('_');
    }
    escaped
}

/// Strips the reserved-name marker from a component, if one was applied.
fn unescape_component(component: &str) -> &str {
    match component.strip_suffix('_') {
        Some(stripped) if is_reserved(stripped) => stripped,
        _ => component,
    }
}

/// Applies the run-configured suffix and then the reserved-name guard to a
/// leaf name. The suffix goes first; the guard looks at the suffixed whole.
pub(crate) fn guard_leaf(leaf: &str, suffix: &str) -> String {
    let mut guarded = format!("{leaf}{suffix}");
    if is_reserved(&guarded) {
        guarded.push('_');
    }
    guarded
}

/// Strips the reserved-name guard from a leaf name read back from a report.
pub(crate) fn unguard_leaf(leaf: &str) -> &str {
    unescape_component(leaf)
}

/// Converts a hierarchical name into a `(classname, testname)` pair.
///
/// Group components are escaped and dot-joined under [`ROOT_NAME`]; the leaf
/// keeps its dots (viewers never split the case name) but is guarded against
/// reserved names after the run-configured `suffix` is appended.
pub fn to_flat_name(path: &GroupPath, suffix: &str) -> (String, String) {
    let mut classname = String::from(ROOT_NAME);
    for component in path.groups() {
        classname.push('.');
        classname.push_str(&escape_component(component));
    }
    (classname, guard_leaf(path.leaf(), suffix))
}

/// Splits off the root token, returning the remaining dotted groups.
///
/// An empty remainder is valid for a classname (a test at the top of the
/// hierarchy has no groups).
fn strip_root(name: &str) -> Result<&str, FlatNameError> {
    match name.strip_prefix(ROOT_NAME) {
        Some("") => Ok(""),
        Some(rest) => rest.strip_prefix('.').ok_or_else(|| FlatNameError::MissingRoot {
            name: name.to_owned(),
        }),
        None => Err(FlatNameError::MissingRoot {
            name: name.to_owned(),
        }),
    }
}

/// Rebuilds a hierarchical name from a case's `classname`/`name` pair.
pub fn from_flat_case_name(classname: &str, testname: &str) -> Result<GroupPath, FlatNameError> {
    let groups = strip_root(classname)?;
    let groups = if groups.is_empty() {
        Vec::new()
    } else {
        groups
            .split('.')
            .map(|component| unescape_component(component).to_owned())
            .collect()
    };
    Ok(GroupPath::with_groups(groups, unguard_leaf(testname)))
}

/// Rebuilds a hierarchical name from a suite's dotted `name` attribute,
/// where the final dotted component is the leaf.
pub fn from_flat_suite_name(name: &str) -> Result<GroupPath, FlatNameError> {
    let components = strip_root(name)?;
    if components.is_empty() {
        return Err(FlatNameError::Empty {
            name: name.to_owned(),
        });
    }
    let mut components: Vec<String> = components
        .split('.')
        .map(|component| unescape_component(component).to_owned())
        .collect();
    let leaf = components.pop().expect("split always yields one component");
    Ok(GroupPath::with_groups(components, leaf))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> GroupPath {
        s.parse().expect("valid test name")
    }

    #[test]
    fn flat_name_is_rooted_and_dot_joined() {
        let (classname, testname) = to_flat_name(&path("a/test/group/test1"), "");
        assert_eq!(classname, "glimmer.a.test.group");
        assert_eq!(testname, "test1");
    }

    #[test]
    fn dots_in_group_components_are_escaped() {
        let (classname, testname) = to_flat_name(&path("spec/gl-1.0/test"), "");
        assert_eq!(classname, "glimmer.spec.gl-1_0");
        assert_eq!(testname, "test");
    }

    #[test]
    fn reserved_group_component_gets_a_marker() {
        let (classname, _) = to_flat_name(&path("api/test"), "");
        assert_eq!(classname, "glimmer.api_");
    }

    #[test]
    fn reserved_leaf_gets_a_marker() {
        let (_, testname) = to_flat_name(&path("group/api"), "");
        assert_eq!(testname, "api_");
    }

    #[test]
    fn suffix_is_applied_before_the_guard() {
        // "api" + "_x64" is not reserved, so no marker is added.
        assert_eq!(guard_leaf("api", "_x64"), "api_x64");
        // A suffix that lands exactly on a reserved name is guarded.
        assert_eq!(guard_leaf("ap", "i"), "api_");
        assert_eq!(guard_leaf("search", ""), "search_");
    }

    #[test]
    fn round_trip_for_non_reserved_names() {
        for name in ["a/test/group/test1", "test1", "a/b/c/d/e/deep", "g/leaf.with.dots"] {
            let original = path(name);
            let (classname, testname) = to_flat_name(&original, "");
            let recovered = from_flat_case_name(&classname, &testname).expect("name maps back");
            assert_eq!(recovered, original, "round trip of {name}");
        }
    }

    #[test]
    fn round_trip_for_reserved_leaf() {
        let original = path("group/search");
        let (classname, testname) = to_flat_name(&original, "");
        assert_eq!(testname, "search_");
        let recovered = from_flat_case_name(&classname, &testname).expect("name maps back");
        assert_eq!(recovered, original);
    }

    #[test]
    fn trailing_underscore_survives_when_not_reserved() {
        // "foo_" is not an escaped reserved name, so it is left alone.
        let recovered = from_flat_case_name("glimmer.group", "foo_").expect("name maps back");
        assert_eq!(recovered, path("group/foo_"));
    }

    #[test]
    fn suite_name_splits_off_the_leaf() {
        let recovered = from_flat_suite_name("glimmer.a.group.test1").expect("name maps back");
        assert_eq!(recovered, path("a/group/test1"));
    }

    #[test]
    fn missing_root_is_rejected() {
        assert!(matches!(
            from_flat_case_name("other.a.group", "test1"),
            Err(FlatNameError::MissingRoot { .. })
        ));
        // A prefix that merely starts with the root token is not the root token.
        assert!(matches!(
            from_flat_case_name("glimmerish.a", "test1"),
            Err(FlatNameError::MissingRoot { .. })
        ));
        assert!(matches!(
            from_flat_suite_name("glimmer"),
            Err(FlatNameError::Empty { .. })
        ));
    }
}

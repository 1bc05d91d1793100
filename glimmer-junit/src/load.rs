// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Loading consolidated reports back into the native model.
//!
//! The report format is lossy relative to the model: subtests come back
//! with outcomes only, and timing is recovered from the stderr footer when
//! present, falling back to the element's elapsed-time attribute.

use crate::{
    errors::LoadError,
    name::{from_flat_case_name, from_flat_suite_name, unguard_leaf, ROOT_NAME},
    writer::{
        RESULTS_FILE, SYSTEM_ERR_TAG, SYSTEM_OUT_TAG, TESTCASE_TAG, TESTS_DIR, TESTSUITE_TAG,
    },
    xml::{self, Element},
};
use camino::Utf8Path;
use glimmer_results::{GroupPath, Outcome, RunResults, TestResult};
use std::fs;

/// Compression hint accepted by every backend loader. This codec stores
/// plain XML and ignores it.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CompressionHint {
    #[default]
    None,
    Gzip,
    Bzip2,
    Xz,
}

/// Run name used when the path carries no information.
static DEFAULT_RUN_NAME: &str = "junit result";

/// Loads a consolidated report from `path`, which may be either the report
/// file itself or a run directory.
///
/// A directory that still contains a fragment directory cannot be loaded:
/// this format does not support resuming. A directory with neither
/// fragments nor a consolidated report holds no results at all.
pub fn load(path: &Utf8Path, _compression: CompressionHint) -> Result<RunResults, LoadError> {
    if !path.is_dir() {
        return load_file(path);
    }
    if path.join(TESTS_DIR).exists() {
        return Err(LoadError::ResumeUnsupported {
            dir: path.to_owned(),
        });
    }
    let results = path.join(RESULTS_FILE);
    if results.exists() {
        return load_file(&results);
    }
    Err(LoadError::NoResults {
        dir: path.to_owned(),
    })
}

/// Parses one consolidated document into a [`RunResults`].
pub fn load_file(path: &Utf8Path) -> Result<RunResults, LoadError> {
    let contents = fs::read_to_string(path).map_err(|error| LoadError::Read {
        path: path.to_owned(),
        error,
    })?;
    let document = xml::parse_str(&contents).map_err(|error| LoadError::Parse {
        path: path.to_owned(),
        error,
    })?;
    let suite = find_root_suite(&document).ok_or_else(|| LoadError::MissingSuite {
        path: path.to_owned(),
    })?;

    let mut run = RunResults::new(run_name(path));
    for child in &suite.children {
        if child.name == TESTCASE_TAG {
            let (name, result) = read_case(child, path)?;
            run.tests.insert(name, result);
        } else if child.name == TESTSUITE_TAG {
            let (name, result) = read_suite(child, path)?;
            run.tests.insert(name, result);
        }
    }
    Ok(run)
}

/// Derives the run name from the report's path: the file stem unless it is
/// the generic `results`, then the parent directory, then a fixed default.
fn run_name(path: &Utf8Path) -> String {
    match path.file_stem() {
        Some("results") | None => match path.parent().and_then(Utf8Path::file_name) {
            Some(parent) => parent.to_owned(),
            None => DEFAULT_RUN_NAME.to_owned(),
        },
        Some(stem) => stem.to_owned(),
    }
}

/// Finds the root sub-container: the testsuite named with the fixed root
/// token, either as the document root or directly beneath it.
fn find_root_suite(document: &Element) -> Option<&Element> {
    let is_root_suite =
        |element: &Element| element.name == TESTSUITE_TAG && element.attr("name") == Some(ROOT_NAME);
    if is_root_suite(document) {
        return Some(document);
    }
    document.children.iter().find(|child| is_root_suite(child))
}

fn require_attr<'a>(
    element: &'a Element,
    attribute: &'static str,
    path: &Utf8Path,
) -> Result<&'a str, LoadError> {
    element.attr(attribute).ok_or_else(|| LoadError::MissingAttribute {
        path: path.to_owned(),
        element: element.name.clone(),
        attribute,
    })
}

fn parse_outcome(element: &Element, path: &Utf8Path) -> Result<Outcome, LoadError> {
    require_attr(element, "status", path)?
        .parse()
        .map_err(|error| LoadError::UnknownOutcome {
            path: path.to_owned(),
            error,
        })
}

/// Reads a top-level case element back into a result.
fn read_case(case: &Element, path: &Utf8Path) -> Result<(GroupPath, TestResult), LoadError> {
    let classname = require_attr(case, "classname", path)?;
    let testname = require_attr(case, "name", path)?;
    let name = from_flat_case_name(classname, testname)?;

    let mut result = TestResult::new(parse_outcome(case, path)?);
    populate_result(&mut result, case, path)?;
    Ok((name, result))
}

/// Reads a suite element (a test with subtests) back into a result.
///
/// Only one level of nesting is defined; a suite inside this suite means
/// the document was not produced by this codec's two-level schema.
fn read_suite(suite: &Element, path: &Utf8Path) -> Result<(GroupPath, TestResult), LoadError> {
    let suite_name = require_attr(suite, "name", path)?;
    let name = from_flat_suite_name(suite_name)?;

    // A suite's own entry carries no raw outcome in the report; its meaning
    // lives in the subtests, which is also what the totals count.
    let mut result = TestResult::new(Outcome::Pass);
    populate_result(&mut result, suite, path)?;

    for child in &suite.children {
        if child.name == TESTSUITE_TAG {
            return Err(LoadError::NestedSuite {
                path: path.to_owned(),
                name: suite_name.to_owned(),
            });
        }
        if child.name == TESTCASE_TAG {
            let subtest = require_attr(child, "name", path)?;
            result
                .subtests
                .insert(unguard_leaf(subtest).to_owned(), parse_outcome(child, path)?);
        }
    }
    Ok((name, result))
}

/// Recovers time, command, and captured output from a case or suite
/// element. Absent children leave the corresponding fields unset; the
/// writer legitimately produces such cases for incomplete runs.
fn populate_result(
    result: &mut TestResult,
    element: &Element,
    path: &Utf8Path,
) -> Result<(), LoadError> {
    if let Some(value) = element.attr("time") {
        let time = value.parse().map_err(|_| LoadError::InvalidTime {
            path: path.to_owned(),
            value: value.to_owned(),
        })?;
        result.time.end = Some(time);
    }

    if let Some(out) = element.find_child(SYSTEM_OUT_TAG) {
        // The command line is the first line of the output block.
        match out.text.split_once('\n') {
            Some((command, rest)) => {
                result.command = command.to_owned();
                result.out = rest.to_owned();
            }
            None => result.command = out.text.clone(),
        }
    }

    if let Some(err) = element.find_child(SYSTEM_ERR_TAG) {
        result.err = err.text.clone();
        scan_time_footer(&err.text, &mut result.time);
    }
    Ok(())
}

/// Scans stderr text for the timestamp footer, accepting both the written
/// `start time:` spelling and the legacy `time start:` one. The footer is
/// appended last, so the last match wins.
fn scan_time_footer(err: &str, time: &mut glimmer_results::TimeInterval) {
    for line in err.lines() {
        if let Some(value) = line
            .strip_prefix("time start:")
            .or_else(|| line.strip_prefix("start time:"))
        {
            if let Ok(value) = value.trim().parse() {
                time.start = Some(value);
            }
        } else if let Some(value) = line
            .strip_prefix("time end:")
            .or_else(|| line.strip_prefix("end time:"))
        {
            if let Ok(value) = value.trim().parse() {
                time.end = Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimmer_results::TimeInterval;

    #[test]
    fn run_name_prefers_the_file_stem() {
        assert_eq!(run_name(Utf8Path::new("/tmp/foobar.xml")), "foobar");
    }

    #[test]
    fn run_name_falls_back_to_the_parent_directory() {
        assert_eq!(
            run_name(Utf8Path::new("/tmp/a cool test/results.xml")),
            "a cool test"
        );
    }

    #[test]
    fn run_name_falls_back_to_the_default() {
        assert_eq!(run_name(Utf8Path::new("results.xml")), "junit result");
    }

    #[test]
    fn footer_scan_accepts_both_spellings() {
        let mut time = TimeInterval::default();
        scan_time_footer("time start: 1.0\ntime end: 4.5", &mut time);
        assert_eq!(time, TimeInterval::new(1.0, 4.5));

        let mut time = TimeInterval::default();
        scan_time_footer("junk\n\nstart time: 2.25\nend time: 9\n", &mut time);
        assert_eq!(time, TimeInterval::new(2.25, 9.0));
    }

    #[test]
    fn footer_scan_leaves_time_alone_without_a_footer() {
        let mut time = TimeInterval {
            start: None,
            end: Some(1.5),
        };
        scan_time_footer("no timestamps here", &mut time);
        assert_eq!(time.start, None);
        assert_eq!(time.end, Some(1.5));
    }
}

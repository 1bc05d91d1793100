// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Writing per-test fragments and merging them into the consolidated
//! report.

use crate::{
    errors::WriteError,
    expectations::{reconcile, ExpectationSet, Reconciled, Synthesized},
    name::{guard_leaf, to_flat_name, ROOT_NAME},
    xml::{self, Element},
};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use camino::{Utf8Path, Utf8PathBuf};
use glimmer_results::{GroupPath, Outcome, TestResult, TimeInterval};
use std::{
    fs,
    sync::atomic::{AtomicU64, Ordering},
};
use tracing::warn;

pub(crate) static TESTSUITES_TAG: &str = "testsuites";
pub(crate) static TESTSUITE_TAG: &str = "testsuite";
pub(crate) static TESTCASE_TAG: &str = "testcase";
pub(crate) static FAILURE_TAG: &str = "failure";
pub(crate) static ERROR_TAG: &str = "error";
pub(crate) static SKIPPED_TAG: &str = "skipped";
pub(crate) static SYSTEM_OUT_TAG: &str = "system-out";
pub(crate) static SYSTEM_ERR_TAG: &str = "system-err";

/// Name of the fragment directory inside a run directory.
pub(crate) static TESTS_DIR: &str = "tests";
/// Name of the consolidated report file.
pub(crate) static RESULTS_FILE: &str = "results.xml";

/// Writes one XML fragment per finished test and merges them into
/// `results.xml`.
///
/// Fragment writes share no mutable state beyond an atomic id counter, so
/// results may be written from multiple threads through a shared reference.
/// [`finalize`](Self::finalize) is a single blocking pass; the caller must
/// ensure every outstanding write has completed before invoking it.
#[derive(Debug)]
pub struct JunitWriter {
    run_dir: Utf8PathBuf,
    suffix: String,
    expectations: ExpectationSet,
    next_fragment: AtomicU64,
}

impl JunitWriter {
    /// Creates a writer for the given run directory.
    pub fn new(run_dir: impl Into<Utf8PathBuf>, expectations: ExpectationSet) -> Self {
        Self {
            run_dir: run_dir.into(),
            suffix: String::new(),
            expectations,
            next_fragment: AtomicU64::new(0),
        }
    }

    /// Sets the run-configured suffix appended to every leaf test name.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    fn tests_dir(&self) -> Utf8PathBuf {
        self.run_dir.join(TESTS_DIR)
    }

    /// Creates a fresh fragment directory, removing any leftovers from a
    /// previous run. This format cannot resume, so stale fragments must not
    /// leak into the new run's report.
    pub fn initialize(&self) -> Result<(), WriteError> {
        let tests_dir = self.tests_dir();
        if tests_dir.exists() {
            fs::remove_dir_all(&tests_dir).map_err(|error| WriteError::Fs {
                path: tests_dir.clone(),
                error,
            })?;
        }
        fs::create_dir_all(&tests_dir).map_err(|error| WriteError::Fs {
            path: tests_dir.clone(),
            error,
        })?;
        Ok(())
    }

    /// Serializes one result into its own fragment under `tests/` and
    /// returns the fragment's path.
    pub fn write_test(
        &self,
        name: &GroupPath,
        result: &TestResult,
    ) -> Result<Utf8PathBuf, WriteError> {
        let element = self.make_fragment(name, result);
        let id = self.next_fragment.fetch_add(1, Ordering::Relaxed);
        let path = self.tests_dir().join(format!("{id}.xml"));
        write_atomically(&path, |file| xml::serialize_fragment(&element, file))?;
        Ok(path)
    }

    /// Merges every fragment into `results.xml` and removes the fragment
    /// directory.
    ///
    /// A fragment that cannot be parsed is logged and skipped rather than
    /// failing the run: a mostly-complete report is more useful than none.
    /// Returns the path of the consolidated report.
    pub fn finalize(&self) -> Result<Utf8PathBuf, WriteError> {
        let tests_dir = self.tests_dir();
        let mut suite = Element::new(TESTSUITE_TAG);
        suite.set_attr("name", ROOT_NAME);

        let entries = fs::read_dir(&tests_dir).map_err(|error| WriteError::Fs {
            path: tests_dir.clone(),
            error,
        })?;
        for entry in entries {
            let entry = entry.map_err(|error| WriteError::Fs {
                path: tests_dir.clone(),
                error,
            })?;
            let path = match Utf8PathBuf::from_path_buf(entry.path()) {
                Ok(path) => path,
                Err(path) => {
                    warn!("skipping fragment with non-UTF-8 name `{}`", path.display());
                    continue;
                }
            };
            let contents = match fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(error) => {
                    warn!("skipping unreadable fragment `{path}`: {error}");
                    continue;
                }
            };
            match xml::parse_str(&contents) {
                Ok(element) => suite.push(element),
                Err(error) => {
                    warn!("skipping malformed fragment `{path}`: {error}");
                }
            }
        }

        // The count spans the whole subtree, matching the traversal a
        // report consumer performs.
        suite.set_attr("tests", suite.descendant_count(TESTCASE_TAG).to_string());

        let mut root = Element::new(TESTSUITES_TAG);
        root.push(suite);

        let results_path = self.run_dir.join(RESULTS_FILE);
        write_atomically(&results_path, |file| xml::serialize_document(&root, file))?;

        fs::remove_dir_all(&tests_dir).map_err(|error| WriteError::Fs {
            path: tests_dir.clone(),
            error,
        })?;
        Ok(results_path)
    }

    fn make_fragment(&self, name: &GroupPath, result: &TestResult) -> Element {
        let (classname, testname) = to_flat_name(name, &self.suffix);
        if result.subtests.is_empty() {
            // Expectations are keyed on the plain leaf name, without the
            // run-configured suffix or the reserved-name guard.
            let identifier = expectation_identifier(&classname, name.leaf());
            self.make_case(&testname, &classname, &identifier, result)
        } else {
            self.make_suite(&testname, &classname, result)
        }
    }

    /// Builds a plain `<testcase>` fragment.
    fn make_case(
        &self,
        testname: &str,
        classname: &str,
        identifier: &str,
        result: &TestResult,
    ) -> Element {
        let mut case = Element::new(TESTCASE_TAG);
        case.set_attr("name", testname);
        case.set_attr("classname", classname);

        if result.outcome == Outcome::Incomplete {
            // The run never finished: there is no timing or output to
            // embed, and expectations don't apply.
            case.set_attr("status", result.outcome.as_str());
            let mut failure = Element::new(FAILURE_TAG);
            failure.set_attr("message", "Incomplete run.");
            case.push(failure);
            return case;
        }

        if let Some(total) = result.time.total() {
            case.set_attr("time", total.to_string());
        }
        case.set_attr("status", result.outcome.as_str());

        let mut err_text = format!("{}{}", result.err, time_footer(&result.time));
        let reconciled = reconcile(result.outcome, self.expectations.classify(identifier));
        append_annotation(&mut err_text, &reconciled);

        case.push(output_element(SYSTEM_OUT_TAG, &format!("{}\n{}", result.command, result.out)));
        case.push(output_element(SYSTEM_ERR_TAG, &err_text));
        if let Some(status) = status_element(&reconciled, result.outcome) {
            case.push(status);
        }
        case
    }

    /// Builds a `<testsuite>` fragment for a test with subtests.
    ///
    /// Output and timing live on the suite; subtest cases carry only a name,
    /// a status, and a descriptive placeholder output. Expected-failure
    /// warnings for subtests land in the suite's stderr.
    fn make_suite(&self, testname: &str, classname: &str, result: &TestResult) -> Element {
        let mut suite = Element::new(TESTSUITE_TAG);
        // Unlike a case's standalone name attribute, the suite name is
        // dotted and gets split back into components on load, so literal
        // dots in the leaf have to be escaped here too.
        suite.set_attr(
            "name",
            format!("{classname}.{}", testname.replace('.', "_")),
        );
        if let Some(total) = result.time.total() {
            suite.set_attr("time", total.to_string());
        }

        let mut err_text = format!("{}{}", result.err, time_footer(&result.time));
        let cases: Vec<Element> = result
            .subtests
            .iter()
            .map(|(subtest, &outcome)| self.make_subcase(subtest, outcome, &mut err_text))
            .collect();

        suite.push(output_element(SYSTEM_OUT_TAG, &format!("{}\n{}", result.command, result.out)));
        suite.push(output_element(SYSTEM_ERR_TAG, &err_text));
        for case in cases {
            suite.push(case);
        }

        // Summary counts are queried off the finished tree, not tracked
        // while building it.
        for (attr, tag) in [
            ("failures", FAILURE_TAG),
            ("errors", ERROR_TAG),
            ("skipped", SKIPPED_TAG),
        ] {
            let count = suite
                .children_named(TESTCASE_TAG)
                .filter(|case| case.find_child(tag).is_some())
                .count();
            suite.set_attr(attr, count.to_string());
        }
        suite.set_attr(
            "tests",
            suite.children_named(TESTCASE_TAG).count().to_string(),
        );
        suite
    }

    fn make_subcase(&self, subtest: &str, outcome: Outcome, err_text: &mut String) -> Element {
        let mut case = Element::new(TESTCASE_TAG);
        case.set_attr("name", guard_leaf(subtest, &self.suffix));
        case.set_attr("status", outcome.as_str());

        let reconciled = reconcile(
            outcome,
            self.expectations
                .classify(&ExpectationSet::normalize(subtest)),
        );
        append_annotation(err_text, &reconciled);
        if let Some(status) = status_element(&reconciled, outcome) {
            case.push(status);
        }
        case.push(output_element(
            SYSTEM_OUT_TAG,
            &format!("I am a subtest of {subtest}"),
        ));
        case
    }
}

/// The identifier looked up in the expectation sets for a whole test: the
/// dotted flat name without the fixed root token.
fn expectation_identifier(classname: &str, testname: &str) -> String {
    match classname
        .strip_prefix(ROOT_NAME)
        .and_then(|rest| rest.strip_prefix('.'))
    {
        Some(groups) => ExpectationSet::normalize(&format!("{groups}.{testname}")),
        None => ExpectationSet::normalize(testname),
    }
}

/// The two-line timestamp footer appended to captured stderr. Unset bounds
/// are written as zero, mirroring how elapsed time treats them.
fn time_footer(time: &TimeInterval) -> String {
    format!(
        "\n\nstart time: {}\nend time: {}\n",
        time.start.unwrap_or(0.0),
        time.end.unwrap_or(0.0)
    )
}

fn append_annotation(err_text: &mut String, reconciled: &Reconciled) {
    if let Some(annotation) = &reconciled.annotation {
        err_text.push_str("\n\n");
        err_text.push_str(annotation);
    }
}

/// The `skipped`/`failure`/`error` element for a reconciled case, if one is
/// called for. The raw outcome rides along as the `type` attribute.
fn status_element(reconciled: &Reconciled, outcome: Outcome) -> Option<Element> {
    let mut element = match &reconciled.element {
        Synthesized::None => return None,
        Synthesized::Skipped { message } => {
            let mut element = Element::new(SKIPPED_TAG);
            if let Some(message) = message {
                element.set_attr("message", *message);
            }
            element
        }
        Synthesized::Failure => Element::new(FAILURE_TAG),
        Synthesized::Error => Element::new(ERROR_TAG),
    };
    element.set_attr("type", outcome.as_str());
    Some(element)
}

fn output_element(tag: &str, text: &str) -> Element {
    let mut element = Element::new(tag);
    element.text = sanitize(text);
    element
}

/// Strips control characters XML 1.0 cannot carry, even escaped.
fn sanitize(text: &str) -> String {
    text.replace(
        |c| matches!(c, '\x00'..='\x08' | '\x0b' | '\x0c' | '\x0e'..='\x1f'),
        "",
    )
}

fn write_atomically(
    path: &Utf8Path,
    write: impl FnOnce(&mut fs::File) -> Result<(), crate::errors::XmlError>,
) -> Result<(), WriteError> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(write)
        .map_err(|error| match error {
            atomicwrites::Error::Internal(error) => WriteError::Fs {
                path: path.to_owned(),
                error,
            },
            atomicwrites::Error::User(error) => WriteError::Serialize {
                path: path.to_owned(),
                error,
            },
        })
}

// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Results for an entire run and for individual tests.

use crate::{GroupPath, Outcome};
use indexmap::IndexMap;

/// Start and end instants of a test, in seconds since the run began.
///
/// Either bound may be unset: a result loaded from a report format that only
/// stores elapsed time has no start, and a test that never finished has no
/// end.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TimeInterval {
    /// When the test began.
    pub start: Option<f64>,
    /// When the test finished.
    pub end: Option<f64>,
}

impl TimeInterval {
    /// Creates an interval with both bounds set.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Elapsed seconds. An unset start counts as zero; `None` if the end is
    /// unset.
    pub fn total(&self) -> Option<f64> {
        self.end.map(|end| end - self.start.unwrap_or(0.0))
    }
}

/// Everything recorded about one executed test.
///
/// Subtests carry an outcome only; their timing and output are folded into
/// the parent's.
#[derive(Clone, Debug)]
pub struct TestResult {
    /// The raw outcome decided by the execution engine.
    pub outcome: Outcome,
    /// When the test ran.
    pub time: TimeInterval,
    /// Captured standard output.
    pub out: String,
    /// Captured standard error.
    pub err: String,
    /// The command line that produced this result.
    pub command: String,
    /// Insertion-ordered subtest outcomes, keyed by subtest name.
    pub subtests: IndexMap<String, Outcome>,
}

impl TestResult {
    /// Creates an empty result with the given outcome.
    pub fn new(outcome: Outcome) -> Self {
        Self {
            outcome,
            time: TimeInterval::default(),
            out: String::new(),
            err: String::new(),
            command: String::new(),
            subtests: IndexMap::new(),
        }
    }
}

/// A whole run: a name plus an insertion-ordered mapping from hierarchical
/// test name to result.
#[derive(Clone, Debug, Default)]
pub struct RunResults {
    /// The run's name, usually derived from where it is stored.
    pub name: String,
    /// Results keyed by hierarchical name, in insertion order.
    pub tests: IndexMap<GroupPath, TestResult>,
}

impl RunResults {
    /// Creates an empty run.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tests: IndexMap::new(),
        }
    }

    /// Outcome totals over the whole run.
    ///
    /// Totals are a query over the current mapping, recomputed on every call.
    /// A test with subtests contributes its subtests' outcomes rather than
    /// its own.
    pub fn totals(&self) -> Totals {
        let mut totals = Totals::default();
        for result in self.tests.values() {
            if result.subtests.is_empty() {
                totals.record(result.outcome);
            } else {
                for &outcome in result.subtests.values() {
                    totals.record(outcome);
                }
            }
        }
        totals
    }
}

/// Counts of results by outcome.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Totals {
    pub pass: usize,
    pub fail: usize,
    pub crash: usize,
    pub skip: usize,
    pub dmesg_warn: usize,
    pub dmesg_fail: usize,
    pub incomplete: usize,
}

impl Totals {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pass => self.pass += 1,
            Outcome::Fail => self.fail += 1,
            Outcome::Crash => self.crash += 1,
            Outcome::Skip => self.skip += 1,
            Outcome::DmesgWarn => self.dmesg_warn += 1,
            Outcome::DmesgFail => self.dmesg_fail += 1,
            Outcome::Incomplete => self.incomplete += 1,
        }
    }

    /// Total number of counted results.
    pub fn total(&self) -> usize {
        self.pass
            + self.fail
            + self.crash
            + self.skip
            + self.dmesg_warn
            + self.dmesg_fail
            + self.incomplete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_defaults_start_to_zero() {
        let time = TimeInterval {
            start: None,
            end: Some(1.5),
        };
        assert_eq!(time.total(), Some(1.5));
        assert_eq!(TimeInterval::new(1.0, 4.5).total(), Some(3.5));
        assert_eq!(TimeInterval::default().total(), None);
    }

    #[test]
    fn totals_count_plain_tests() {
        let mut run = RunResults::new("run");
        run.tests
            .insert("a/pass".parse().unwrap(), TestResult::new(Outcome::Pass));
        run.tests
            .insert("a/fail".parse().unwrap(), TestResult::new(Outcome::Fail));
        run.tests
            .insert("a/skip".parse().unwrap(), TestResult::new(Outcome::Skip));

        let totals = run.totals();
        assert_eq!(totals.pass, 1);
        assert_eq!(totals.fail, 1);
        assert_eq!(totals.skip, 1);
        assert_eq!(totals.total(), 3);
    }

    #[test]
    fn totals_count_subtests_instead_of_their_parent() {
        let mut parent = TestResult::new(Outcome::Pass);
        parent.subtests.insert("one".to_owned(), Outcome::Pass);
        parent.subtests.insert("two".to_owned(), Outcome::Crash);

        let mut run = RunResults::new("run");
        run.tests.insert("a/parent".parse().unwrap(), parent);

        let totals = run.totals();
        assert_eq!(totals.pass, 1);
        assert_eq!(totals.crash, 1);
        assert_eq!(totals.total(), 2);
    }
}

// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reclassifying raw outcomes against expected-failure and expected-crash
//! lists.
//!
//! Known breakage is reported as skipped so that report viewers only flag
//! regressions, while the raw outcome is preserved as a `type` attribute on
//! whatever element is synthesized.

use glimmer_results::Outcome;
use std::{collections::HashSet, fmt};

/// Reporting-level reclassification of a test, derived from the configured
/// expectation lists. Distinct from the raw outcome.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ExpectedLabel {
    /// The test is expected to pass.
    Pass,
    /// The test is on the expected-failure list.
    Failure,
    /// The test is on the expected-crash list.
    Error,
}

impl fmt::Display for ExpectedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExpectedLabel::Pass => "pass",
            ExpectedLabel::Failure => "failure",
            ExpectedLabel::Error => "error",
        })
    }
}

/// Case-insensitive sets of test identifiers expected to fail or crash.
///
/// The sets are handed in explicitly at construction; nothing is read from
/// ambient configuration. Identifiers are normalized with
/// [`ExpectationSet::normalize`] on the way in, so config files may use any
/// case and the `=`/`:` punctuation of parameterized test names.
#[derive(Clone, Debug, Default)]
pub struct ExpectationSet {
    expected_failures: HashSet<String>,
    expected_crashes: HashSet<String>,
}

impl ExpectationSet {
    /// Builds a matcher from raw identifier lists.
    pub fn new(
        failures: impl IntoIterator<Item = impl AsRef<str>>,
        crashes: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Self {
        Self {
            expected_failures: failures
                .into_iter()
                .map(|name| Self::normalize(name.as_ref()))
                .collect(),
            expected_crashes: crashes
                .into_iter()
                .map(|name| Self::normalize(name.as_ref()))
                .collect(),
        }
    }

    /// Normalizes an identifier the way the sets store them: lowercased,
    /// with `=` and `:` folded to `.`.
    pub fn normalize(identifier: &str) -> String {
        identifier.to_lowercase().replace(['=', ':'], ".")
    }

    /// Returns the expected label for a normalized identifier.
    ///
    /// # Panics
    ///
    /// Panics if the identifier is registered as both an expected failure
    /// and an expected crash. The two lists must be disjoint; overlap is a
    /// configuration error upstream, and this check is the last line of
    /// defense against it.
    pub fn classify(&self, identifier: &str) -> ExpectedLabel {
        let failure = self.expected_failures.contains(identifier);
        let crash = self.expected_crashes.contains(identifier);
        assert!(
            !(failure && crash),
            "`{identifier}` is listed as both an expected failure and an expected crash"
        );
        if failure {
            ExpectedLabel::Failure
        } else if crash {
            ExpectedLabel::Error
        } else {
            ExpectedLabel::Pass
        }
    }
}

/// The element to synthesize in a report for one reconciled case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Synthesized {
    /// Nothing: the case is reported as a plain success.
    None,
    /// A `skipped` element, optionally carrying a message.
    Skipped { message: Option<&'static str> },
    /// A `failure` element.
    Failure,
    /// An `error` element.
    Error,
}

/// Result of reconciling a raw outcome with its expected label: the element
/// to synthesize plus a warning to append to the captured stderr, if any.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Reconciled {
    pub element: Synthesized,
    pub annotation: Option<String>,
}

/// Decides what a report records for one `(raw outcome, expected label)`
/// pair.
///
/// Incomplete runs never reach this point; the writer handles them before
/// consulting expectations.
pub fn reconcile(outcome: Outcome, expected: ExpectedLabel) -> Reconciled {
    match (outcome, expected) {
        (Outcome::Skip, _) => Reconciled {
            element: Synthesized::Skipped { message: None },
            annotation: None,
        },
        (
            Outcome::Fail | Outcome::DmesgWarn | Outcome::DmesgFail,
            ExpectedLabel::Failure,
        ) => Reconciled {
            element: Synthesized::Skipped {
                message: Some("expected failure"),
            },
            annotation: Some("WARN: passing test as an expected failure".to_owned()),
        },
        (Outcome::Fail | Outcome::DmesgWarn | Outcome::DmesgFail, _) => Reconciled {
            element: Synthesized::Failure,
            annotation: None,
        },
        (Outcome::Crash, ExpectedLabel::Error) => Reconciled {
            element: Synthesized::Skipped {
                message: Some("expected crash"),
            },
            annotation: Some("WARN: passing test as an expected crash".to_owned()),
        },
        (Outcome::Crash, _) => Reconciled {
            element: Synthesized::Error,
            annotation: None,
        },
        (_, ExpectedLabel::Pass) => Reconciled {
            element: Synthesized::None,
            annotation: None,
        },
        (_, expected) => Reconciled {
            element: Synthesized::Failure,
            annotation: Some(format!(
                "ERROR: This test passed when it expected {expected}"
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_folds_case_and_punctuation() {
        assert_eq!(
            ExpectationSet::normalize("Spec.ARB_foo.Test=Case:1"),
            "spec.arb_foo.test.case.1"
        );
    }

    #[test]
    fn classify_matches_case_insensitively() {
        let set = ExpectationSet::new(["Group.Fails=Here"], ["group.crashes"]);
        assert_eq!(
            set.classify(&ExpectationSet::normalize("group.fails.here")),
            ExpectedLabel::Failure
        );
        assert_eq!(set.classify("group.crashes"), ExpectedLabel::Error);
        assert_eq!(set.classify("group.other"), ExpectedLabel::Pass);
    }

    #[test]
    #[should_panic(expected = "both an expected failure and an expected crash")]
    fn overlapping_sets_panic_at_classification() {
        let set = ExpectationSet::new(["group.test"], ["group.test"]);
        set.classify("group.test");
    }

    #[test]
    fn skip_is_always_skipped() {
        for expected in [ExpectedLabel::Pass, ExpectedLabel::Failure, ExpectedLabel::Error] {
            let reconciled = reconcile(Outcome::Skip, expected);
            assert_eq!(
                reconciled.element,
                Synthesized::Skipped { message: None }
            );
            assert_eq!(reconciled.annotation, None);
        }
    }

    #[test]
    fn expected_failure_is_reported_as_skipped() {
        for outcome in [Outcome::Fail, Outcome::DmesgWarn, Outcome::DmesgFail] {
            let reconciled = reconcile(outcome, ExpectedLabel::Failure);
            assert_eq!(
                reconciled.element,
                Synthesized::Skipped {
                    message: Some("expected failure")
                }
            );
            assert_eq!(
                reconciled.annotation.as_deref(),
                Some("WARN: passing test as an expected failure")
            );
        }
    }

    #[test]
    fn unexpected_failure_is_a_failure() {
        for outcome in [Outcome::Fail, Outcome::DmesgWarn, Outcome::DmesgFail] {
            for expected in [ExpectedLabel::Pass, ExpectedLabel::Error] {
                let reconciled = reconcile(outcome, expected);
                assert_eq!(reconciled.element, Synthesized::Failure);
                assert_eq!(reconciled.annotation, None);
            }
        }
    }

    #[test]
    fn expected_crash_is_reported_as_skipped() {
        let reconciled = reconcile(Outcome::Crash, ExpectedLabel::Error);
        assert_eq!(
            reconciled.element,
            Synthesized::Skipped {
                message: Some("expected crash")
            }
        );
        assert_eq!(
            reconciled.annotation.as_deref(),
            Some("WARN: passing test as an expected crash")
        );
    }

    #[test]
    fn unexpected_crash_is_an_error() {
        for expected in [ExpectedLabel::Pass, ExpectedLabel::Failure] {
            let reconciled = reconcile(Outcome::Crash, expected);
            assert_eq!(reconciled.element, Synthesized::Error);
            assert_eq!(reconciled.annotation, None);
        }
    }

    #[test]
    fn pass_with_unmet_expectation_is_a_failure() {
        let reconciled = reconcile(Outcome::Pass, ExpectedLabel::Failure);
        assert_eq!(reconciled.element, Synthesized::Failure);
        assert_eq!(
            reconciled.annotation.as_deref(),
            Some("ERROR: This test passed when it expected failure")
        );

        let reconciled = reconcile(Outcome::Pass, ExpectedLabel::Error);
        assert_eq!(
            reconciled.annotation.as_deref(),
            Some("ERROR: This test passed when it expected error")
        );
    }

    #[test]
    fn plain_pass_synthesizes_nothing() {
        let reconciled = reconcile(Outcome::Pass, ExpectedLabel::Pass);
        assert_eq!(reconciled.element, Synthesized::None);
        assert_eq!(reconciled.annotation, None);
    }
}

// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test outcomes as decided by the execution engine.

use std::{fmt, str::FromStr};
use thiserror::Error;

/// The raw result of a single test or subtest.
///
/// Outcomes are decided by the execution engine; report backends only carry
/// them. The wire representation is the lowercase hyphenated token returned
/// by [`Outcome::as_str`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// The test passed.
    Pass,
    /// The test ran to completion and failed.
    Fail,
    /// The test terminated abnormally.
    Crash,
    /// The test was skipped without running.
    Skip,
    /// The test passed but the kernel log contained new warnings.
    DmesgWarn,
    /// The test failed and the kernel log contained new errors.
    DmesgFail,
    /// The test started but never reported a result.
    Incomplete,
}

impl Outcome {
    /// Returns the wire token for this outcome.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pass => "pass",
            Outcome::Fail => "fail",
            Outcome::Crash => "crash",
            Outcome::Skip => "skip",
            Outcome::DmesgWarn => "dmesg-warn",
            Outcome::DmesgFail => "dmesg-fail",
            Outcome::Incomplete => "incomplete",
        }
    }

    /// Whether this outcome counts as some kind of failure.
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Outcome::Fail | Outcome::Crash | Outcome::DmesgWarn | Outcome::DmesgFail
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outcome token that isn't part of the closed enumeration.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("unknown outcome `{token}`")]
pub struct UnknownOutcome {
    /// The token as it appeared on the wire.
    pub token: String,
}

impl FromStr for Outcome {
    type Err = UnknownOutcome;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(Outcome::Pass),
            "fail" => Ok(Outcome::Fail),
            "crash" => Ok(Outcome::Crash),
            "skip" => Ok(Outcome::Skip),
            "dmesg-warn" => Ok(Outcome::DmesgWarn),
            "dmesg-fail" => Ok(Outcome::DmesgFail),
            "incomplete" => Ok(Outcome::Incomplete),
            other => Err(UnknownOutcome {
                token: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[Outcome] = &[
        Outcome::Pass,
        Outcome::Fail,
        Outcome::Crash,
        Outcome::Skip,
        Outcome::DmesgWarn,
        Outcome::DmesgFail,
        Outcome::Incomplete,
    ];

    #[test]
    fn tokens_round_trip() {
        for &outcome in ALL {
            assert_eq!(outcome.as_str().parse::<Outcome>(), Ok(outcome));
        }
    }

    #[test]
    fn unknown_token_is_an_error() {
        let err = "warn".parse::<Outcome>().unwrap_err();
        assert_eq!(err.token, "warn");
    }

    #[test]
    fn failure_predicate() {
        assert!(Outcome::Fail.is_failure());
        assert!(Outcome::Crash.is_failure());
        assert!(Outcome::DmesgWarn.is_failure());
        assert!(Outcome::DmesgFail.is_failure());
        assert!(!Outcome::Pass.is_failure());
        assert!(!Outcome::Skip.is_failure());
        assert!(!Outcome::Incomplete.is_failure());
    }
}

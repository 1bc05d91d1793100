// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The in-memory model of a glimmer test run.
//!
//! A run is a named, insertion-ordered mapping from hierarchical test name to
//! result. Results are produced by the (external) execution engine and handed
//! to a report backend once, after which they are never mutated. Aggregate
//! totals are always derived from the mapping, never stored alongside it.

mod group;
mod outcome;
mod run;

pub use group::{GroupPath, ParseGroupPathError, SEPARATOR};
pub use outcome::{Outcome, UnknownOutcome};
pub use run::{RunResults, TestResult, TimeInterval, Totals};

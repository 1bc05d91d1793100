// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JUnit XML reports for glimmer test runs.
//!
//! The backend folds the model's arbitrary-depth hierarchical names into
//! the flat two-level schema JUnit consumers expect. Each finished test is
//! serialized into its own fragment under `<run-dir>/tests/`, so parallel
//! writers never contend; [`JunitWriter::finalize`] merges every parseable
//! fragment into `<run-dir>/results.xml`, tolerating corrupt fragments, and
//! removes the fragment directory. [`load`] reads a consolidated report
//! back into the in-memory model.
//!
//! Raw outcomes can be reclassified against expected-failure and
//! expected-crash lists ([`ExpectationSet`]) so that report viewers only
//! flag regressions; the raw outcome is always preserved as a `type`
//! attribute alongside the reclassification.

mod errors;
mod expectations;
mod load;
mod name;
mod writer;
mod xml;

pub use errors::{FlatNameError, LoadError, WriteError, XmlError};
pub use expectations::{reconcile, ExpectationSet, ExpectedLabel, Reconciled, Synthesized};
pub use load::{load, load_file, CompressionHint};
pub use name::{from_flat_case_name, from_flat_suite_name, to_flat_name, RESERVED_NAMES, ROOT_NAME};
pub use writer::JunitWriter;

// Copyright (c) The glimmer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use camino::Utf8PathBuf;
use glimmer_results::UnknownOutcome;
use std::io;
use thiserror::Error;

/// An error that occurs while reading or writing raw XML.
#[derive(Debug, Error)]
pub enum XmlError {
    /// The underlying XML reader or writer reported an error.
    #[error("XML syntax error")]
    Syntax(#[from] quick_xml::Error),

    /// An I/O error while writing serialized XML.
    #[error("I/O error while writing XML")]
    Io(#[from] io::Error),

    /// The document contained no root element.
    #[error("document has no root element")]
    NoRoot,

    /// The document contained more than one root element.
    #[error("document has more than one root element")]
    MultipleRoots,

    /// The document ended inside an open element.
    #[error("unexpected end of document")]
    UnexpectedEof,
}

/// An error that occurs while writing fragments or the consolidated report.
///
/// Returned by [`JunitWriter`](crate::JunitWriter) methods. A fragment that
/// fails to *parse* during finalize is not an error; only I/O and
/// serialization failures are.
#[derive(Debug, Error)]
pub enum WriteError {
    /// An I/O error at the given path.
    #[error("I/O error at `{path}`")]
    Fs {
        path: Utf8PathBuf,
        #[source]
        error: io::Error,
    },

    /// Serializing a document to the given path failed.
    #[error("error serializing report `{path}`")]
    Serialize {
        path: Utf8PathBuf,
        #[source]
        error: XmlError,
    },
}

/// A flat classname or suite name that can't be mapped back to a
/// hierarchical name.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum FlatNameError {
    /// The name does not start with the fixed root token.
    #[error("flat name `{name}` is not rooted under the report namespace")]
    MissingRoot { name: String },

    /// The name consists of the root token alone.
    #[error("flat name `{name}` has no components besides the root token")]
    Empty { name: String },
}

/// An error that occurs while loading a consolidated report.
///
/// Load-path failures are always surfaced; nothing is silently defaulted.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A fragment directory still exists: the run never finalized, and this
    /// format cannot resume from fragments.
    #[error("run directory `{dir}` still contains a fragment directory; resuming a junit run is not supported")]
    ResumeUnsupported { dir: Utf8PathBuf },

    /// Neither a consolidated report nor a fragment directory exists.
    #[error("no results found in `{dir}`")]
    NoResults { dir: Utf8PathBuf },

    /// Reading the report file failed.
    #[error("error reading report `{path}`")]
    Read {
        path: Utf8PathBuf,
        #[source]
        error: io::Error,
    },

    /// The report is not well-formed XML.
    #[error("error parsing report `{path}`")]
    Parse {
        path: Utf8PathBuf,
        #[source]
        error: XmlError,
    },

    /// The report has no root testsuite to read entries from.
    #[error("report `{path}` has no root testsuite")]
    MissingSuite { path: Utf8PathBuf },

    /// A required attribute is missing from an element.
    #[error("element `{element}` in `{path}` is missing the `{attribute}` attribute")]
    MissingAttribute {
        path: Utf8PathBuf,
        element: String,
        attribute: &'static str,
    },

    /// A status attribute holds a token outside the outcome enumeration.
    #[error("invalid status in `{path}`")]
    UnknownOutcome {
        path: Utf8PathBuf,
        #[source]
        error: UnknownOutcome,
    },

    /// A time attribute is present but not a number.
    #[error("invalid time attribute `{value}` in `{path}`")]
    InvalidTime { path: Utf8PathBuf, value: String },

    /// A testsuite nested beneath the root testsuite contains another
    /// testsuite; reports are limited to two levels.
    #[error("testsuite `{name}` in `{path}` contains a nested testsuite; reports are limited to two levels")]
    NestedSuite { path: Utf8PathBuf, name: String },

    /// A case or suite name can't be mapped back to a hierarchical name.
    #[error(transparent)]
    FlatName(#[from] FlatNameError),
}

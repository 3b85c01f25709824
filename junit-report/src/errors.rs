// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use thiserror::Error;

/// An error that occurs while parsing a [`Report`](crate::Report).
///
/// Returned by [`Report::parse`](crate::Report::parse).
#[derive(Debug, Error)]
#[error("error parsing JUnit report at byte {position}")]
pub struct ParseError {
    position: u64,
    #[source]
    kind: ParseErrorKind,
}

impl ParseError {
    pub(crate) fn new(position: u64, kind: ParseErrorKind) -> Self {
        Self { position, kind }
    }

    /// Returns the byte offset into the document at which the error was detected.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Returns the kind of error that occurred.
    pub fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }
}

/// The kind of error that occurred while parsing a report.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseErrorKind {
    /// The document is not well-formed XML.
    #[error("malformed XML")]
    Xml(#[from] quick_xml::Error),

    /// Character data or an attribute value was not valid UTF-8.
    #[error("character data is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The document does not contain any element.
    #[error("document has no root element (expected `testsuites`)")]
    MissingRoot,

    /// The root element is not `testsuites`.
    #[error("expected root element `testsuites`, found `{found}`")]
    UnexpectedRoot {
        /// The name of the root element that was found.
        found: String,
    },

    /// The document ended while an element was still open.
    #[error("document ended before `{element}` was closed")]
    UnexpectedEof {
        /// The innermost element that was still open.
        element: &'static str,
    },
}

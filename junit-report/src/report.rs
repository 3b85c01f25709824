// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{ParseError, deserialize::deserialize_report};
use indexmap::map::IndexMap;
use std::str::FromStr;

/// The root element of a JUnit report.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// The name of this report, if set on the `testsuites` element.
    pub name: Option<String>,

    /// The test suites contained in this report, in document order.
    pub testsuites: Vec<Testsuite>,
}

impl Report {
    /// Creates a new, empty `Report`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a report from raw XML bytes.
    ///
    /// The document must be well-formed XML with a `testsuites` root element. Unknown elements
    /// and attributes are skipped.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        deserialize_report(bytes)
    }

    /// Adds a testsuite to this report.
    pub fn add_testsuite(&mut self, testsuite: Testsuite) -> &mut Self {
        self.testsuites.push(testsuite);
        self
    }

    /// Returns the total number of testcases across all testsuites.
    pub fn testcase_count(&self) -> usize {
        self.testsuites.iter().map(|suite| suite.testcases.len()).sum()
    }
}

impl FromStr for Report {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.as_bytes())
    }
}

/// Represents a single testsuite.
///
/// A `Testsuite` groups together several `Testcase` instances.
///
/// The count, time and timestamp attributes are kept as the raw text found in the document. They
/// are informational only, and a report with malformed values still parses.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Testsuite {
    /// The name of this testsuite.
    pub name: String,

    /// The `tests` attribute.
    pub tests: Option<String>,

    /// The `failures` attribute.
    pub failures: Option<String>,

    /// The `errors` attribute.
    pub errors: Option<String>,

    /// The `skipped` attribute.
    pub skipped: Option<String>,

    /// The `time` attribute, typically in seconds.
    pub time: Option<String>,

    /// The `timestamp` attribute.
    pub timestamp: Option<String>,

    /// The testcases that form this testsuite.
    pub testcases: Vec<Testcase>,

    /// Other attributes, such as "hostname" or "package".
    pub extra: IndexMap<String, String>,
}

impl Testsuite {
    /// Creates a new `Testsuite`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Adds a testcase to this testsuite.
    pub fn add_testcase(&mut self, testcase: Testcase) -> &mut Self {
        self.testcases.push(testcase);
        self
    }

    /// Adds several testcases to this testsuite.
    pub fn add_testcases(&mut self, testcases: impl IntoIterator<Item = Testcase>) -> &mut Self {
        self.testcases.extend(testcases);
        self
    }

    /// Returns the `tests` attribute as a number, or `None` if it is absent or malformed.
    pub fn declared_tests(&self) -> Option<usize> {
        parse_count(self.tests.as_deref())
    }

    /// Returns the `failures` attribute as a number, or `None` if it is absent or malformed.
    pub fn declared_failures(&self) -> Option<usize> {
        parse_count(self.failures.as_deref())
    }

    /// Returns the `errors` attribute as a number, or `None` if it is absent or malformed.
    pub fn declared_errors(&self) -> Option<usize> {
        parse_count(self.errors.as_deref())
    }

    /// Returns the `skipped` attribute as a number, or `None` if it is absent or malformed.
    pub fn declared_skipped(&self) -> Option<usize> {
        parse_count(self.skipped.as_deref())
    }
}

fn parse_count(text: Option<&str>) -> Option<usize> {
    text.and_then(|text| text.trim().parse().ok())
}

/// Represents a single testcase.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Testcase {
    /// The name of the testcase.
    pub name: String,

    /// The "classname" of the testcase.
    ///
    /// Typically, this represents the fully qualified path to the test. In other words,
    /// `classname` + `name` together should uniquely identify and locate a test.
    pub classname: Option<String>,

    /// The `time` attribute, as raw text.
    pub time: Option<String>,

    /// The status of this test.
    pub status: TestcaseStatus,

    /// Other attributes set on the testcase, such as "file".
    pub extra: IndexMap<String, String>,
}

impl Testcase {
    /// Creates a new testcase.
    pub fn new(name: impl Into<String>, status: TestcaseStatus) -> Self {
        Self {
            name: name.into(),
            classname: None,
            time: None,
            status,
            extra: IndexMap::new(),
        }
    }

    /// Sets the classname of the test.
    pub fn set_classname(&mut self, classname: impl Into<String>) -> &mut Self {
        self.classname = Some(classname.into());
        self
    }

    /// Sets the time taken for the testcase.
    pub fn set_time(&mut self, time: impl Into<String>) -> &mut Self {
        self.time = Some(time.into());
        self
    }
}

/// Represents the outcome of a testcase.
///
/// A testcase carries at most one `failure`, `error` or `skipped` element. A testcase with none
/// of them passed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TestcaseStatus {
    /// This testcase passed.
    #[default]
    Success,

    /// This testcase failed in an expected way, e.g. an assertion.
    Failure(NonSuccessDetail),

    /// This testcase failed in an unexpected way, e.g. a panic outside of an assertion.
    Error(NonSuccessDetail),

    /// This testcase was not run.
    Skipped {
        /// The skip message.
        message: Option<String>,
    },
}

impl TestcaseStatus {
    /// Creates a new `TestcaseStatus` that represents a successful test.
    pub fn success() -> Self {
        TestcaseStatus::Success
    }

    /// Creates a new `TestcaseStatus` that represents a failed test.
    pub fn failure() -> Self {
        TestcaseStatus::Failure(NonSuccessDetail::default())
    }

    /// Creates a new `TestcaseStatus` that represents an errored test.
    pub fn error() -> Self {
        TestcaseStatus::Error(NonSuccessDetail::default())
    }

    /// Creates a new `TestcaseStatus` that represents a skipped test.
    pub fn skipped() -> Self {
        TestcaseStatus::Skipped { message: None }
    }

    /// Sets the message. No-op if this is a success case.
    pub fn set_message(&mut self, message: impl Into<String>) -> &mut Self {
        let message_mut = match self {
            TestcaseStatus::Success => return self,
            TestcaseStatus::Failure(detail) | TestcaseStatus::Error(detail) => &mut detail.message,
            TestcaseStatus::Skipped { message } => message,
        };
        *message_mut = Some(message.into());
        self
    }

    /// Sets the description (text node). No-op unless this is a failure or an error.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        if let TestcaseStatus::Failure(detail) | TestcaseStatus::Error(detail) = self {
            detail.description = description.into();
        }
        self
    }

    /// Sets the type. No-op unless this is a failure or an error.
    pub fn set_type(&mut self, ty: impl Into<String>) -> &mut Self {
        if let TestcaseStatus::Failure(detail) | TestcaseStatus::Error(detail) = self {
            detail.ty = Some(ty.into());
        }
        self
    }

    /// Returns the precedence of this status when a document specifies several outcome elements
    /// for one testcase. Higher wins.
    pub(crate) fn precedence(&self) -> u8 {
        match self {
            TestcaseStatus::Success => 0,
            TestcaseStatus::Skipped { .. } => 1,
            TestcaseStatus::Error(_) => 2,
            TestcaseStatus::Failure(_) => 3,
        }
    }
}

/// The contents of a `failure` or `error` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NonSuccessDetail {
    /// The failure message.
    pub message: Option<String>,

    /// The "type" of failure that occurred.
    pub ty: Option<String>,

    /// The description of the failure.
    ///
    /// This is read from the text and CDATA nodes of the element. Whitespace is kept, but line
    /// endings are normalized to `\n`.
    pub description: String,
}

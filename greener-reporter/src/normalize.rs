// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Normalization of JUnit testcases into outcome records.
//!
//! Each testcase in a [`Report`] becomes exactly one [`NormalizedRecord`], in document order:
//! suites first, then testcases within each suite.

use junit_report::{NonSuccessDetail, Report, Testcase, TestcaseStatus, Testsuite};
use serde::Serialize;
use std::fmt;

/// The outcome of a test, as understood by the ingress service.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The test passed.
    Pass,

    /// The test failed.
    Fail,

    /// The test errored.
    Error,

    /// The test was skipped.
    Skip,
}

impl OutcomeStatus {
    /// Returns the wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Error => "error",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The normalized outcome of a single testcase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// The name of the testcase.
    pub name: String,

    /// The classname of the testcase, if set.
    pub classname: Option<String>,

    /// The name of the testsuite containing the testcase.
    pub testsuite: String,

    /// The outcome of the testcase.
    pub status: OutcomeStatus,

    /// Output describing the outcome. Empty for passing tests.
    pub output: String,
}

impl NormalizedRecord {
    /// Builds the record for `testcase`, which belongs to `testsuite`.
    pub fn new(testsuite: &Testsuite, testcase: &Testcase) -> Self {
        let (status, output) = match &testcase.status {
            TestcaseStatus::Failure(detail) => (OutcomeStatus::Fail, render("Failure", detail)),
            TestcaseStatus::Error(detail) => (OutcomeStatus::Error, render("Error", detail)),
            TestcaseStatus::Skipped { message } => {
                (OutcomeStatus::Skip, message.clone().unwrap_or_default())
            }
            TestcaseStatus::Success => (OutcomeStatus::Pass, String::new()),
        };

        Self {
            name: testcase.name.clone(),
            classname: testcase.classname.clone(),
            testsuite: testsuite.name.clone(),
            status,
            output,
        }
    }
}

fn render(label: &str, detail: &NonSuccessDetail) -> String {
    format!(
        "{label}: {}\n{}",
        detail.message.as_deref().unwrap_or_default(),
        detail.description
    )
}

/// Produces one record per testcase in `report`, in document order.
pub fn normalize(report: &Report) -> Vec<NormalizedRecord> {
    report
        .testsuites
        .iter()
        .flat_map(|testsuite| {
            testsuite
                .testcases
                .iter()
                .map(move |testcase| NormalizedRecord::new(testsuite, testcase))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_strategy::proptest;

    fn record(
        testsuite: &str,
        name: &str,
        status: OutcomeStatus,
        output: &str,
    ) -> NormalizedRecord {
        NormalizedRecord {
            name: name.to_owned(),
            classname: None,
            testsuite: testsuite.to_owned(),
            status,
            output: output.to_owned(),
        }
    }

    #[test]
    fn pass_and_fail() {
        let mut testsuite = Testsuite::new("pkg");
        let mut failure = TestcaseStatus::failure();
        failure
            .set_message("assert failed")
            .set_description("got 1 want 2");
        testsuite.add_testcases([
            Testcase::new("TestA", TestcaseStatus::success()),
            Testcase::new("TestB", failure),
        ]);
        let mut report = Report::new();
        report.add_testsuite(testsuite);

        assert_eq!(
            normalize(&report),
            vec![
                record("pkg", "TestA", OutcomeStatus::Pass, ""),
                record(
                    "pkg",
                    "TestB",
                    OutcomeStatus::Fail,
                    "Failure: assert failed\ngot 1 want 2"
                ),
            ]
        );
    }

    #[test]
    fn error_and_skip() {
        let mut error = TestcaseStatus::error();
        error.set_message("panicked").set_description("at src/lib.rs:3");
        let mut skipped = TestcaseStatus::skipped();
        skipped.set_message("needs network");

        let mut testcase = Testcase::new("errors", error);
        testcase.set_classname("crate::module");
        let mut testsuite = Testsuite::new("suite");
        testsuite.add_testcases([
            testcase,
            Testcase::new("skips", skipped),
            Testcase::new("skips-silently", TestcaseStatus::skipped()),
            Testcase::new("fails-silently", TestcaseStatus::failure()),
        ]);
        let mut report = Report::new();
        report.add_testsuite(testsuite);

        let records = normalize(&report);
        assert_eq!(
            records[0],
            NormalizedRecord {
                name: "errors".to_owned(),
                classname: Some("crate::module".to_owned()),
                testsuite: "suite".to_owned(),
                status: OutcomeStatus::Error,
                output: "Error: panicked\nat src/lib.rs:3".to_owned(),
            }
        );
        assert_eq!(
            records[1],
            record("suite", "skips", OutcomeStatus::Skip, "needs network")
        );
        assert_eq!(
            records[2],
            record("suite", "skips-silently", OutcomeStatus::Skip, "")
        );
        assert_eq!(
            records[3],
            record("suite", "fails-silently", OutcomeStatus::Fail, "Failure: \n")
        );
    }

    #[test]
    fn output_is_not_trimmed() {
        let mut failure = TestcaseStatus::failure();
        failure
            .set_message("  padded  ")
            .set_description("\n\tindented body\n");
        let mut testsuite = Testsuite::new("s");
        testsuite.add_testcase(Testcase::new("t", failure));
        let mut report = Report::new();
        report.add_testsuite(testsuite);

        assert_eq!(
            normalize(&report)[0].output,
            "Failure:   padded  \n\n\tindented body\n"
        );
    }

    #[test]
    fn empty_report() {
        let mut report = Report::new();
        report.add_testsuite(Testsuite::new("empty"));
        assert_eq!(normalize(&report), vec![]);
        assert_eq!(normalize(&Report::new()), vec![]);
    }

    #[test]
    fn status_wire_names() {
        for (status, name) in [
            (OutcomeStatus::Pass, "pass"),
            (OutcomeStatus::Fail, "fail"),
            (OutcomeStatus::Error, "error"),
            (OutcomeStatus::Skip, "skip"),
        ] {
            assert_eq!(status.to_string(), name);
            assert_eq!(
                serde_json::to_value(status).expect("status serializes"),
                serde_json::Value::String(name.to_owned())
            );
        }
    }

    fn status_strategy() -> impl Strategy<Value = TestcaseStatus> {
        prop_oneof![
            Just(TestcaseStatus::success()),
            Just(TestcaseStatus::failure()),
            Just(TestcaseStatus::error()),
            Just(TestcaseStatus::skipped()),
        ]
    }

    fn report_strategy() -> impl Strategy<Value = Report> {
        let testsuite = (
            "[a-z]{1,8}",
            prop::collection::vec(("[a-zA-Z_]{1,12}", status_strategy()), 0..8),
        )
            .prop_map(|(name, testcases)| {
                let mut testsuite = Testsuite::new(name);
                testsuite.add_testcases(
                    testcases
                        .into_iter()
                        .map(|(name, status)| Testcase::new(name, status)),
                );
                testsuite
            });
        prop::collection::vec(testsuite, 0..6).prop_map(|testsuites| {
            let mut report = Report::new();
            for testsuite in testsuites {
                report.add_testsuite(testsuite);
            }
            report
        })
    }

    #[proptest(cases = 64)]
    fn records_follow_document_order(#[strategy(report_strategy())] report: Report) {
        let records = normalize(&report);
        prop_assert_eq!(records.len(), report.testcase_count());

        let expected: Vec<_> = report
            .testsuites
            .iter()
            .flat_map(|testsuite| {
                testsuite
                    .testcases
                    .iter()
                    .map(move |testcase| (testsuite.name.as_str(), testcase.name.as_str()))
            })
            .collect();
        let actual: Vec<_> = records
            .iter()
            .map(|record| (record.testsuite.as_str(), record.name.as_str()))
            .collect();
        prop_assert_eq!(actual, expected);
    }
}

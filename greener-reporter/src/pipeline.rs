// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The end-to-end reporting pipeline.
//!
//! A run reads the report, parses it, opens a session, normalizes the testcases and submits them.
//! The first failure stops the run. A session that was opened before a submission failure is left
//! as is on the service.

use crate::{
    errors::PipelineError,
    ingress::{IngressClient, IngressTransport},
    input::InputSource,
    normalize::normalize,
    session::SessionConfig,
};
use junit_report::Report;
use std::io::{self, Read};

/// Everything a run needs apart from the client.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Where to read the report from.
    pub input: InputSource,

    /// The session to open.
    pub session: SessionConfig,
}

/// What a successful run did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineSummary {
    /// The session ID assigned by the service.
    pub session_id: String,

    /// The number of testsuites in the report.
    pub testsuites: usize,

    /// The number of test results submitted.
    pub submitted: usize,
}

/// A single reporting run.
#[derive(Debug)]
pub struct Pipeline<'a, T> {
    config: &'a PipelineConfig,
    client: &'a IngressClient<T>,
}

impl<'a, T: IngressTransport> Pipeline<'a, T> {
    /// Creates a new pipeline.
    pub fn new(config: &'a PipelineConfig, client: &'a IngressClient<T>) -> Self {
        Self { config, client }
    }

    /// Runs the pipeline to completion, reading standard input if the config asks for it.
    pub fn run(&self) -> Result<PipelineSummary, PipelineError> {
        self.run_with_stdin(io::stdin().lock())
    }

    pub(crate) fn run_with_stdin(&self, stdin: impl Read) -> Result<PipelineSummary, PipelineError> {
        let input = &self.config.input;
        let bytes = input.read_bytes_with_stdin(stdin)?;
        tracing::debug!("read {} bytes from {}", bytes.len(), input);

        let report = Report::parse(&bytes).map_err(|err| PipelineError::Parse {
            input: input.clone(),
            err,
        })?;
        for testsuite in &report.testsuites {
            tracing::debug!(
                "testsuite {}: {} testcases (declared tests={}, failures={}, errors={}, skipped={})",
                testsuite.name,
                testsuite.testcases.len(),
                display_count(testsuite.declared_tests()),
                display_count(testsuite.declared_failures()),
                display_count(testsuite.declared_errors()),
                display_count(testsuite.declared_skipped()),
            );
        }

        let session = self.client.open_session(&self.config.session)?;

        let records = normalize(&report);
        let result = self
            .client
            .submit(&session, &records)
            .map_err(|err| PipelineError::Submission {
                session_id: session.id().to_owned(),
                err,
            })?;

        Ok(PipelineSummary {
            session_id: session.id().to_owned(),
            testsuites: report.testsuites.len(),
            submitted: result.submitted,
        })
    }
}

fn display_count(count: Option<usize>) -> String {
    match count {
        Some(count) => count.to_string(),
        None => "-".to_owned(),
    }
}

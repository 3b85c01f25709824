// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Exit codes returned by the reporter.

use crate::errors::{PipelineError, PipelineStage};

/// Documented exit codes for `greener-reporter-junitxml` failures.
///
/// Unknown or unexpected failures always result in exit code 1.
pub enum ReporterExitCode {}

impl ReporterExitCode {
    /// The report was submitted, or there was nothing to submit.
    pub const OK: i32 = 0;

    /// A required setting was missing or invalid.
    pub const SETUP_ERROR: i32 = 96;

    /// The test report could not be read.
    pub const INPUT_READ_FAILED: i32 = 97;

    /// The test report could not be parsed.
    pub const REPORT_PARSE_FAILED: i32 = 98;

    /// The session could not be created.
    pub const SESSION_CREATE_FAILED: i32 = 99;

    /// Test results could not be submitted.
    pub const SUBMISSION_FAILED: i32 = 100;

    /// Returns the exit code for a pipeline error.
    pub fn for_pipeline_error(error: &PipelineError) -> i32 {
        match error.stage() {
            PipelineStage::Input => Self::INPUT_READ_FAILED,
            PipelineStage::Parse => Self::REPORT_PARSE_FAILED,
            PipelineStage::Session => Self::SESSION_CREATE_FAILED,
            PipelineStage::Submission => Self::SUBMISSION_FAILED,
        }
    }
}

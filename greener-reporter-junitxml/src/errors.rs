// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::output::{NO_HEADING_TARGET, StderrStyles};
use greener_reporter::{
    errors::{BaggageParseError, PipelineError},
    exit_codes::ReporterExitCode,
};
use owo_colors::OwoColorize;
use std::error::Error;
use thiserror::Error;

pub(crate) type Result<T, E = ExpectedError> = std::result::Result<T, E>;

// The #[error()] strings are placeholders. Errors are meant to be printed with display_to_stderr,
// which colorizes them and prints the full chain of causes.

/// A failure that the reporter knows how to explain.
#[derive(Debug, Error)]
#[doc(hidden)]
pub enum ExpectedError {
    #[error("invalid session baggage")]
    InvalidBaggage {
        #[source]
        err: BaggageParseError,
    },
    #[error("reporting failed")]
    PipelineFailed {
        #[source]
        err: PipelineError,
    },
}

impl ExpectedError {
    pub(crate) fn invalid_baggage(err: BaggageParseError) -> Self {
        Self::InvalidBaggage { err }
    }

    pub(crate) fn pipeline_failed(err: PipelineError) -> Self {
        Self::PipelineFailed { err }
    }

    /// Returns the exit code for the process.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Self::InvalidBaggage { .. } => ReporterExitCode::SETUP_ERROR,
            Self::PipelineFailed { err } => ReporterExitCode::for_pipeline_error(err),
        }
    }

    /// Displays this error to stderr.
    pub fn display_to_stderr(&self, styles: &StderrStyles) {
        let mut next_error = match self {
            Self::InvalidBaggage { err } => {
                tracing::error!(
                    "invalid value for {}",
                    "--session-baggage".style(styles.bold)
                );
                Some(err as &dyn Error)
            }
            Self::PipelineFailed { err } => {
                tracing::error!("{}", err);
                err.source()
            }
        };

        while let Some(err) = next_error {
            tracing::error!(target: NO_HEADING_TARGET, "\nCaused by:\n  {}", err);
            next_error = err.source();
        }
    }
}

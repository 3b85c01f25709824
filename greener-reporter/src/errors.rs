// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Errors produced by greener-reporter.

use crate::input::InputSource;
use http::StatusCode;
use junit_report::ParseError;
use std::{error::Error, fmt};
use thiserror::Error;

/// An error that occurred while reading the test report.
#[derive(Debug, Error)]
#[error("failed to read test report from {input}")]
pub struct InputError {
    input: InputSource,
    #[source]
    err: std::io::Error,
}

impl InputError {
    pub(crate) fn new(input: InputSource, err: std::io::Error) -> Self {
        Self { input, err }
    }

    /// Returns the source that could not be read.
    pub fn input(&self) -> &InputSource {
        &self.input
    }
}

/// An error that occurred while parsing the `--session-baggage` value.
#[derive(Debug, Error)]
pub enum BaggageParseError {
    /// The value is not valid JSON.
    #[error("session baggage is not valid JSON")]
    InvalidJson(#[source] serde_json::Error),

    /// The value is valid JSON, but not an object.
    #[error("session baggage must be a JSON object, found {found}")]
    NotAnObject {
        /// The kind of JSON value that was found.
        found: &'static str,
    },
}

/// An error sending a request to the ingress service, or reading its response.
///
/// Covers connection, TLS, timeout and I/O failures. A response with an unexpected HTTP status is
/// not a transport error.
#[derive(Debug, Error)]
#[error("error communicating with `{url}`")]
pub struct TransportError {
    url: String,
    #[source]
    err: Box<dyn Error + Send + Sync>,
}

impl TransportError {
    /// Creates a new `TransportError` for a request to `url`.
    pub fn new(url: impl Into<String>, err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self {
            url: url.into(),
            err: err.into(),
        }
    }
}

/// An error that occurred while creating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session request could not be serialized.
    #[error("failed to serialize session request")]
    Serialize(#[source] serde_json::Error),

    /// The request could not be sent or the response could not be read.
    #[error("failed to send session request")]
    Transport(#[source] TransportError),

    /// The service responded with a status other than `201 Created`.
    #[error("create session failed: status={status} body={body}")]
    Rejected {
        /// The HTTP status of the response.
        status: StatusCode,

        /// The response body, decoded lossily.
        body: String,
    },

    /// The service responded with `201 Created`, but the body did not contain a session ID.
    #[error("failed to decode session response: status={status} body={body}")]
    InvalidResponse {
        /// The HTTP status of the response.
        status: StatusCode,

        /// The response body, decoded lossily.
        body: String,

        /// The decode error.
        #[source]
        err: serde_json::Error,
    },
}

impl SessionError {
    /// Returns the HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } | Self::InvalidResponse { status, .. } => Some(*status),
            Self::Serialize(_) | Self::Transport(_) => None,
        }
    }

    /// Returns the body of the response, if one was received.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } | Self::InvalidResponse { body, .. } => Some(body),
            Self::Serialize(_) | Self::Transport(_) => None,
        }
    }
}

/// An error that occurred while submitting test results.
#[derive(Debug, Error)]
pub enum SubmissionError {
    /// The test results could not be serialized.
    #[error("failed to serialize test results")]
    Serialize(#[source] serde_json::Error),

    /// The request could not be sent or the response could not be read.
    #[error("failed to send test results")]
    Transport(#[source] TransportError),

    /// The service responded with a status other than `201 Created`.
    #[error("submit testcases failed: status={status} body={body}")]
    Rejected {
        /// The HTTP status of the response.
        status: StatusCode,

        /// The response body, decoded lossily.
        body: String,
    },
}

impl SubmissionError {
    /// Returns the HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Serialize(_) | Self::Transport(_) => None,
        }
    }

    /// Returns the body of the response, if one was received.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Rejected { body, .. } => Some(body),
            Self::Serialize(_) | Self::Transport(_) => None,
        }
    }
}

/// The stage of the pipeline in which an error occurred.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    /// Reading the test report.
    Input,

    /// Parsing the test report.
    Parse,

    /// Creating the session.
    Session,

    /// Submitting test results.
    Submission,
}

impl PipelineStage {
    /// Returns a short, lowercase label for this stage.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Parse => "parse",
            Self::Session => "session",
            Self::Submission => "submission",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by [`Pipeline::run`](crate::pipeline::Pipeline::run).
///
/// The pipeline stops at the first error, so exactly one stage is reported.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The test report could not be read.
    #[error("[{}] read test report", PipelineStage::Input)]
    Input(#[from] InputError),

    /// The test report could not be parsed.
    #[error("[{}] parse test report from {input}", PipelineStage::Parse)]
    Parse {
        /// The source the report was read from.
        input: InputSource,

        /// The parse error.
        #[source]
        err: ParseError,
    },

    /// The session could not be created.
    #[error("[{}] create session", PipelineStage::Session)]
    Session(#[from] SessionError),

    /// The test results could not be submitted.
    #[error("[{}] submit results to session `{session_id}`", PipelineStage::Submission)]
    Submission {
        /// The ID of the session that was created before submission failed.
        session_id: String,

        /// The submission error.
        #[source]
        err: SubmissionError,
    },
}

impl PipelineError {
    /// Returns the stage that produced this error.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Input(_) => PipelineStage::Input,
            Self::Parse { .. } => PipelineStage::Parse,
            Self::Session(_) => PipelineStage::Session,
            Self::Submission { .. } => PipelineStage::Submission,
        }
    }
}

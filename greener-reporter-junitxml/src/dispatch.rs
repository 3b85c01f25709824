// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    ExpectedError,
    errors::Result,
    output::{OutputContext, OutputOpts, clap_styles},
};
use clap::{Args, Parser, builder::NonEmptyStringValueParser};
use greener_reporter::{
    exit_codes::ReporterExitCode,
    ingress::{IngressClient, UreqTransport},
    input::InputSource,
    pipeline::{Pipeline, PipelineConfig},
    session::{SessionConfig, parse_baggage, parse_labels},
};
use std::time::Duration;

/// Send a JUnit XML test report to a Greener ingress service.
///
/// A new session is created for the report, and every test case in the report is submitted
/// against it.
#[derive(Debug, Parser)]
#[command(version, styles = clap_styles::style())]
pub struct ReporterApp {
    /// Path to the JUnit XML report, or `-` to read standard input
    #[arg(long, short = 'f', value_name = "PATH")]
    xml_file: InputSource,

    #[clap(flatten)]
    ingress: IngressOpts,

    #[clap(flatten)]
    session: SessionOpts,

    #[clap(flatten)]
    output: OutputOpts,
}

impl ReporterApp {
    /// Initializes logging and color output.
    pub fn init_output(&self) -> OutputContext {
        self.output.init()
    }

    /// Executes the app, returning the process exit code on success.
    pub fn exec(self) -> Result<i32> {
        let config = PipelineConfig {
            input: self.xml_file,
            session: self.session.to_config()?,
        };
        let client = self.ingress.to_client();
        tracing::debug!(
            "reporting to {} with timeout {}",
            client.endpoint(),
            self.ingress
                .timeout
                .map_or_else(|| "none".to_owned(), |t| humantime::format_duration(t).to_string()),
        );

        let summary = Pipeline::new(&config, &client)
            .run()
            .map_err(ExpectedError::pipeline_failed)?;
        tracing::debug!(
            "session {}: {} testsuites, {} test results",
            summary.session_id,
            summary.testsuites,
            summary.submitted,
        );

        Ok(ReporterExitCode::OK)
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Ingress options")]
struct IngressOpts {
    /// Base URL of the ingress service
    #[arg(
        long,
        env = "GREENER_INGRESS_ENDPOINT",
        value_name = "URL",
        value_parser = NonEmptyStringValueParser::new(),
    )]
    ingress_endpoint: String,

    /// API key sent with every request
    #[arg(
        long,
        env = "GREENER_INGRESS_API_KEY",
        value_name = "KEY",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new(),
    )]
    ingress_api_key: String,

    /// Timeout for each request, for example `30s` [default: no timeout]
    #[arg(
        long,
        env = "GREENER_TIMEOUT",
        value_name = "DURATION",
        value_parser = non_zero_duration,
    )]
    timeout: Option<Duration>,
}

impl IngressOpts {
    fn to_client(&self) -> IngressClient<UreqTransport> {
        IngressClient::new(
            &self.ingress_endpoint,
            self.ingress_api_key.clone(),
            UreqTransport::new(self.timeout),
        )
    }
}

#[derive(Debug, Args)]
#[command(next_help_heading = "Session options")]
struct SessionOpts {
    /// Session ID to request [default: assigned by the service]
    #[arg(long, env = "GREENER_SESSION_ID", value_name = "ID")]
    session_id: Option<String>,

    /// Human-readable description of the session
    #[arg(long, env = "GREENER_SESSION_DESCRIPTION", value_name = "TEXT")]
    session_description: Option<String>,

    /// Comma-separated `key` or `key=value` labels
    #[arg(long, env = "GREENER_SESSION_LABELS", value_name = "LABELS")]
    session_labels: Option<String>,

    /// Arbitrary metadata for the session, as a JSON object
    #[arg(long, env = "GREENER_SESSION_BAGGAGE", value_name = "JSON")]
    session_baggage: Option<String>,
}

impl SessionOpts {
    fn to_config(&self) -> Result<SessionConfig> {
        let mut config = SessionConfig::new();
        if let Some(id) = &self.session_id {
            config.set_id(id.as_str());
        }
        if let Some(description) = &self.session_description {
            config.set_description(description.as_str());
        }
        if let Some(labels) = &self.session_labels {
            config.set_labels(parse_labels(labels));
        }
        if let Some(baggage) = &self.session_baggage {
            config.set_baggage(parse_baggage(baggage).map_err(ExpectedError::invalid_baggage)?);
        }
        Ok(config)
    }
}

fn non_zero_duration(input: &str) -> std::result::Result<Duration, String> {
    let duration = humantime::parse_duration(input).map_err(|error| error.to_string())?;
    if duration.is_zero() {
        Err("duration must be non-zero".to_string())
    } else {
        Ok(duration)
    }
}

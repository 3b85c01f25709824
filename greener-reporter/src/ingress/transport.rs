// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::errors::TransportError;
use debug_ignore::DebugIgnore;
use http::StatusCode;
use std::time::Duration;

/// The header carrying the ingress API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// A response received from the ingress service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngressResponse {
    /// The HTTP status.
    pub status: StatusCode,

    /// The response body, decoded lossily as UTF-8.
    pub body: String,
}

/// Sends requests to the ingress service.
///
/// Every status code, including error statuses, is returned as an [`IngressResponse`]. Only
/// failures to send the request or read the response are errors.
pub trait IngressTransport {
    /// Sends `body` as JSON to `url` with a `POST` request authenticated by `api_key`.
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &[u8],
    ) -> Result<IngressResponse, TransportError>;
}

impl<T: IngressTransport + ?Sized> IngressTransport for &T {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &[u8],
    ) -> Result<IngressResponse, TransportError> {
        (**self).post_json(url, api_key, body)
    }
}

/// An [`IngressTransport`] backed by a [`ureq::Agent`].
///
/// The agent's connection pool is reused across requests.
#[derive(Debug)]
pub struct UreqTransport {
    agent: DebugIgnore<ureq::Agent>,
}

impl UreqTransport {
    /// Creates a new transport.
    ///
    /// If `timeout` is set, it bounds each request from connection to the end of the response
    /// body.
    pub fn new(timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build();
        Self {
            agent: DebugIgnore(ureq::Agent::new_with_config(config)),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(None)
    }
}

impl IngressTransport for UreqTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &[u8],
    ) -> Result<IngressResponse, TransportError> {
        let mut response = self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key)
            .send(body)
            .map_err(|err| TransportError::new(url, err))?;

        let status = response.status();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|err| TransportError::new(url, err))?;

        Ok(IngressResponse {
            status,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

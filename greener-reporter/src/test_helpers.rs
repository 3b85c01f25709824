// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{
    errors::TransportError,
    ingress::{IngressResponse, IngressTransport},
};
use http::StatusCode;
use std::{cell::RefCell, collections::VecDeque};

/// A request captured by [`RecordingTransport`].
#[derive(Clone, Debug)]
pub(crate) struct RecordedRequest {
    pub(crate) url: String,
    pub(crate) api_key: String,
    pub(crate) body: Vec<u8>,
}

impl RecordedRequest {
    pub(crate) fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

/// A transport that records requests and replays canned responses in order.
///
/// Panics if more requests are sent than responses were provided.
#[derive(Debug, Default)]
pub(crate) struct RecordingTransport {
    responses: RefCell<VecDeque<Result<IngressResponse, TransportError>>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl RecordingTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_response(self, status: u16, body: &str) -> Self {
        let status = StatusCode::from_u16(status).expect("status code is valid");
        self.responses.borrow_mut().push_back(Ok(IngressResponse {
            status,
            body: body.to_owned(),
        }));
        self
    }

    pub(crate) fn with_error(self, error: TransportError) -> Self {
        self.responses.borrow_mut().push_back(Err(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl IngressTransport for RecordingTransport {
    fn post_json(
        &self,
        url: &str,
        api_key: &str,
        body: &[u8],
    ) -> Result<IngressResponse, TransportError> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_owned(),
            api_key: api_key.to_owned(),
            body: body.to_vec(),
        });
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request to {url}"))
    }
}

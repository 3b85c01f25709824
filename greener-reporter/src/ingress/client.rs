// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{IngressResponse, IngressTransport};
use crate::{
    errors::{SessionError, SubmissionError},
    normalize::{NormalizedRecord, OutcomeStatus},
    session::{Baggage, Label, SessionConfig, SessionHandle},
};
use debug_ignore::DebugIgnore;
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// The path used to create sessions, relative to the endpoint.
pub const SESSIONS_PATH: &str = "/api/v1/ingress/sessions";

/// The path used to submit testcases, relative to the endpoint.
pub const TESTCASES_PATH: &str = "/api/v1/ingress/testcases";

/// A client for the ingress service.
///
/// The client is stateless: the session it opens is returned to the caller, who passes it back
/// in to [`Self::submit`].
#[derive(Debug)]
pub struct IngressClient<T> {
    endpoint: String,
    api_key: DebugIgnore<String>,
    transport: T,
}

impl<T: IngressTransport> IngressClient<T> {
    /// Creates a new client for the service at `endpoint`.
    ///
    /// Trailing slashes are removed from `endpoint`.
    pub fn new(endpoint: &str, api_key: impl Into<String>, transport: T) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_owned(),
            api_key: DebugIgnore(api_key.into()),
            transport,
        }
    }

    /// Returns the endpoint, without any trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns the transport used by this client.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Creates a session with a single request.
    ///
    /// The ID in the response is authoritative, even if `config` requested a specific ID.
    pub fn open_session(&self, config: &SessionConfig) -> Result<SessionHandle, SessionError> {
        let labels: Vec<_> = config.labels().iter().map(LabelBody::new).collect();
        let request = SessionRequestBody {
            id: config.id(),
            description: config.description(),
            labels,
            baggage: config.baggage().filter(|baggage| !baggage.is_empty()),
        };
        let body = serde_json::to_vec(&request).map_err(SessionError::Serialize)?;

        let url = self.url(SESSIONS_PATH);
        let IngressResponse { status, body } = self
            .transport
            .post_json(&url, &self.api_key, &body)
            .map_err(SessionError::Transport)?;
        if status != StatusCode::CREATED {
            return Err(SessionError::Rejected { status, body });
        }

        let response: SessionResponseBody = match serde_json::from_str(&body) {
            Ok(response) => response,
            Err(err) => return Err(SessionError::InvalidResponse { status, body, err }),
        };

        if let Some(requested) = config.id()
            && requested != response.id
        {
            tracing::debug!(
                "service assigned session ID {} instead of requested ID {}",
                response.id,
                requested,
            );
        }
        tracing::info!("created session: {}", response.id);
        Ok(SessionHandle::new(response.id))
    }

    /// Submits all records against `session` with a single request.
    ///
    /// If `records` is empty, no request is sent.
    pub fn submit(
        &self,
        session: &SessionHandle,
        records: &[NormalizedRecord],
    ) -> Result<SubmitResult, SubmissionError> {
        if records.is_empty() {
            tracing::info!("no test results to submit");
            return Ok(SubmitResult { submitted: 0 });
        }

        let request = TestcasesRequestBody {
            testcases: records
                .iter()
                .map(|record| TestcaseBody::new(session.id(), record))
                .collect(),
        };
        let body = serde_json::to_vec(&request).map_err(SubmissionError::Serialize)?;

        let url = self.url(TESTCASES_PATH);
        let IngressResponse { status, body } = self
            .transport
            .post_json(&url, &self.api_key, &body)
            .map_err(SubmissionError::Transport)?;
        if status != StatusCode::CREATED {
            return Err(SubmissionError::Rejected { status, body });
        }

        tracing::info!("submitted {} test results", records.len());
        Ok(SubmitResult {
            submitted: records.len(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }
}

/// The result of a successful [`IngressClient::submit`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SubmitResult {
    /// The number of records accepted by the service.
    pub submitted: usize,
}

// ---
// Wire types
// ---

#[derive(Serialize)]
struct SessionRequestBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    description: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    labels: Vec<LabelBody<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    baggage: Option<&'a Baggage>,
}

#[derive(Serialize)]
struct LabelBody<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'a str>,
}

impl<'a> LabelBody<'a> {
    fn new(label: &'a Label) -> Self {
        Self {
            key: &label.key,
            // The service treats an empty value the same as no value.
            value: label.value.as_deref().filter(|value| !value.is_empty()),
        }
    }
}

#[derive(Deserialize)]
struct SessionResponseBody {
    #[serde(deserialize_with = "deserialize_session_id")]
    id: String,
}

fn deserialize_session_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let id = String::deserialize(deserializer)?;
    if id.is_empty() {
        return Err(serde::de::Error::custom("session ID is empty"));
    }
    Ok(id)
}

#[derive(Serialize)]
struct TestcasesRequestBody<'a> {
    testcases: Vec<TestcaseBody<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestcaseBody<'a> {
    session_id: &'a str,
    testcase_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    testcase_classname: Option<&'a str>,
    #[serde(skip_serializing_if = "str::is_empty")]
    testsuite: &'a str,
    status: OutcomeStatus,
    #[serde(skip_serializing_if = "str::is_empty")]
    output: &'a str,
}

impl<'a> TestcaseBody<'a> {
    fn new(session_id: &'a str, record: &'a NormalizedRecord) -> Self {
        Self {
            session_id,
            testcase_name: &record.name,
            testcase_classname: record
                .classname
                .as_deref()
                .filter(|classname| !classname.is_empty()),
            testsuite: &record.testsuite,
            status: record.status,
            output: &record.output,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::TransportError,
        session::parse_baggage,
        test_helpers::RecordingTransport,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use test_case::test_case;

    fn client(transport: RecordingTransport) -> IngressClient<RecordingTransport> {
        IngressClient::new("https://greener.example.com/", "secret-key", transport)
    }

    fn record(name: &str, status: OutcomeStatus, output: &str) -> NormalizedRecord {
        NormalizedRecord {
            name: name.to_owned(),
            classname: None,
            testsuite: "pkg".to_owned(),
            status,
            output: output.to_owned(),
        }
    }

    #[test]
    fn open_session_minimal() {
        let client = client(RecordingTransport::new().with_response(201, r#"{"id":"s-1"}"#));

        let session = client
            .open_session(&SessionConfig::new())
            .expect("session is created");
        assert_eq!(session.id(), "s-1");

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://greener.example.com/api/v1/ingress/sessions"
        );
        assert_eq!(requests[0].api_key, "secret-key");
        assert_eq!(
            requests[0].json(),
            json!({"description": "JUnit XML test report"})
        );
    }

    #[test]
    fn open_session_full() {
        let client = client(
            RecordingTransport::new().with_response(201, r#"{"id":"server-id","extra":true}"#),
        );
        let mut config = SessionConfig::new();
        config
            .set_id("client-id")
            .set_description("nightly run")
            .set_labels([
                Label::new("ci"),
                Label::with_value("tag", "value"),
                Label::with_value("env", ""),
            ])
            .set_baggage(parse_baggage(r#"{"commit":"abc123"}"#).expect("baggage is valid"));

        let session = client.open_session(&config).expect("session is created");
        // The ID assigned by the service wins.
        assert_eq!(session.id(), "server-id");

        assert_eq!(
            client.transport().requests()[0].json(),
            json!({
                "id": "client-id",
                "description": "nightly run",
                "labels": [
                    {"key": "ci"},
                    {"key": "tag", "value": "value"},
                    {"key": "env"},
                ],
                "baggage": {"commit": "abc123"},
            })
        );
    }

    #[test]
    fn open_session_omits_empty_baggage() {
        let client = client(RecordingTransport::new().with_response(201, r#"{"id":"s"}"#));
        let mut config = SessionConfig::new();
        config.set_baggage(parse_baggage("{}").expect("baggage is valid"));

        client.open_session(&config).expect("session is created");
        assert_eq!(
            client.transport().requests()[0].json(),
            json!({"description": "JUnit XML test report"})
        );
    }

    #[test]
    fn open_session_rejected() {
        let client = client(RecordingTransport::new().with_response(500, "internal error"));

        let error = client
            .open_session(&SessionConfig::new())
            .expect_err("session creation fails");
        assert!(
            matches!(error, SessionError::Rejected { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(error.response_body(), Some("internal error"));
    }

    #[test]
    fn open_session_success_status_other_than_created() {
        let client = client(RecordingTransport::new().with_response(200, r#"{"id":"s"}"#));

        let error = client
            .open_session(&SessionConfig::new())
            .expect_err("only 201 is accepted");
        assert_eq!(error.status(), Some(StatusCode::OK));
    }

    #[test]
    fn open_session_invalid_response() {
        let client = client(RecordingTransport::new().with_response(201, "<html>"));

        let error = client
            .open_session(&SessionConfig::new())
            .expect_err("response is not JSON");
        assert!(
            matches!(error, SessionError::InvalidResponse { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.response_body(), Some("<html>"));
    }

    #[test_case(r#"{"id":""}"# ; "empty id")]
    #[test_case(r#"{"name":"s"}"# ; "missing id")]
    #[test_case(r#"{"id":7}"# ; "numeric id")]
    fn open_session_without_usable_id(body: &str) {
        let client = client(RecordingTransport::new().with_response(201, body));

        let error = client
            .open_session(&SessionConfig::new())
            .expect_err("no session ID to use");
        assert!(
            matches!(error, SessionError::InvalidResponse { .. }),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.status(), Some(StatusCode::CREATED));
        assert_eq!(error.response_body(), Some(body));
    }

    #[test]
    fn open_session_transport_error() {
        let client = client(RecordingTransport::new().with_error(TransportError::new(
            "https://greener.example.com/api/v1/ingress/sessions",
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
        )));

        let error = client
            .open_session(&SessionConfig::new())
            .expect_err("transport fails");
        assert!(
            matches!(error, SessionError::Transport(_)),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.status(), None);
    }

    #[test]
    fn submit_batch() {
        let client = client(RecordingTransport::new().with_response(201, ""));
        let session = SessionHandle::new("s-1".to_owned());
        let mut with_classname = record("TestC", OutcomeStatus::Skip, "later");
        with_classname.classname = Some("pkg.c".to_owned());
        let mut empty_classname = record("TestD", OutcomeStatus::Pass, "");
        empty_classname.classname = Some(String::new());
        let records = [
            record("TestA", OutcomeStatus::Pass, ""),
            record(
                "TestB",
                OutcomeStatus::Fail,
                "Failure: assert failed\ngot 1 want 2",
            ),
            with_classname,
            empty_classname,
        ];

        let result = client.submit(&session, &records).expect("submission succeeds");
        assert_eq!(result, SubmitResult { submitted: 4 });

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://greener.example.com/api/v1/ingress/testcases"
        );
        assert_eq!(requests[0].api_key, "secret-key");
        assert_eq!(
            requests[0].json(),
            json!({
                "testcases": [
                    {
                        "sessionId": "s-1",
                        "testcaseName": "TestA",
                        "testsuite": "pkg",
                        "status": "pass",
                    },
                    {
                        "sessionId": "s-1",
                        "testcaseName": "TestB",
                        "testsuite": "pkg",
                        "status": "fail",
                        "output": "Failure: assert failed\ngot 1 want 2",
                    },
                    {
                        "sessionId": "s-1",
                        "testcaseName": "TestC",
                        "testcaseClassname": "pkg.c",
                        "testsuite": "pkg",
                        "status": "skip",
                        "output": "later",
                    },
                    {
                        "sessionId": "s-1",
                        "testcaseName": "TestD",
                        "testsuite": "pkg",
                        "status": "pass",
                    },
                ],
            })
        );
    }

    #[test]
    fn submit_empty_sends_nothing() {
        let client = client(RecordingTransport::new());
        let session = SessionHandle::new("s-1".to_owned());

        let result = client.submit(&session, &[]).expect("empty submission succeeds");
        assert_eq!(result, SubmitResult { submitted: 0 });
        assert!(client.transport().requests().is_empty());
    }

    #[test]
    fn submit_rejected() {
        let client = client(RecordingTransport::new().with_response(400, r#"{"error":"bad"}"#));
        let session = SessionHandle::new("s-1".to_owned());

        let error = client
            .submit(&session, &[record("TestA", OutcomeStatus::Pass, "")])
            .expect_err("submission fails");
        assert_eq!(error.status(), Some(StatusCode::BAD_REQUEST));
        assert_eq!(error.response_body(), Some(r#"{"error":"bad"}"#));
    }

    #[test]
    fn submit_transport_error() {
        let client = client(RecordingTransport::new().with_error(TransportError::new(
            "https://greener.example.com/api/v1/ingress/testcases",
            std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"),
        )));
        let session = SessionHandle::new("s-1".to_owned());

        let error = client
            .submit(&session, &[record("TestA", OutcomeStatus::Pass, "")])
            .expect_err("transport fails");
        assert!(
            matches!(error, SubmissionError::Transport(_)),
            "unexpected error: {error:?}"
        );
        assert_eq!(error.status(), None);
        assert_eq!(error.response_body(), None);
        assert_eq!(client.transport().requests().len(), 1);
    }
}

// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session descriptors and the parsers for their command-line forms.

use crate::errors::BaggageParseError;
use serde_json::Value;

/// Opaque metadata attached to a session.
pub type Baggage = serde_json::Map<String, Value>;

/// The description used when none is provided.
pub const DEFAULT_SESSION_DESCRIPTION: &str = "JUnit XML test report";

/// A label attached to a session.
///
/// Keys are not required to be unique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// The label key.
    pub key: String,

    /// The label value, if the label was written as `key=value`.
    pub value: Option<String>,
}

impl Label {
    /// Creates a label without a value.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }

    /// Creates a label with a value.
    pub fn with_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }
}

/// Parses a comma-separated list of `key` or `key=value` labels.
///
/// Tokens are trimmed, blank tokens are dropped, and each token is split on its first `=`.
pub fn parse_labels(input: &str) -> Vec<Label> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match token.split_once('=') {
            Some((key, value)) => Label::with_value(key, value),
            None => Label::new(token),
        })
        .collect()
}

/// Parses session baggage from a JSON object.
///
/// An empty input means no baggage.
pub fn parse_baggage(input: &str) -> Result<Option<Baggage>, BaggageParseError> {
    if input.is_empty() {
        return Ok(None);
    }

    match serde_json::from_str::<Value>(input).map_err(BaggageParseError::InvalidJson)? {
        Value::Object(baggage) => Ok(Some(baggage)),
        other => Err(BaggageParseError::NotAnObject {
            found: json_kind(&other),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Everything needed to open a session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionConfig {
    id: Option<String>,
    description: Option<String>,
    labels: Vec<Label>,
    baggage: Option<Baggage>,
}

impl SessionConfig {
    /// Creates a new `SessionConfig` with a server-assigned ID and the default description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a specific session ID. An empty ID is treated as absent.
    pub fn set_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.id = Some(id.into()).filter(|id: &String| !id.is_empty());
        self
    }

    /// Sets the description. An empty description is replaced with the default.
    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = Some(description.into()).filter(|d: &String| !d.is_empty());
        self
    }

    /// Sets the labels.
    pub fn set_labels(&mut self, labels: impl IntoIterator<Item = Label>) -> &mut Self {
        self.labels = labels.into_iter().collect();
        self
    }

    /// Sets the baggage.
    pub fn set_baggage(&mut self, baggage: impl Into<Option<Baggage>>) -> &mut Self {
        self.baggage = baggage.into();
        self
    }

    /// Returns the requested session ID, if any.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the description, with the default applied.
    pub fn description(&self) -> &str {
        self.description
            .as_deref()
            .unwrap_or(DEFAULT_SESSION_DESCRIPTION)
    }

    /// Returns the labels.
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Returns the baggage, if any.
    pub fn baggage(&self) -> Option<&Baggage> {
        self.baggage.as_ref()
    }
}

/// A session that has been created on the ingress service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionHandle {
    id: String,
}

impl SessionHandle {
    pub(crate) fn new(id: String) -> Self {
        Self { id }
    }

    /// Returns the session ID assigned by the service.
    pub fn id(&self) -> &str {
        &self.id
    }
}

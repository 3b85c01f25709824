// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The client for the Greener ingress service.
//!
//! A run talks to the service twice: [`IngressClient::open_session`] creates a session, and
//! [`IngressClient::submit`] sends every test result against it in a single batch. Requests go
//! through an [`IngressTransport`], which is [`UreqTransport`] outside of tests.

mod client;
mod transport;

pub use client::*;
pub use transport::*;

// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

#![warn(missing_docs)]

//! Core functionality for reporting JUnit XML test results to the Greener ingress service.
//!
//! A run goes through these steps:
//!
//! 1. The report is read from an [`InputSource`](input::InputSource) and parsed with
//!    [`junit_report`].
//! 2. A session is opened with [`IngressClient::open_session`](ingress::IngressClient::open_session).
//! 3. Each testcase is turned into a [`NormalizedRecord`](normalize::NormalizedRecord).
//! 4. All records are submitted in a single batch with
//!    [`IngressClient::submit`](ingress::IngressClient::submit).
//!
//! [`Pipeline`](pipeline::Pipeline) ties these together.

pub mod errors;
pub mod exit_codes;
pub mod ingress;
pub mod input;
pub mod normalize;
pub mod pipeline;
pub mod session;
#[cfg(test)]
mod test_helpers;

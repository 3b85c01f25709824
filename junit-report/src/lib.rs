// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read JUnit reports in Rust.
//!
//! The entry point is [`Report::parse`], which turns the bytes of a JUnit/XUnit XML document into
//! a [`Report`].

mod deserialize;
mod errors;
mod report;

pub use errors::*;
pub use report::*;

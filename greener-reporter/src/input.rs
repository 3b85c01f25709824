// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sources for the test report.

use crate::errors::InputError;
use camino::Utf8PathBuf;
use std::{
    convert::Infallible,
    fmt,
    io::{self, Read},
    str::FromStr,
};

/// Where to read the JUnit XML report from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputSource {
    /// Standard input, selected with [`Self::STDIN_SENTINEL`].
    Stdin,

    /// A file on disk.
    Path(Utf8PathBuf),
}

impl InputSource {
    /// The value that selects standard input instead of a file.
    pub const STDIN_SENTINEL: &'static str = "-";

    /// Reads the entire report into memory.
    pub fn read_bytes(&self) -> Result<Vec<u8>, InputError> {
        self.read_bytes_with_stdin(io::stdin().lock())
    }

    /// Reads the entire report into memory, using `stdin` for [`InputSource::Stdin`].
    pub(crate) fn read_bytes_with_stdin(&self, mut stdin: impl Read) -> Result<Vec<u8>, InputError> {
        match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                stdin
                    .read_to_end(&mut buf)
                    .map_err(|err| InputError::new(self.clone(), err))?;
                Ok(buf)
            }
            Self::Path(path) => {
                std::fs::read(path).map_err(|err| InputError::new(self.clone(), err))
            }
        }
    }
}

impl FromStr for InputSource {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::STDIN_SENTINEL {
            Ok(Self::Stdin)
        } else {
            Ok(Self::Path(s.into()))
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("standard input"),
            Self::Path(path) => write!(f, "`{path}`"),
        }
    }
}

// Copyright (c) The greener-reporter Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deserialize a `Report`.

use crate::{
    NonSuccessDetail, ParseError, ParseErrorKind, Report, Testcase, TestcaseStatus, Testsuite,
};
use indexmap::IndexMap;
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};
use std::borrow::Cow;

static TESTSUITES_TAG: &str = "testsuites";
static TESTSUITE_TAG: &str = "testsuite";
static TESTCASE_TAG: &str = "testcase";
static FAILURE_TAG: &str = "failure";
static ERROR_TAG: &str = "error";
static SKIPPED_TAG: &str = "skipped";

pub(crate) fn deserialize_report(bytes: &[u8]) -> Result<Report, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    // Failure bodies are kept verbatim, so whitespace must not be trimmed.
    reader.config_mut().trim_text(false);

    let mut deserializer = Deserializer { reader };
    deserializer
        .deserialize_report()
        .map_err(|kind| ParseError::new(deserializer.reader.buffer_position(), kind))
}

struct Deserializer<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Deserializer<'a> {
    fn deserialize_report(&mut self) -> Result<Report, ParseErrorKind> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) => {
                    let mut report = self.report_from_root(&start)?;
                    self.deserialize_testsuites(&mut report)?;
                    // Anything after the root element is ignored.
                    return Ok(report);
                }
                Event::Empty(start) => return self.report_from_root(&start),
                Event::Eof => return Err(ParseErrorKind::MissingRoot),
                // Declarations, comments, processing instructions, doctypes and whitespace.
                _ => {}
            }
        }
    }

    fn report_from_root(&self, start: &BytesStart<'a>) -> Result<Report, ParseErrorKind> {
        if !is_tag(start, TESTSUITES_TAG) {
            return Err(ParseErrorKind::UnexpectedRoot {
                found: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            });
        }

        let mut report = Report::new();
        for (key, value) in read_attributes(start)? {
            if key == "name" {
                report.name = Some(value);
            }
        }
        Ok(report)
    }

    fn deserialize_testsuites(&mut self, report: &mut Report) -> Result<(), ParseErrorKind> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) if is_tag(&start, TESTSUITE_TAG) => {
                    let mut testsuite = testsuite_from_start(&start)?;
                    self.deserialize_testsuite(&mut testsuite)?;
                    report.add_testsuite(testsuite);
                }
                Event::Empty(start) if is_tag(&start, TESTSUITE_TAG) => {
                    report.add_testsuite(testsuite_from_start(&start)?);
                }
                Event::Start(start) => self.skip_element(&start)?,
                Event::End(_) => return Ok(()),
                Event::Eof => {
                    return Err(ParseErrorKind::UnexpectedEof {
                        element: TESTSUITES_TAG,
                    });
                }
                _ => {}
            }
        }
    }

    fn deserialize_testsuite(&mut self, testsuite: &mut Testsuite) -> Result<(), ParseErrorKind> {
        loop {
            match self.reader.read_event()? {
                Event::Start(start) if is_tag(&start, TESTCASE_TAG) => {
                    let mut testcase = testcase_from_start(&start)?;
                    self.deserialize_testcase(&mut testcase)?;
                    testsuite.add_testcase(testcase);
                }
                Event::Empty(start) if is_tag(&start, TESTCASE_TAG) => {
                    testsuite.add_testcase(testcase_from_start(&start)?);
                }
                Event::Start(start) => self.skip_element(&start)?,
                Event::End(_) => return Ok(()),
                Event::Eof => {
                    return Err(ParseErrorKind::UnexpectedEof {
                        element: TESTSUITE_TAG,
                    });
                }
                _ => {}
            }
        }
    }

    fn deserialize_testcase(&mut self, testcase: &mut Testcase) -> Result<(), ParseErrorKind> {
        loop {
            let status = match self.reader.read_event()? {
                Event::Start(start) => {
                    if is_tag(&start, FAILURE_TAG) {
                        let mut detail = non_success_from_start(&start)?;
                        detail.description = self.deserialize_text(FAILURE_TAG)?;
                        TestcaseStatus::Failure(detail)
                    } else if is_tag(&start, ERROR_TAG) {
                        let mut detail = non_success_from_start(&start)?;
                        detail.description = self.deserialize_text(ERROR_TAG)?;
                        TestcaseStatus::Error(detail)
                    } else if is_tag(&start, SKIPPED_TAG) {
                        let status = skipped_from_start(&start)?;
                        self.skip_element(&start)?;
                        status
                    } else {
                        self.skip_element(&start)?;
                        continue;
                    }
                }
                Event::Empty(start) => {
                    if is_tag(&start, FAILURE_TAG) {
                        TestcaseStatus::Failure(non_success_from_start(&start)?)
                    } else if is_tag(&start, ERROR_TAG) {
                        TestcaseStatus::Error(non_success_from_start(&start)?)
                    } else if is_tag(&start, SKIPPED_TAG) {
                        skipped_from_start(&start)?
                    } else {
                        continue;
                    }
                }
                Event::End(_) => return Ok(()),
                Event::Eof => {
                    return Err(ParseErrorKind::UnexpectedEof {
                        element: TESTCASE_TAG,
                    });
                }
                _ => continue,
            };

            // The schema allows a single outcome element per testcase. If a document has more
            // than one, failure beats error beats skipped, and the first of equals is kept.
            if status.precedence() > testcase.status.precedence() {
                testcase.status = status;
            }
        }
    }

    /// Reads the character data directly inside the element whose start tag was just consumed.
    ///
    /// Text inside nested elements is not included.
    fn deserialize_text(&mut self, element: &'static str) -> Result<String, ParseErrorKind> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(bytes) => text.push_str(&unescape_normalized(&bytes)?),
                Event::CData(bytes) => {
                    text.push_str(&normalize_newlines(std::str::from_utf8(&bytes)?));
                }
                Event::Start(start) => self.skip_element(&start)?,
                Event::End(_) => return Ok(text),
                Event::Eof => return Err(ParseErrorKind::UnexpectedEof { element }),
                _ => {}
            }
        }
    }

    fn skip_element(&mut self, start: &BytesStart<'a>) -> Result<(), ParseErrorKind> {
        self.reader.read_to_end(start.name())?;
        Ok(())
    }
}

fn is_tag(start: &BytesStart<'_>, tag: &str) -> bool {
    start.local_name().as_ref() == tag.as_bytes()
}

fn testsuite_from_start(start: &BytesStart<'_>) -> Result<Testsuite, ParseErrorKind> {
    let mut testsuite = Testsuite::default();
    for (key, value) in read_attributes(start)? {
        match key.as_str() {
            "name" => testsuite.name = value,
            "tests" => testsuite.tests = Some(value),
            "failures" => testsuite.failures = Some(value),
            "errors" => testsuite.errors = Some(value),
            "skipped" => testsuite.skipped = Some(value),
            "time" => testsuite.time = Some(value),
            "timestamp" => testsuite.timestamp = Some(value),
            _ => {
                testsuite.extra.insert(key, value);
            }
        }
    }
    Ok(testsuite)
}

fn testcase_from_start(start: &BytesStart<'_>) -> Result<Testcase, ParseErrorKind> {
    let mut testcase = Testcase::new("", TestcaseStatus::Success);
    for (key, value) in read_attributes(start)? {
        match key.as_str() {
            "name" => testcase.name = value,
            "classname" => testcase.classname = Some(value),
            "time" => testcase.time = Some(value),
            _ => {
                testcase.extra.insert(key, value);
            }
        }
    }
    Ok(testcase)
}

fn non_success_from_start(start: &BytesStart<'_>) -> Result<NonSuccessDetail, ParseErrorKind> {
    let mut detail = NonSuccessDetail::default();
    for (key, value) in read_attributes(start)? {
        match key.as_str() {
            "message" => detail.message = Some(value),
            "type" => detail.ty = Some(value),
            _ => {}
        }
    }
    Ok(detail)
}

fn skipped_from_start(start: &BytesStart<'_>) -> Result<TestcaseStatus, ParseErrorKind> {
    let message = read_attributes(start)?.shift_remove("message");
    Ok(TestcaseStatus::Skipped { message })
}

fn read_attributes(start: &BytesStart<'_>) -> Result<IndexMap<String, String>, ParseErrorKind> {
    let mut attributes = IndexMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = unescape_normalized(&attr.value)?;
        attributes.insert(key, value);
    }
    Ok(attributes)
}

/// Normalizes line endings in raw character data, then expands entity and character references.
///
/// A `&#13;` reference still produces a carriage return.
fn unescape_normalized(raw: &[u8]) -> Result<String, ParseErrorKind> {
    let raw = normalize_newlines(std::str::from_utf8(raw)?);
    let text = quick_xml::escape::unescape(&raw).map_err(quick_xml::Error::from)?;
    Ok(text.into_owned())
}

/// End-of-line handling from XML 1.0 section 2.11: `\r\n` and a lone `\r` both become `\n`.
fn normalize_newlines(raw: &str) -> Cow<'_, str> {
    if raw.contains('\r') {
        Cow::Owned(raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(raw)
    }
}

//-
// Copyright (c) 2026, the Corral authors
//
// This file is part of Corral.
//
// Corral is free software: you can  redistribute it and/or modify it under the
// terms of  the GNU General Public  License as published by  the Free Software
// Foundation, either version  3 of the License, or (at  your option) any later
// version.
//
// Corral is distributed  in the hope that  it will be useful,  but WITHOUT ANY
// WARRANTY; without  even the implied  warranty of MERCHANTABILITY  or FITNESS
// FOR  A PARTICULAR  PURPOSE.  See the  GNU General  Public  License for  more
// details.
//
// You should have received a copy of the GNU General Public License along with
// Corral. If not, see <http://www.gnu.org/licenses/>.

//! Splitting Unix mbox streams into raw messages.
//!
//! Real-world mboxes come in three envelope grammars, all starting with
//! `From ` but differing in how a true envelope is told apart from a quoted
//! `From ` inside a body:
//!
//! - **Regular**: the envelope line ends in a 4-digit year, 1970-9999.
//! - **LargeInteger**: some historical dump tools write a bare integer
//!   (possibly negative) directly after `From ` instead of a date.
//! - **Funbackup**: the envelope line ends with the literal ` FUNBACKUP`.
//!
//! The variant is decided exactly once, from the first line that matches any
//! grammar, and its recognition rule applies for the rest of the stream.

use std::io::BufRead;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::support::error::Error;
use crate::support::strings;

lazy_static! {
    static ref REGULAR_YEAR: Regex = Regex::new(r" (\d{4})$").unwrap();
    static ref LARGE_INTEGER: Regex = Regex::new(r"^From -?\d+(\s|$)").unwrap();
    static ref QUOTED_FROM: Regex = Regex::new(r"^(>+)From ").unwrap();
}

/// One message split out of an mbox stream, still in its per-format raw form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawMboxMessage {
    /// Sender token of the envelope line.
    pub envelope_from: String,
    /// Best-effort parse of the envelope date; `None` when the envelope
    /// carries no usable timestamp.
    pub envelope_date: Option<DateTime<Utc>>,
    pub header_lines: Vec<String>,
    /// Body lines with envelope quoting reversed.
    pub body_lines: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EnvelopeVariant {
    Regular,
    LargeInteger,
    Funbackup,
}

impl EnvelopeVariant {
    fn classify(line: &str) -> Option<Self> {
        if !line.starts_with("From ") {
            return None;
        }

        if let Some(caps) = REGULAR_YEAR.captures(line) {
            let year: u32 = caps[1].parse().unwrap();
            if (1970..=9999).contains(&year) {
                return Some(EnvelopeVariant::Regular);
            }
        }

        if line.ends_with(" FUNBACKUP") {
            return Some(EnvelopeVariant::Funbackup);
        }

        if LARGE_INTEGER.is_match(line) {
            return Some(EnvelopeVariant::LargeInteger);
        }

        None
    }

    fn is_envelope(self, line: &str) -> bool {
        if !line.starts_with("From ") {
            return false;
        }

        match self {
            EnvelopeVariant::Regular => REGULAR_YEAR
                .captures(line)
                .map(|caps| {
                    let year: u32 = caps[1].parse().unwrap();
                    (1970..=9999).contains(&year)
                })
                .unwrap_or(false),
            EnvelopeVariant::LargeInteger => LARGE_INTEGER.is_match(line),
            EnvelopeVariant::Funbackup => line.ends_with(" FUNBACKUP"),
        }
    }
}

/// Pulls raw messages out of an mbox byte stream, one per call.
pub struct MboxReader<R> {
    input: R,
    variant: Option<EnvelopeVariant>,
    /// Caller's request; forced off for non-regular variants, whose envelope
    /// grammar does not tolerate ambiguity with quoted lines.
    high_level_unquoting: bool,
    pending_envelope: Option<String>,
    eof: bool,
}

impl<R: BufRead> MboxReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_high_level_unquoting(input, true)
    }

    pub fn with_high_level_unquoting(input: R, high_level_unquoting: bool) -> Self {
        MboxReader {
            input,
            variant: None,
            high_level_unquoting,
            pending_envelope: None,
            eof: false,
        }
    }

    /// Returns the next message, or `None` at end of stream.
    ///
    /// A stream in which no envelope is ever found yields no messages; that
    /// is not an error.
    pub fn next_message(&mut self) -> Result<Option<RawMboxMessage>, Error> {
        let envelope = match self.seek_envelope()? {
            Some(envelope) => envelope,
            None => return Ok(None),
        };

        let variant = self.variant.expect("variant unset after envelope found");
        let (envelope_from, envelope_date) = parse_envelope(&envelope, variant);

        let mut message = RawMboxMessage {
            envelope_from,
            envelope_date,
            ..RawMboxMessage::default()
        };

        // Header block: up to the first blank line. A new envelope in the
        // middle means the previous message had no body.
        loop {
            let line = match self.next_line()? {
                Some(line) => line,
                None => return Ok(Some(message)),
            };
            if line.is_empty() {
                break;
            }
            if variant.is_envelope(&line) {
                self.pending_envelope = Some(line);
                return Ok(Some(message));
            }
            message.header_lines.push(line);
        }

        // Body block: up to the next envelope or end of stream.
        let unquote_high = self.high_level_unquoting && EnvelopeVariant::Regular == variant;
        loop {
            let line = match self.next_line()? {
                Some(line) => line,
                None => break,
            };
            if variant.is_envelope(&line) {
                self.pending_envelope = Some(line);
                break;
            }
            message.body_lines.push(unquote(line, unquote_high));
        }

        Ok(Some(message))
    }

    fn seek_envelope(&mut self) -> Result<Option<String>, Error> {
        if let Some(envelope) = self.pending_envelope.take() {
            return Ok(Some(envelope));
        }

        while let Some(line) = self.next_line()? {
            match self.variant {
                None => {
                    if let Some(variant) = EnvelopeVariant::classify(&line) {
                        debug!("mbox envelope variant: {:?}", variant);
                        self.variant = Some(variant);
                        return Ok(Some(line));
                    }
                },
                Some(variant) => {
                    if variant.is_envelope(&line) {
                        return Ok(Some(line));
                    }
                },
            }
        }

        Ok(None)
    }

    /// Reads one line as raw bytes, reversibly widened to a `String`, with
    /// the line terminator stripped.
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        if self.eof {
            return Ok(None);
        }

        let mut raw = Vec::new();
        let nread = self.input.read_until(b'\n', &mut raw)?;
        if 0 == nread {
            self.eof = true;
            return Ok(None);
        }

        if raw.ends_with(b"\n") {
            raw.pop();
        }
        if raw.ends_with(b"\r") {
            raw.pop();
        }

        Ok(Some(strings::bytes_to_string(&raw)))
    }
}

/// Reverses body-line quoting: a line of one or more `>` directly followed by
/// `From ` loses exactly one leading `>`. With high-level unquoting off, only
/// a single quoting level is ever stripped.
fn unquote(line: String, high_levels: bool) -> String {
    let strip = match QUOTED_FROM.captures(&line) {
        Some(caps) => high_levels || 1 == caps[1].len(),
        None => false,
    };

    if strip {
        line[1..].to_owned()
    } else {
        line
    }
}

fn parse_envelope(line: &str, variant: EnvelopeVariant) -> (String, Option<DateTime<Utc>>) {
    let rest = line["From ".len()..].trim_start();
    let from = rest.split_whitespace().next().unwrap_or("").to_owned();

    let date = match variant {
        // "From sender Thu Apr 23 13:02:19 1998" and close variations
        EnvelopeVariant::Regular => {
            let tail = rest[from.len()..].trim();
            parse_ctime(tail)
        },
        // The integer after "From " is an epoch-seconds timestamp in the
        // dumps observed; negative values predate 1970 and are kept.
        EnvelopeVariant::LargeInteger => from
            .parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single()),
        EnvelopeVariant::Funbackup => None,
    };

    (from, date)
}

/// asctime()-style date as written on regular envelope lines.
fn parse_ctime(s: &str) -> Option<DateTime<Utc>> {
    for pattern in &["%a %b %e %H:%M:%S %Y", "%a %b %e %H:%M %Y"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }
    None
}

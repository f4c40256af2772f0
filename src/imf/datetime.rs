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

//! Date parsing across the historical formats found in archived articles.
//!
//! Four decades of user agents produced enough creative variation that the
//! only workable approach is an ordered pattern list, first match wins.
//! Named time zones are rewritten to numeric offsets up front since the
//! strftime grammar cannot parse them.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

/// Patterns for the `Date` header of RFC 850 and later articles, most common
/// first. Patterns without `%z` are interpreted as UTC.
static RFC850_PATTERNS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %y %H:%M:%S %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%a, %d %b %y %H:%M %z",
    "%d %b %y %H:%M %z",
    "%a, %d %b %Y %H:%M:%S",
    "%a, %d %b %y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%d %b %y %H:%M:%S",
    "%a, %d %b %y %H:%M",
    "%a %b %e %H:%M:%S %Y",
    "%Y-%m-%d %H:%M:%S",
];

/// Patterns for the `Posted` header of pre-RFC850 articles, which used
/// ctime()-like forms and a few numeric oddities.
static PRE_RFC850_PATTERNS: &[&str] = &[
    "%a %b %e %H:%M:%S %Y",
    "%a %b %e %H:%M %Y",
    "%a %b %e, %Y %H:%M:%S",
    "%m/%d/%y %H:%M",
    "%m/%d/%y %H:%M:%S",
];

/// The named zones that actually occur in archived headers. RFC 2822 demands
/// that ill-defined military zones and anything unknown be read as +0000.
static NAMED_ZONES: &[(&str, &str)] = &[
    ("UT", "+0000"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("BST", "+0100"),
    ("MEZ", "+0100"),
    ("CET", "+0100"),
    ("MET", "+0100"),
    ("MEST", "+0200"),
    ("MESZ", "+0200"),
    ("CEST", "+0200"),
    ("EET", "+0200"),
    ("EDT", "-0400"),
    ("AST", "-0400"),
    ("EST", "-0500"),
    ("CDT", "-0500"),
    ("CST", "-0600"),
    ("MDT", "-0600"),
    ("MST", "-0700"),
    ("PDT", "-0700"),
    ("PST", "-0800"),
    ("JST", "+0900"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
];

pub fn parse_rfc850(s: &str) -> Option<DateTime<Utc>> {
    parse_with(s, RFC850_PATTERNS)
}

pub fn parse_pre_rfc850(s: &str) -> Option<DateTime<Utc>> {
    parse_with(s, PRE_RFC850_PATTERNS)
}

fn parse_with(s: &str, patterns: &[&str]) -> Option<DateTime<Utc>> {
    let s = normalise(s);

    for pattern in patterns {
        if pattern.contains("%z") {
            if let Ok(dt) = DateTime::parse_from_str(&s, pattern) {
                return Some(dt.with_timezone(&Utc));
            }
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(&s, pattern) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    None
}

/// Strips comments and rewrites a trailing named zone to a numeric offset.
fn normalise(s: &str) -> String {
    // "(MET)" style trailing comments duplicate or annotate the zone
    let s = match s.find('(') {
        Some(paren) => &s[..paren],
        None => s,
    };
    let s = s.trim();

    let (head, last) = match s.rsplit_once(' ') {
        Some(split) => split,
        None => return s.to_owned(),
    };

    let upper = last.to_uppercase();
    for &(zone, offset) in NAMED_ZONES {
        if zone == upper {
            return format!("{} {}", head, offset);
        }
    }

    // An unknown all-alphabetic zone token reads as +0000
    if !last.is_empty() && last.bytes().all(|b| b.is_ascii_alphabetic()) {
        return format!("{} {}", head, "+0000");
    }

    s.to_owned()
}

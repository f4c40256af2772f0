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

//! Converting a parsed IMF message onto the canonical record.
//!
//! Two Usenet sub-formats share most of the mapping: the presence of an
//! `Article-I.D.` header marks a pre-RFC850 article; everything else is
//! treated as RFC 850 or later. The extraction here is deliberately
//! heuristic token-chopping, not address-grammar parsing: the archives are
//! full of agents that never heard of the grammar.

use log::debug;

use super::body::{self, BodySection};
use super::datetime;
use super::encoded_word::decode_text;
use super::header::HeaderList;
use crate::record::{Record, MEDIUM_USENET};
use crate::support::langcodes;
use crate::support::net;
use crate::support::strings;

/// Punctuation stripped from the ends of author and host tokens.
const WRAPPING: &str = "<>\"()";

/// Headers that may carry the posting origin, most trustworthy first.
static HOST_HEADERS: &[&str] = &[
    "nntp-posting-host",
    "x-nntp-posting-host",
    "posting-host",
    "x-posting-host",
    "x-originating-ip",
];

/// Trace header consulted only when none of `HOST_HEADERS` yielded an
/// origin; everything from its first `(` on is comment.
const TRACE_HEADER: &str = "x-trace";

/// Converts one parsed IMF message to a canonical record.
///
/// `format` is the origin format tag recorded on the result (the same
/// article syntax arrives via mbox streams, Hamster stores, and bare
/// files). A message without a `Newsgroups` header is not a Usenet article
/// and yields `None`.
pub fn convert<S: AsRef<str>>(
    format: &'static str,
    headers: &HeaderList,
    body_lines: &[S],
) -> Option<Record> {
    let newsgroups = match headers.get("newsgroups") {
        Some(value) => value.to_owned(),
        None => {
            debug!("message without newsgroups header rejected");
            return None;
        },
    };

    let mut record = Record {
        format,
        medium: MEDIUM_USENET,
        groups: strings::normalise_list(&newsgroups, ','),
        ..Record::default()
    };

    if let Some(from) = headers.get("from") {
        let (name, address) = split_author(from);
        record.author_name = name;
        record.author_id = address;
    }

    extract_origin(headers, &mut record);

    record.organization = headers
        .get("organization")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned);

    if let Some(references) = headers.get("references") {
        record.references = references_of(references);
    }

    record.lang = headers.get("content-language").and_then(|l| langcodes::resolve(l));

    let sections = body::decode_body(headers, body_lines);
    record.text = Some(text_of(&sections));

    record.archived = archive_policy(headers, &sections);

    // Pre-RFC850 articles identify themselves with Article-I.D.
    if headers.contains("article-i.d.") {
        record.subject = headers.get("title").map(str::to_owned);
        record.message_id = headers
            .get("article-i.d.")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);
        record.sent = headers.get("posted").and_then(datetime::parse_pre_rfc850);
    } else {
        record.subject = headers.get("subject").map(decode_text);
        record.message_id = headers.get("message-id").map(canonical_message_id);
        record.sent = headers.get("date").and_then(datetime::parse_rfc850);
    }

    if let Some(ref subject) = record.subject {
        record.tags = strings::bracketed_spans(subject, '[', ']');
    }

    Some(record)
}

/// Splits a From field into display name and address.
///
/// The field is encoded-word decoded (falling back to the raw string), split
/// on spaces, and each token stripped of wrapping punctuation; any token
/// containing `@` is the address (last one wins), all others are name words
/// joined in order.
fn split_author(from: &str) -> (Option<String>, Option<String>) {
    let decoded = decode_text(from);

    let mut address = None;
    let mut name_words = Vec::<&str>::new();

    for token in decoded.split_whitespace() {
        let token = strings::strip_unwanted(token, WRAPPING);
        if token.is_empty() {
            continue;
        }
        if token.contains('@') {
            address = Some(token.to_owned());
        } else {
            name_words.push(token);
        }
    }

    let name = if name_words.is_empty() {
        None
    } else {
        Some(name_words.join(" "))
    };

    (name, address)
}

/// Scans origin headers for the posting host or IP.
fn extract_origin(headers: &HeaderList, record: &mut Record) {
    for &header in HOST_HEADERS {
        if let Some(value) = headers.get(header) {
            if try_origin_value(value, record) {
                return;
            }
        }
    }

    if let Some(value) = headers.get(TRACE_HEADER) {
        let value = match value.find('(') {
            Some(paren) => &value[..paren],
            None => value,
        };
        try_origin_value(value, record);
    }
}

/// Tries each whitespace-separated token of `value` first as a dotted-quad
/// IPv4 address, else as a hostname. Returns whether anything stuck.
fn try_origin_value(value: &str, record: &mut Record) -> bool {
    for token in value.split_whitespace() {
        let token = strings::strip_unwanted(token, "<>\"();:,[]");
        if token.is_empty() {
            continue;
        }

        if let Some(num) = net::parse_dotted_quad(token) {
            record.post_ip = Some(token.to_owned());
            record.post_ip_num = Some(num);
            return true;
        }

        if net::is_hostname(token) {
            record.post_host = Some(token.to_owned());
            record.country_code = net::country_label(token);
            return true;
        }
    }

    false
}

/// All `<...>` bracketed identifiers in a References header, left to right,
/// brackets stripped.
fn references_of(value: &str) -> Vec<String> {
    let mut out = Vec::<String>::new();
    let mut rest = value;
    while let Some(start) = rest.find('<') {
        let after = &rest[start + 1..];
        match after.find('>') {
            Some(end) => {
                let id = after[..end].trim();
                if !id.is_empty() {
                    out.push(id.to_owned());
                }
                rest = &after[end + 1..];
            },
            None => break,
        }
    }
    out
}

/// Normalises a Message-ID to the identifier inside its first `<...>` span.
///
/// If the brackets are incomplete the original string passes through
/// unchanged; transport syntax is only stripped when it is actually there.
fn canonical_message_id(value: &str) -> String {
    let value = value.trim();
    if let Some(start) = value.find('<') {
        if let Some(end) = value[start + 1..].find('>') {
            return value[start + 1..start + 1 + end].to_owned();
        }
    }
    value.to_owned()
}

/// Joined lines of the decoded text/plain section, empty if there is none.
fn text_of(sections: &[BodySection]) -> String {
    body::section_of(sections, "text/plain")
        .map(|s| s.lines.join("\n"))
        .unwrap_or_default()
}

/// Resolves the archive policy.
///
/// An explicit `Archive: no` header wins; failing that, an `X-No-Archive:
/// yes` header or the literal first body line `x-no-archive: yes`. Nothing
/// ever yields `Some(true)`: a positive policy stays "unspecified" since the
/// downstream default is to archive anyway.
fn archive_policy(headers: &HeaderList, sections: &[BodySection]) -> Option<bool> {
    if let Some(value) = headers.get("archive") {
        if value.trim().eq_ignore_ascii_case("no") {
            return Some(false);
        }
        return None;
    }

    if let Some(value) = headers.get("x-no-archive") {
        if value.trim().eq_ignore_ascii_case("yes") {
            return Some(false);
        }
    }

    let first_line = body::section_of(sections, "text/plain")
        .and_then(|s| s.lines.first());
    if let Some(line) = first_line {
        if line.trim().eq_ignore_ascii_case("x-no-archive: yes") {
            return Some(false);
        }
    }

    None
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::record::FORMAT_NEWS;

    fn convert_lines(header_lines: &[&str], body_lines: &[&str]) -> Option<Record> {
        let headers = HeaderList::parse(header_lines);
        convert(FORMAT_NEWS, &headers, body_lines)
    }

    #[test]
    fn rejects_without_newsgroups() {
        assert_eq!(None, convert_lines(&["Subject: hi"], &["body"]));
    }

    #[test]
    fn converts_rfc850_article() {
        let record = convert_lines(
            &[
                "From: Jane Doe <jane@example.com>",
                "Newsgroups: Alt.Test, comp.archives",
                "Subject: [ANN] new archive",
                "Message-ID: <xyz.123@news.example.com>",
                "References: <a.1@h> garbage <b.2@h>",
                "Date: Thu, 23 Apr 1998 13:02:19 +0000",
                "Organization: Example Org",
                "NNTP-Posting-Host: news.uni-foo.de",
                "Content-Language: German",
            ],
            &["first line", "second line"],
        )
        .unwrap();

        assert_eq!(Some("jane@example.com".to_owned()), record.author_id);
        assert_eq!(Some("Jane Doe".to_owned()), record.author_name);
        assert_eq!(
            vec!["alt.test".to_owned(), "comp.archives".to_owned()],
            record.groups
        );
        assert_eq!(Some("[ANN] new archive".to_owned()), record.subject);
        assert_eq!(vec!["ann".to_owned()], record.tags);
        assert_eq!(
            Some("xyz.123@news.example.com".to_owned()),
            record.message_id
        );
        assert_eq!(
            vec!["a.1@h".to_owned(), "b.2@h".to_owned()],
            record.references
        );
        assert_eq!(
            Some(Utc.with_ymd_and_hms(1998, 4, 23, 13, 2, 19).unwrap()),
            record.sent
        );
        assert_eq!(Some("Example Org".to_owned()), record.organization);
        assert_eq!(Some("news.uni-foo.de".to_owned()), record.post_host);
        assert_eq!(Some("de".to_owned()), record.country_code);
        assert_eq!(Some("de".to_owned()), record.lang);
        assert_eq!(Some("first line\nsecond line".to_owned()), record.text);
        assert_eq!(None, record.archived);
        assert_eq!("usenet", record.medium);
    }

    #[test]
    fn converts_pre_rfc850_article() {
        let record = convert_lines(
            &[
                "Article-I.D.: ucbvax.5217",
                "From: mark@cbosgd",
                "Newsgroups: net.general",
                "Title: old style posting",
                "Posted: Mon Apr 12 12:00:04 1982",
            ],
            &["ancient body"],
        )
        .unwrap();

        assert_eq!(Some("ucbvax.5217".to_owned()), record.message_id);
        assert_eq!(Some("old style posting".to_owned()), record.subject);
        assert_eq!(
            Some(Utc.with_ymd_and_hms(1982, 4, 12, 12, 0, 4).unwrap()),
            record.sent
        );
        // "mark@cbosgd" contains @, so it is the address, not the name
        assert_eq!(Some("mark@cbosgd".to_owned()), record.author_id);
        assert_eq!(None, record.author_name);
    }

    #[test]
    fn author_last_address_wins() {
        let (name, address) =
            split_author("Joe (Home) <joe@old.example> joe@new.example");
        assert_eq!(Some("Joe Home".to_owned()), name);
        assert_eq!(Some("joe@new.example".to_owned()), address);
    }

    #[test]
    fn author_field_mime_decoded() {
        let (name, address) =
            split_author("=?ISO-8859-1?Q?Andr=E9?= <andre@example.org>");
        assert_eq!(Some("André".to_owned()), name);
        assert_eq!(Some("andre@example.org".to_owned()), address);
    }

    #[test]
    fn origin_ip_with_hex_quad() {
        let record = convert_lines(
            &[
                "Newsgroups: alt.test",
                "NNTP-Posting-Host: 7f.0.0.1",
            ],
            &[],
        )
        .unwrap();
        assert_eq!(Some("7f.0.0.1".to_owned()), record.post_ip);
        assert_eq!(Some(0x7F000001), record.post_ip_num);
        assert_eq!(None, record.post_host);
    }

    #[test]
    fn origin_from_trace_header() {
        let record = convert_lines(
            &[
                "Newsgroups: alt.test",
                "X-Trace: posting.example.com 893336539 (23 Apr 1998)",
            ],
            &[],
        )
        .unwrap();
        assert_eq!(Some("posting.example.com".to_owned()), record.post_host);
        assert_eq!(None, record.country_code);
    }

    #[test]
    fn archive_policy_resolution() {
        let no_header = convert_lines(
            &["Newsgroups: alt.test", "Archive: no"],
            &["body"],
        )
        .unwrap();
        assert_eq!(Some(false), no_header.archived);

        // An explicit yes is still "unspecified", never Some(true)
        let yes_header = convert_lines(
            &["Newsgroups: alt.test", "Archive: yes"],
            &["body"],
        )
        .unwrap();
        assert_eq!(None, yes_header.archived);

        let x_no = convert_lines(
            &["Newsgroups: alt.test", "X-No-Archive: YES"],
            &["body"],
        )
        .unwrap();
        assert_eq!(Some(false), x_no.archived);

        let body_line = convert_lines(
            &["Newsgroups: alt.test"],
            &["X-No-Archive: yes", "actual text"],
        )
        .unwrap();
        assert_eq!(Some(false), body_line.archived);

        let nothing = convert_lines(&["Newsgroups: alt.test"], &["body"]).unwrap();
        assert_eq!(None, nothing.archived);
    }

    #[test]
    fn incomplete_message_id_brackets_pass_through() {
        let record = convert_lines(
            &["Newsgroups: alt.test", "Message-ID: <unterminated@host"],
            &[],
        )
        .unwrap();
        assert_eq!(Some("<unterminated@host".to_owned()), record.message_id);
    }

    #[test]
    fn multipart_text_section_feeds_body() {
        let record = convert_lines(
            &[
                "Newsgroups: alt.test",
                "MIME-Version: 1.0",
                "Content-Type: multipart/alternative; boundary=XX",
            ],
            &[
                "--XX",
                "Content-Type: text/plain; charset=us-ascii",
                "",
                "the plain part",
                "--XX",
                "Content-Type: text/html; charset=us-ascii",
                "",
                "<p>the html part</p>",
                "--XX--",
            ],
        )
        .unwrap();
        assert_eq!(Some("the plain part".to_owned()), record.text);
    }
}

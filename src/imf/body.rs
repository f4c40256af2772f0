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

//! MIME body decoding: content type resolution, transfer decoding, charset
//! conversion, and recursive multipart splitting.
//!
//! Like the rest of the pipeline this is robust moreso than strictly correct:
//! it accepts wildly malformed data and always degrades to the least
//! destructive representation instead of failing — unchanged lines, an empty
//! section, or an opaque part.

use std::collections::HashMap;

use encoding_rs::Encoding;
use log::debug;

use super::header::HeaderList;
use super::quoted_printable::qp_decode_line;
use crate::support::strings;

/// Multipart nesting beyond this is treated as opaque text; it bounds
/// adversarial input without affecting any real message.
const MAX_MULTIPART_DEPTH: usize = 16;

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// One decoded body section. A simple message owns exactly one; a multipart
/// message owns one per (transitively nested) part.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodySection {
    /// Lowercased type/subtype, e.g. `text/plain`.
    pub content_type: String,
    /// Lowercased-key attributes from the Content-Type header, e.g.
    /// `charset`, `boundary`.
    pub attributes: HashMap<String, String>,
    /// Decoded text lines.
    pub lines: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TransferEncoding {
    SevenBit,
    EightBit,
    Base64,
    QuotedPrintable,
}

impl TransferEncoding {
    /// `None` for any encoding outside the four known ones.
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "7bit" => Some(TransferEncoding::SevenBit),
            "8bit" => Some(TransferEncoding::EightBit),
            "base64" => Some(TransferEncoding::Base64),
            "quoted-printable" => Some(TransferEncoding::QuotedPrintable),
            _ => None,
        }
    }
}

/// Splits a structured header body (Content-Type and friends) into its
/// leading value and its `;`-separated `key=value` attributes.
///
/// Delimiters inside double-quoted values do not separate.
pub fn parse_structured(value: &str) -> (String, HashMap<String, String>) {
    let mut segments = Vec::<String>::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in value.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => segments.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    segments.push(current);

    let leading = segments[0].trim().to_lowercase();
    let mut attributes = HashMap::new();
    for segment in &segments[1..] {
        if let Some(eq) = segment.find('=') {
            let key = segment[..eq].trim().to_lowercase();
            let val = strings::strip_unwanted(segment[eq + 1..].trim(), "\"");
            if !key.is_empty() {
                attributes.insert(key, val.to_owned());
            }
        }
    }

    (leading, attributes)
}

/// Decodes the body of a message (or recursively of a part) into its
/// sections.
pub fn decode_body<S: AsRef<str>>(headers: &HeaderList, lines: &[S]) -> Vec<BodySection> {
    let lines: Vec<&str> = lines.iter().map(AsRef::as_ref).collect();
    let mut sections = Vec::new();
    decode_into(headers, &lines, 0, &mut sections);
    sections
}

/// Finds the first section of the given content type.
pub fn section_of<'a>(sections: &'a [BodySection], content_type: &str) -> Option<&'a BodySection> {
    sections.iter().find(|s| s.content_type == content_type)
}

fn decode_into(headers: &HeaderList, lines: &[&str], depth: usize, out: &mut Vec<BodySection>) {
    let (content_type, attributes) = match headers.get("content-type") {
        Some(value) => parse_structured(value),
        None => (DEFAULT_CONTENT_TYPE.to_owned(), HashMap::new()),
    };

    if content_type.starts_with("multipart/") && depth < MAX_MULTIPART_DEPTH {
        decode_multipart(&attributes, lines, depth, out);
        return;
    }

    // An unknown transfer encoding cannot be decoded meaningfully; the
    // section is emitted with an empty body rather than failing the message.
    let encoding = match headers.get("content-transfer-encoding") {
        None => TransferEncoding::EightBit,
        Some(value) => match TransferEncoding::parse(value) {
            Some(encoding) => encoding,
            None => {
                debug!("unknown transfer encoding {:?}, emitting empty section", value);
                out.push(BodySection {
                    content_type,
                    attributes,
                    lines: Vec::new(),
                });
                return;
            },
        },
    };

    let charset = attributes
        .get("charset")
        .and_then(|label| Encoding::for_label_no_replacement(label.as_bytes()));

    let decoded = match charset {
        // With no resolvable charset the lines pass through unchanged
        None => lines.iter().map(|&l| l.to_owned()).collect(),
        Some(charset) => match encoding {
            TransferEncoding::Base64 => decode_base64(charset, lines),
            TransferEncoding::QuotedPrintable => decode_qp(charset, lines),
            TransferEncoding::SevenBit | TransferEncoding::EightBit => lines
                .iter()
                .map(|&l| decode_charset(charset, &strings::string_to_bytes(l)))
                .collect(),
        },
    };

    out.push(BodySection {
        content_type,
        attributes,
        lines: decoded,
    });
}

/// Concatenates the decode of every line (skipping lines that fail to
/// decode), charset-decodes the whole run, then re-splits on CRLF.
fn decode_base64(charset: &'static Encoding, lines: &[&str]) -> Vec<String> {
    let mut bytes = Vec::new();
    for line in lines {
        match base64::decode(line.trim()) {
            Ok(chunk) => bytes.extend_from_slice(&chunk),
            Err(_) => debug!("skipping undecodable base64 line"),
        }
    }

    let text = decode_charset(charset, &bytes);
    text.split("\r\n").map(str::to_owned).collect()
}

/// Decodes line by line; a trailing `=` joins the next line with no line
/// break, and the joined byte run is charset-decoded as a unit.
fn decode_qp(charset: &'static Encoding, lines: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut run = Vec::<u8>::new();

    for line in lines {
        let (decoded, continued) = qp_decode_line(line);
        run.extend_from_slice(&decoded);
        if !continued {
            out.push(decode_charset(charset, &run));
            run.clear();
        }
    }
    if !run.is_empty() {
        out.push(decode_charset(charset, &run));
    }

    out
}

fn decode_charset(charset: &'static Encoding, bytes: &[u8]) -> String {
    charset.decode_with_bom_removal(bytes).0.into_owned()
}

fn decode_multipart(
    attributes: &HashMap<String, String>,
    lines: &[&str],
    depth: usize,
    out: &mut Vec<BodySection>,
) {
    // Without a boundary the parts cannot be located at all
    let boundary = match attributes.get("boundary") {
        Some(boundary) => boundary,
        None => {
            debug!("multipart without boundary attribute, no sections");
            return;
        },
    };
    let marker = format!("--{}", boundary);
    let closing = format!("--{}--", boundary);

    let mut part: Option<Vec<&str>> = None;
    for &line in lines {
        if line == marker || line == closing {
            if let Some(part) = part.take() {
                decode_part(&part, depth, out);
            }
            if line == closing {
                return;
            }
            part = Some(Vec::new());
        } else if let Some(ref mut part) = part {
            part.push(line);
        }
        // Lines before the first marker are preamble; dropped
    }

    if let Some(part) = part {
        decode_part(&part, depth, out);
    }
}

/// A part's leading lines up to the first blank line are its own header
/// block; the remainder is its body, decoded recursively.
fn decode_part(lines: &[&str], depth: usize, out: &mut Vec<BodySection>) {
    let split = lines.iter().position(|l| l.is_empty()).unwrap_or(lines.len());
    let headers = HeaderList::parse(&lines[..split]);
    let body = if split < lines.len() {
        &lines[split + 1..]
    } else {
        &[]
    };

    decode_into(&headers, body, depth + 1, out);
}

#[cfg(test)]
mod test {
    use super::*;

    fn headers(lines: &[&str]) -> HeaderList {
        HeaderList::parse(lines)
    }

    #[test]
    fn test_parse_structured() {
        let (ct, attrs) = parse_structured("text/plain; charset=ISO-8859-1");
        assert_eq!("text/plain", ct);
        assert_eq!(Some("ISO-8859-1"), attrs.get("charset").map(String::as_str));

        let (ct, attrs) =
            parse_structured("Multipart/Mixed; boundary=\"a;b=c\"; x=y");
        assert_eq!("multipart/mixed", ct);
        assert_eq!(Some("a;b=c"), attrs.get("boundary").map(String::as_str));
        assert_eq!(Some("y"), attrs.get("x").map(String::as_str));
    }

    #[test]
    fn default_type_and_passthrough_without_charset() {
        let sections = decode_body(&headers(&[]), &["hello", "wörld"]);
        assert_eq!(1, sections.len());
        assert_eq!("text/plain", sections[0].content_type);
        assert_eq!(vec!["hello".to_owned(), "wörld".to_owned()], sections[0].lines);
    }

    #[test]
    fn eight_bit_charset_reinterpretation() {
        let sections = decode_body(
            &headers(&["Content-Type: text/plain; charset=ISO-8859-1"]),
            // 0xE9 as carried through the reversible byte widening
            &["caf\u{E9}".to_owned()],
        );
        assert_eq!(vec!["café".to_owned()], sections[0].lines);
    }

    #[test]
    fn unknown_transfer_encoding_empties_section() {
        let sections = decode_body(
            &headers(&[
                "Content-Type: text/plain; charset=us-ascii",
                "Content-Transfer-Encoding: x-uuencode",
            ]),
            &["begin 644 file"],
        );
        assert_eq!(1, sections.len());
        assert_eq!("text/plain", sections[0].content_type);
        assert!(sections[0].lines.is_empty());
    }

    #[test]
    fn base64_skips_broken_lines() {
        let sections = decode_body(
            &headers(&[
                "Content-Type: text/plain; charset=us-ascii",
                "Content-Transfer-Encoding: base64",
            ]),
            &["aGVsbG8gd29y", "!!! not base64 !!!", "bGQ="],
        );
        assert_eq!(vec!["hello world".to_owned()], sections[0].lines);
    }

    #[test]
    fn base64_resplits_on_crlf() {
        // "one\r\ntwo" in base64
        let sections = decode_body(
            &headers(&[
                "Content-Type: text/plain; charset=us-ascii",
                "Content-Transfer-Encoding: base64",
            ]),
            &["b25lDQp0d28="],
        );
        assert_eq!(vec!["one".to_owned(), "two".to_owned()], sections[0].lines);
    }

    #[test]
    fn quoted_printable_soft_breaks_join_lines() {
        let sections = decode_body(
            &headers(&[
                "Content-Type: text/plain; charset=ISO-8859-1",
                "Content-Transfer-Encoding: quoted-printable",
            ]),
            &["sch=F6ne Gr=", "=FC=DFe", "second line"],
        );
        assert_eq!(
            vec!["schöne Grüße".to_owned(), "second line".to_owned()],
            sections[0].lines
        );
    }

    #[test]
    fn multipart_without_boundary_has_no_sections() {
        let sections = decode_body(
            &headers(&["Content-Type: multipart/mixed"]),
            &["--something", "text"],
        );
        assert!(sections.is_empty());
    }

    #[test]
    fn multipart_splits_into_typed_sections() {
        let sections = decode_body(
            &headers(&["Content-Type: multipart/alternative; boundary=XX"]),
            &[
                "preamble to ignore",
                "--XX",
                "Content-Type: text/plain; charset=us-ascii",
                "",
                "plain part",
                "--XX",
                "Content-Type: text/html; charset=us-ascii",
                "",
                "<p>html part</p>",
                "--XX--",
                "epilogue to ignore",
            ],
        );

        assert_eq!(2, sections.len());
        assert_eq!("text/plain", sections[0].content_type);
        assert_eq!(vec!["plain part".to_owned()], sections[0].lines);
        assert_eq!("text/html", sections[1].content_type);
        assert_eq!(
            Some(&sections[1]),
            section_of(&sections, "text/html")
        );
    }

    #[test]
    fn nested_multipart_recurses() {
        let sections = decode_body(
            &headers(&["Content-Type: multipart/mixed; boundary=outer"]),
            &[
                "--outer",
                "Content-Type: multipart/alternative; boundary=inner",
                "",
                "--inner",
                "Content-Type: text/plain; charset=us-ascii",
                "",
                "innermost",
                "--inner--",
                "--outer",
                "Content-Type: text/plain; charset=us-ascii",
                "",
                "sibling",
                "--outer--",
            ],
        );

        assert_eq!(2, sections.len());
        assert_eq!(vec!["innermost".to_owned()], sections[0].lines);
        assert_eq!(vec!["sibling".to_owned()], sections[1].lines);
    }

    #[test]
    fn part_without_headers_defaults_to_text_plain() {
        let sections = decode_body(
            &headers(&["Content-Type: multipart/mixed; boundary=b"]),
            &["--b", "", "bare body", "--b--"],
        );
        assert_eq!(1, sections.len());
        assert_eq!("text/plain", sections[0].content_type);
        assert_eq!(vec!["bare body".to_owned()], sections[0].lines);
    }
}

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

//! Locale-independent string helpers shared by the converters.

/// Strips every character contained in `unwanted` from both ends of `s`.
///
/// Interior occurrences are untouched. This is the single stripping primitive
/// used by every extraction site (address tokens, host candidates, bracketed
/// identifiers).
pub fn strip_unwanted<'a>(s: &'a str, unwanted: &str) -> &'a str {
    s.trim_matches(|c| unwanted.contains(c))
}

/// Normalises one group/forum name: trim, lowercase, drop if empty.
pub fn normalise_entry(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_lowercase())
    }
}

/// Splits `raw` on `sep` and normalises every entry, dropping empties and
/// duplicates while preserving first-occurrence order.
pub fn normalise_list(raw: &str, sep: char) -> Vec<String> {
    let mut out = Vec::<String>::new();
    for entry in raw.split(sep) {
        if let Some(entry) = normalise_entry(entry) {
            if !out.contains(&entry) {
                out.push(entry);
            }
        }
    }
    out
}

/// Converts raw bytes to a string, mapping every byte to the Unicode code
/// point of the same value.
///
/// This is the identity transform for Latin-1 text and, critically, is
/// reversible via `string_to_bytes`, so undecoded message lines can be carried
/// as `String` without losing the original bytes.
pub fn bytes_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Reverses `bytes_to_string`. Code points above U+00FF (which cannot have
/// come from that function) degrade to `?`.
pub fn string_to_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
        .collect()
}

/// Extracts every well-formed `open`..`close` bracketed span of `s`, left to
/// right, passing the inner text through `normalise_entry`.
///
/// Unterminated opens and stray closes are ignored.
pub fn bracketed_spans(s: &str, open: char, close: char) -> Vec<String> {
    let mut out = Vec::<String>::new();
    let mut rest = s;
    while let Some(start) = rest.find(open) {
        let after = &rest[start + open.len_utf8()..];
        match after.find(close) {
            Some(end) => {
                if let Some(span) = normalise_entry(&after[..end]) {
                    if !out.contains(&span) {
                        out.push(span);
                    }
                }
                rest = &after[end + close.len_utf8()..];
            },
            None => break,
        }
    }
    out
}

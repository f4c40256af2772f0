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

//! RFC 2047 "encoded word" decoding for header fields.

use lazy_static::lazy_static;
use regex::Regex;

use super::quoted_printable::qp_decode_word;

lazy_static! {
    static ref ENCODED_WORD: Regex =
        Regex::new(r"=\?([!->@-~]*)\?([!->@-~]*)\?([!->@-~]*)\?=").unwrap();
}

/// Test if `word` (in its entirety) is an encoded word; if so, decode it.
///
/// Returns `None` if it is not an encoded word or could not be decoded; the
/// caller decides whether to fall back to the raw text. RFC 2047 caps encoded
/// words at 75 characters, but real agents produce (and interpret) longer
/// ones, so no length limit is enforced here.
pub fn ew_decode(word: &str) -> Option<String> {
    let captures = ENCODED_WORD.captures(word)?;
    let whole = captures.get(0).unwrap();
    if 0 != whole.start() || whole.end() != word.len() {
        return None;
    }

    decode_parts(
        captures.get(1).unwrap().as_str(),
        captures.get(2).unwrap().as_str(),
        captures.get(3).unwrap().as_str(),
    )
}

/// Decodes every encoded word occurring in `text`, leaving everything else
/// untouched.
///
/// Whitespace between two adjacent encoded words is deleted, as the RFC
/// requires; all other whitespace is preserved. If nothing decodes, the input
/// is returned unchanged.
pub fn decode_text(text: &str) -> String {
    let mut out = String::new();
    let mut last_end = 0;
    let mut last_was_word = false;

    for captures in ENCODED_WORD.captures_iter(text) {
        let whole = captures.get(0).unwrap();
        let gap = &text[last_end..whole.start()];

        match decode_parts(
            captures.get(1).unwrap().as_str(),
            captures.get(2).unwrap().as_str(),
            captures.get(3).unwrap().as_str(),
        ) {
            Some(decoded) => {
                if !(last_was_word && gap.chars().all(char::is_whitespace)) {
                    out.push_str(gap);
                }
                out.push_str(&decoded);
                last_was_word = true;
            },
            None => {
                out.push_str(gap);
                out.push_str(whole.as_str());
                last_was_word = false;
            },
        }

        last_end = whole.end();
    }

    out.push_str(&text[last_end..]);
    out
}

fn decode_parts(charset: &str, xfer: &str, content: &str) -> Option<String> {
    let bytes = match xfer {
        "q" | "Q" => qp_decode_word(content),
        "b" | "B" => base64::decode(content).ok()?,
        _ => return None,
    };

    let encoding = encoding_rs::Encoding::for_label_no_replacement(charset.as_bytes())?;
    Some(encoding.decode_with_bom_removal(&bytes).0.into_owned())
}

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

use std::str;

/// Decodes one quoted-printable line, as described by RFC 2045.
///
/// This never fails: invalid escape sequences are passed through
/// untransformed. The second return value is true if the line ended in a bare
/// `=` (a soft line break), meaning the next line continues this one with no
/// line break in between.
pub fn qp_decode_line(s: &str) -> (Vec<u8>, bool) {
    qp_decode(s.as_bytes(), false)
}

/// Decodes the content of a Q-encoded word (RFC 2047), where `_` stands for
/// an ASCII space regardless of charset and soft breaks cannot occur.
pub fn qp_decode_word(s: &str) -> Vec<u8> {
    qp_decode(s.as_bytes(), true).0
}

fn qp_decode(s: &[u8], underscore_is_space: bool) -> (Vec<u8>, bool) {
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() {
        match s[i] {
            b'_' if underscore_is_space => {
                out.push(b' ');
                i += 1;
            },
            b'=' => {
                if i + 1 == s.len() {
                    if underscore_is_space {
                        // No soft breaks inside encoded words
                        out.push(b'=');
                        break;
                    }
                    // Soft break; the line continues on the next one
                    return (out, true);
                }
                match decode_pair(&s[i + 1..]) {
                    Some(byte) => {
                        out.push(byte);
                        i += 3;
                    },
                    None => {
                        // Broken escape, keep it verbatim
                        out.push(b'=');
                        i += 1;
                    },
                }
            },
            byte => {
                out.push(byte);
                i += 1;
            },
        }
    }

    (out, false)
}

fn decode_pair(s: &[u8]) -> Option<u8> {
    if s.len() < 2 {
        return None;
    }
    str::from_utf8(&s[..2])
        .ok()
        .and_then(|pair| u8::from_str_radix(pair, 16).ok())
}

#[cfg(test)]
mod test {
    use proptest::prelude::*;

    use super::*;

    fn assert_line(expected: &[u8], soft: bool, input: &str) {
        assert_eq!((expected.to_vec(), soft), qp_decode_line(input));
    }

    #[test]
    fn test_qp_decode_line() {
        assert_line(b"hello world", false, "hello world");
        assert_line(b"\xFC", false, "=FC");
        assert_line(b"f\xFCr", false, "f=FCr");
        assert_line(b"a=()b", false, "a=()b");
        assert_line(b"_stays_", false, "_stays_");
        assert_line(b"soft", true, "soft=");
        assert_line(b"", true, "=");
        assert_line(b"=A", false, "=A");
    }

    #[test]
    fn test_qp_decode_word() {
        assert_eq!(b"a b".to_vec(), qp_decode_word("a_b"));
        assert_eq!(b"Andr\xE9".to_vec(), qp_decode_word("Andr=E9"));
        assert_eq!(b"tail=".to_vec(), qp_decode_word("tail="));
    }

    proptest! {
        #[test]
        fn qp_decode_never_panics(s in ".*") {
            qp_decode_line(&s);
            qp_decode_word(&s);
        }
    }
}

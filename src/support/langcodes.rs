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

//! Language-name to ISO 639-1 code resolution.
//!
//! `Content-Language` headers in old articles carry anything from proper
//! codes ("en", "de-AT") to spelled-out English names ("German"). The lookup
//! table is the only process-wide shared state in the crate; it is built once
//! and never mutated afterwards.

use std::collections::HashMap;

use lazy_static::lazy_static;

lazy_static! {
    static ref BY_NAME: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        for &(name, code) in &[
            ("arabic", "ar"),
            ("chinese", "zh"),
            ("czech", "cs"),
            ("danish", "da"),
            ("dutch", "nl"),
            ("english", "en"),
            ("esperanto", "eo"),
            ("finnish", "fi"),
            ("french", "fr"),
            ("german", "de"),
            ("greek", "el"),
            ("hebrew", "he"),
            ("hungarian", "hu"),
            ("icelandic", "is"),
            ("italian", "it"),
            ("japanese", "ja"),
            ("korean", "ko"),
            ("norwegian", "no"),
            ("polish", "pl"),
            ("portuguese", "pt"),
            ("romanian", "ro"),
            ("russian", "ru"),
            ("slovak", "sk"),
            ("spanish", "es"),
            ("swedish", "sv"),
            ("turkish", "tr"),
            ("ukrainian", "uk"),
        ] {
            m.insert(name, code);
        }
        m
    };
}

/// Resolves a language declaration to a two-letter code.
///
/// Accepts codes (passed through lowercased, region subtags dropped) and
/// spelled-out English names. Anything unresolvable yields `None`.
pub fn resolve(decl: &str) -> Option<String> {
    let decl = decl.trim().to_lowercase();
    let primary = decl.split(|c| '-' == c || '_' == c).next().unwrap_or("");

    if 2 == primary.len() && primary.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Some(primary.to_owned());
    }

    BY_NAME.get(primary).map(|&code| code.to_owned())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_resolve() {
        assert_eq!(Some("en".to_owned()), resolve("en"));
        assert_eq!(Some("de".to_owned()), resolve("de-AT"));
        assert_eq!(Some("de".to_owned()), resolve(" German "));
        assert_eq!(Some("en".to_owned()), resolve("ENGLISH"));
        assert_eq!(None, resolve("klingon"));
        assert_eq!(None, resolve(""));
    }
}

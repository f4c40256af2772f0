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

//! Folding raw IMF header lines into logical fields.

/// An ordered list of logical header fields.
///
/// Duplicate names are preserved in order; lookup is by lowercased name with
/// the last occurrence winning, mirroring how the archive tools this replaces
/// resolved headers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HeaderList {
    fields: Vec<(String, String)>,
}

impl HeaderList {
    /// Folds `lines` per the IMF line-folding rule.
    ///
    /// A line starting with whitespace continues the open field: its leading
    /// whitespace is stripped and the remainder appended verbatim, with no
    /// separator inserted. A line without a `:` can neither start nor (when
    /// nothing is open) continue a field and is discarded. Empty lines are
    /// skipped.
    pub fn parse<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut fields = Vec::<(String, String)>::new();
        let mut open: Option<(String, String)> = None;

        for line in lines {
            let line = line.as_ref();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(' ') || line.starts_with('\t') {
                if let Some((_, ref mut body)) = open {
                    body.push_str(line.trim_start_matches([' ', '\t'].as_ref()));
                }
                continue;
            }

            match line.find(':') {
                Some(colon) => {
                    if let Some(field) = open.take() {
                        fields.push(field);
                    }
                    let name = line[..colon].to_owned();
                    let body = line[colon + 1..].trim_start().to_owned();
                    open = Some((name, body));
                },
                // Cannot start a field; e.g. a stray first line.
                None => continue,
            }
        }

        if let Some(field) = open {
            fields.push(field);
        }

        HeaderList { fields }
    }

    /// Looks up a field body by case-insensitive name; the last occurrence
    /// wins.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, body)| body.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, b)| (n.as_str(), b.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn folds_continuation_without_separator() {
        let headers =
            HeaderList::parse(&["Subject: This is", "  to be continued"]);
        assert_eq!(Some("This isto be continued"), headers.get("subject"));
    }

    #[test]
    fn lookup_is_case_insensitive_last_wins() {
        let headers = HeaderList::parse(&[
            "X-Header: first",
            "Other: something",
            "x-header: second",
        ]);
        assert_eq!(Some("second"), headers.get("X-HEADER"));
        assert_eq!(Some("something"), headers.get("other"));
        assert_eq!(None, headers.get("missing"));
    }

    #[test]
    fn ordering_and_duplicates_preserved() {
        let headers =
            HeaderList::parse(&["A: 1", "B: 2", "A: 3", "\tcontinued"]);
        let fields: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(
            vec![("A", "1"), ("B", "2"), ("A", "3continued")],
            fields
        );
    }

    #[test]
    fn colonless_and_empty_lines_discarded() {
        let headers = HeaderList::parse(&[
            "this line has no colon",
            "",
            "Subject: real",
            "",
            "another stray",
        ]);
        let fields: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(vec![("Subject", "real")], fields);
    }

    #[test]
    fn leading_continuation_with_nothing_open_is_dropped() {
        let headers = HeaderList::parse(&["  floating", "Subject: x"]);
        assert_eq!(Some("x"), headers.get("subject"));
        assert_eq!(1, headers.iter().count());
    }
}

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

//! The 1979 "A News" article framing.
//!
//! The header is positional: line 0 is `A` followed by the article id, lines
//! 1-4 are newsgroups, the bang-path, the date, and the subject; everything
//! after that is body. The last bang-path element is the host the article
//! was submitted from.

use log::debug;

use crate::imf::datetime;
use crate::record::{Record, FORMAT_ANEWS, MEDIUM_USENET};
use crate::support::strings;

/// Converts one A News article to a canonical record.
///
/// Anything with 5 or fewer lines, or whose first line is not `A` plus a
/// non-empty id, is not an A News article and yields `None`.
pub fn convert<S: AsRef<str>>(lines: &[S]) -> Option<Record> {
    if lines.len() <= 5 {
        debug!("a news input with {} lines rejected", lines.len());
        return None;
    }

    let first = lines[0].as_ref();
    if !first.starts_with('A') || first.len() < 2 {
        debug!("a news input without A-prefixed id rejected");
        return None;
    }
    let id = &first[1..];

    let path = lines[2].as_ref();
    let author = path.rsplit('!').next().unwrap_or("").trim();

    let body: Vec<&str> = lines[5..].iter().map(AsRef::as_ref).collect();

    Some(Record {
        format: FORMAT_ANEWS,
        medium: MEDIUM_USENET,
        message_id: Some(id.to_owned()),
        groups: strings::normalise_list(lines[1].as_ref(), ','),
        author_name: if author.is_empty() {
            None
        } else {
            Some(author.to_owned())
        },
        sent: datetime::parse_pre_rfc850(lines[3].as_ref()),
        subject: Some(lines[4].as_ref().to_owned()),
        text: Some(body.join("\n")),
        ..Record::default()
    })
}

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

use flate2::read::MultiGzDecoder;

use std::io::Read;

use crate::pipeline::{ArchiveMember, Unarchiver};
use crate::sniff::Format;
use crate::support::error::Error;

/// Expands the container formats the command-line tool handles natively.
///
/// Currently that is gzip only. Other classified containers (zip, 7z,
/// compress, bzip2, tar) are reported back as unsupported; the expectation
/// is that shell tooling unpacks those before ingestion.
pub struct StreamUnarchiver;

impl Unarchiver for StreamUnarchiver {
    fn expand<'a>(
        &self,
        format: Format,
        name: &str,
        data: Box<dyn Read + 'a>,
    ) -> Result<Vec<ArchiveMember<'a>>, Error> {
        match format {
            // MultiGzDecoder, so concatenated gzip members read as one
            // continuous stream
            Format::Gzip => Ok(vec![ArchiveMember {
                name: inner_name(name),
                data: Box::new(MultiGzDecoder::new(data)),
            }]),
            format => Err(Error::UnsupportedArchive(format)),
        }
    }
}

/// Derives the expanded member's name by dropping the compression suffix.
fn inner_name(name: &str) -> String {
    let base = name.rsplit('/').next().unwrap_or(name);
    for suffix in &[".gz", ".GZ", ".z", ".Z"] {
        if base.len() > suffix.len() && base.ends_with(suffix) {
            return base[..base.len() - suffix.len()].to_owned();
        }
    }
    base.to_owned()
}

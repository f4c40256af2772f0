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

//! Reading Hamster BBS data files.
//!
//! A Hamster data file is a bare concatenation of records, each a 4-byte
//! little-endian length followed by that many content bytes. The top bit of
//! the length field is a deletion flag, not part of the length. Content is
//! typically an IMF article.

use std::io::{self, ErrorKind, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use log::{debug, warn};

use crate::support::error::Error;

const DELETED_FLAG: u32 = 0x8000_0000;

/// Records longer than this are presumed to be framing corruption and are
/// skipped rather than buffered.
pub const DEFAULT_MAX_LENGTH: u32 = 4 << 20;

pub struct HamsterReader<R> {
    input: R,
    max_length: u32,
    skip_deleted: bool,
}

impl<R: Read> HamsterReader<R> {
    pub fn new(input: R) -> Self {
        Self::with_options(input, DEFAULT_MAX_LENGTH, true)
    }

    pub fn with_options(input: R, max_length: u32, skip_deleted: bool) -> Self {
        HamsterReader {
            input,
            max_length,
            skip_deleted,
        }
    }

    /// Returns the next record's content, or `None` at end of stream.
    ///
    /// Deleted records (when configured to skip them) and oversized records
    /// are skipped in place. A content run shorter than its declared length
    /// ends the usable data; no partial record is returned.
    pub fn next_record(&mut self) -> Result<Option<Vec<u8>>, Error> {
        loop {
            let length = match self.input.read_u32::<LittleEndian>() {
                Ok(length) => length,
                Err(ref e) if ErrorKind::UnexpectedEof == e.kind() => {
                    return Ok(None)
                },
                Err(e) => return Err(e.into()),
            };

            let deleted = 0 != length & DELETED_FLAG;
            let length = length & !DELETED_FLAG;

            if length > self.max_length || (deleted && self.skip_deleted) {
                if length > self.max_length {
                    warn!(
                        "skipping hamster record of implausible length {}",
                        length
                    );
                } else {
                    debug!("skipping deleted hamster record ({} bytes)", length);
                }

                let skipped = io::copy(
                    &mut self.input.by_ref().take(u64::from(length)),
                    &mut io::sink(),
                )?;
                if skipped < u64::from(length) {
                    return Ok(None);
                }
                continue;
            }

            let mut content = vec![0u8; length as usize];
            match self.input.read_exact(&mut content) {
                Ok(()) => return Ok(Some(content)),
                Err(ref e) if ErrorKind::UnexpectedEof == e.kind() => {
                    debug!("truncated hamster record, ending stream");
                    return Ok(None);
                },
                Err(e) => return Err(e.into()),
            }
        }
    }
}

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

use std::io;

use thiserror::Error;

use crate::sniff::Format;

/// Hard failures of the ingestion pipeline.
///
/// Per-message problems (a truncated article, a bad charset label, a broken
/// base64 chunk) are never represented here; they degrade or drop the single
/// message and reading continues.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unrecognised input format")]
    UnrecognisedFormat,
    #[error("No unarchiver available for {0:?} input")]
    UnsupportedArchive(Format),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

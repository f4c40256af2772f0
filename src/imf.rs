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

//! The Internet Message Format pipeline: header folding, MIME body
//! decoding, and conversion to the canonical record.

pub mod body;
pub mod convert;
pub mod datetime;
pub mod encoded_word;
pub mod header;
pub mod quoted_printable;

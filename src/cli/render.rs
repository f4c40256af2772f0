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

use std::io::Write;

use crate::pipeline::MessageSink;
use crate::record::{Field, FieldValue, Record};
use crate::support::error::Error;

/// Renders each record as a `field: value` block, blank line separated.
///
/// Only fields which are actually set are printed, in the fixed `Field::ALL`
/// order so the output is diffable.
pub struct TextRenderer<W> {
    out: W,
    first: bool,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        TextRenderer { out, first: true }
    }
}

impl<W: Write> MessageSink for TextRenderer<W> {
    fn deliver(&mut self, record: Record) -> Result<(), Error> {
        if !self.first {
            writeln!(self.out)?;
        }
        self.first = false;

        for &field in Field::ALL {
            let value = match record.field(field) {
                Some(value) => value,
                None => continue,
            };

            match value {
                FieldValue::Bool(b) => {
                    writeln!(self.out, "{}: {}", field.name(), if b { "yes" } else { "no" })?
                },
                FieldValue::Str(s) => {
                    writeln!(self.out, "{}: {}", field.name(), s)?
                },
                FieldValue::List(l) => {
                    writeln!(self.out, "{}: {}", field.name(), l.join(","))?
                },
                FieldValue::Num(n) => {
                    writeln!(self.out, "{}: {}", field.name(), n)?
                },
                FieldValue::Time(t) => writeln!(
                    self.out,
                    "{}: {}",
                    field.name(),
                    t.format("%Y-%m-%dT%H:%M:%SZ")
                )?,
            }
        }

        Ok(())
    }
}

/// Renders each record as one line of JSON.
pub struct JsonLinesRenderer<W> {
    out: W,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        JsonLinesRenderer { out }
    }
}

impl<W: Write> MessageSink for JsonLinesRenderer<W> {
    fn deliver(&mut self, record: Record) -> Result<(), Error> {
        serde_json::to_writer(&mut self.out, &record)?;
        self.out.write_all(b"\n")?;
        Ok(())
    }
}

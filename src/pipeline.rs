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

//! Wiring the sniffer, readers, and converters into one pass over a stream.
//!
//! The pipeline is synchronous and owns no shared state: independent inputs
//! can be processed by independent pipeline instances concurrently. A
//! malformed message is dropped with a diagnostic and never aborts its
//! siblings; an I/O failure abandons the stream and surfaces to the caller,
//! who decides whether further inputs remain.

use std::io::{BufRead, BufReader, Read};

use log::{debug, info, warn};

use crate::anews;
use crate::hamster::HamsterReader;
use crate::imf::{convert, header::HeaderList};
use crate::mbox::MboxReader;
use crate::record::{Record, FORMAT_HAMSTER, FORMAT_MBOX, FORMAT_NEWS};
use crate::sniff::{self, Format, PeekSource};
use crate::support::error::Error;
use crate::support::strings;
use crate::twitter;

/// Receives canonical records in the order they were parsed.
pub trait MessageSink {
    fn deliver(&mut self, record: Record) -> Result<(), Error>;
}

/// One member of an expanded archive, fed back through the sniffer.
pub struct ArchiveMember<'a> {
    pub name: String,
    pub data: Box<dyn Read + 'a>,
}

/// External collaborator that expands archive/compressed containers.
///
/// The pipeline itself never decompresses anything; it classifies the stream
/// and hands it over.
pub trait Unarchiver {
    fn expand<'a>(
        &self,
        format: Format,
        name: &str,
        data: Box<dyn Read + 'a>,
    ) -> Result<Vec<ArchiveMember<'a>>, Error>;
}

/// Per-stream reader options.
#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Strip multi-level `>From ` quoting in regular mbox bodies.
    pub mbox_high_level_unquoting: bool,
    /// Skip Hamster records flagged deleted.
    pub hamster_skip_deleted: bool,
    /// Ceiling on a single Hamster record.
    pub hamster_max_length: u32,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            mbox_high_level_unquoting: true,
            hamster_skip_deleted: true,
            hamster_max_length: crate::hamster::DEFAULT_MAX_LENGTH,
        }
    }
}

pub struct Pipeline<'a> {
    sink: &'a mut dyn MessageSink,
    unarchiver: Option<&'a dyn Unarchiver>,
    options: Options,
}

impl<'a> Pipeline<'a> {
    pub fn new(sink: &'a mut dyn MessageSink) -> Self {
        Pipeline {
            sink,
            unarchiver: None,
            options: Options::default(),
        }
    }

    pub fn with_unarchiver(mut self, unarchiver: &'a dyn Unarchiver) -> Self {
        self.unarchiver = Some(unarchiver);
        self
    }

    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Runs one named input through sniffing, reading, and conversion,
    /// delivering every record to the sink.
    ///
    /// `Err` means the stream itself failed (I/O, or an archive that could
    /// not be expanded); single malformed messages are only logged.
    pub fn run(&mut self, name: &str, input: impl Read + 'a) -> Result<(), Error> {
        let mut source = PeekSource::new(name, input);
        let format = sniff::sniff(&mut source);
        debug!("{}: sniffed as {:?}", name, format);

        match format {
            Format::Mbox => self.run_mbox(name, source),
            Format::Json => self.run_json(name, source),
            format if format.is_archive() => self.run_archive(format, name, source),
            _ => self.run_unsniffable(name, source),
        }
    }

    fn run_mbox(&mut self, name: &str, source: impl Read) -> Result<(), Error> {
        let mut reader = MboxReader::with_high_level_unquoting(
            BufReader::new(source),
            self.options.mbox_high_level_unquoting,
        );

        let mut count = 0u64;
        while let Some(raw) = reader.next_message()? {
            let headers = HeaderList::parse(&raw.header_lines);
            match convert::convert(FORMAT_MBOX, &headers, &raw.body_lines) {
                Some(mut record) => {
                    // The envelope date backstops articles with no parseable
                    // Date header
                    if record.sent.is_none() {
                        record.sent = raw.envelope_date;
                    }
                    self.sink.deliver(record)?;
                    count += 1;
                },
                None => warn!("{}: dropping malformed mbox message", name),
            }
        }

        info!("{}: {} messages", name, count);
        Ok(())
    }

    fn run_json(&mut self, name: &str, source: impl Read) -> Result<(), Error> {
        let mut input = BufReader::new(source);
        let mut count = 0u64;
        let mut raw = Vec::new();

        loop {
            raw.clear();
            if 0 == input.read_until(b'\n', &mut raw)? {
                break;
            }
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match twitter::parse_line(line) {
                Some(twitter::Status::Message(record)) => {
                    self.sink.deliver(*record)?;
                    count += 1;
                },
                Some(twitter::Status::Deleted) => {
                    debug!("{}: skipping deletion notice", name)
                },
                None => warn!("{}: dropping unparseable status line", name),
            }
        }

        info!("{}: {} statuses", name, count);
        Ok(())
    }

    fn run_archive(
        &mut self,
        format: Format,
        name: &str,
        source: impl Read + 'a,
    ) -> Result<(), Error> {
        let unarchiver = match self.unarchiver {
            Some(unarchiver) => unarchiver,
            None => return Err(Error::UnsupportedArchive(format)),
        };

        for member in unarchiver.expand(format, name, Box::new(source))? {
            let member_name = format!("{}!{}", name, member.name);
            // One bad member does not condemn its siblings
            if let Err(e) = self.run(&member_name, member.data) {
                warn!("{}: abandoned: {}", member_name, e);
            }
        }

        Ok(())
    }

    /// Best-effort dispatch for streams with no recognisable signature:
    /// classify by filename suffix, falling back to treating anything with a
    /// plausible header block as a single IMF message.
    fn run_unsniffable(&mut self, name: &str, source: PeekSource<impl Read>) -> Result<(), Error> {
        let suffix = name.rsplit('.').next().unwrap_or("").to_lowercase();

        match suffix.as_str() {
            "json" | "jsonl" => self.run_json(name, source),
            "dat" => self.run_hamster(name, source),
            _ => self.run_single_message(name, source),
        }
    }

    fn run_hamster(&mut self, name: &str, source: impl Read) -> Result<(), Error> {
        let mut reader = HamsterReader::with_options(
            source,
            self.options.hamster_max_length,
            self.options.hamster_skip_deleted,
        );

        let mut count = 0u64;
        while let Some(content) = reader.next_record()? {
            let lines = split_lines(&content);
            let (header_lines, body_lines) = split_message(&lines);
            let headers = HeaderList::parse(header_lines);
            match convert::convert(FORMAT_HAMSTER, &headers, body_lines) {
                Some(record) => {
                    self.sink.deliver(record)?;
                    count += 1;
                },
                None => warn!("{}: dropping malformed hamster record", name),
            }
        }

        info!("{}: {} records", name, count);
        Ok(())
    }

    fn run_single_message(&mut self, name: &str, source: impl Read) -> Result<(), Error> {
        let mut raw = Vec::new();
        let mut source = source;
        source.read_to_end(&mut raw)?;
        let lines = split_lines(&raw);

        // A News frames are cheap to probe first; they cannot be mistaken
        // for an IMF header block since line 0 has no colon.
        if let Some(record) = anews::convert(&lines) {
            self.sink.deliver(record)?;
            return Ok(());
        }

        let (header_lines, body_lines) = split_message(&lines);
        let headers = HeaderList::parse(header_lines);
        if headers.is_empty() {
            return Err(Error::UnrecognisedFormat);
        }

        match convert::convert(FORMAT_NEWS, &headers, body_lines) {
            Some(record) => {
                self.sink.deliver(record)?;
                Ok(())
            },
            None => {
                warn!("{}: dropping malformed message", name);
                Ok(())
            },
        }
    }
}

/// Splits raw bytes into reversibly-widened lines.
fn split_lines(raw: &[u8]) -> Vec<String> {
    let mut lines: Vec<String> = raw
        .split(|&b| b'\n' == b)
        .map(|line| {
            let line = if line.ends_with(b"\r") {
                &line[..line.len() - 1]
            } else {
                line
            };
            strings::bytes_to_string(line)
        })
        .collect();

    // A trailing newline does not open a final empty line
    if let Some(true) = lines.last().map(String::is_empty) {
        lines.pop();
    }

    lines
}

/// Splits message lines into the header block (up to the first blank line)
/// and the body.
fn split_message<'s>(lines: &'s [String]) -> (&'s [String], &'s [String]) {
    match lines.iter().position(|l| l.is_empty()) {
        Some(split) => (&lines[..split], &lines[split + 1..]),
        None => (lines, &[]),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Default)]
    struct CollectSink {
        records: Vec<Record>,
    }

    impl MessageSink for CollectSink {
        fn deliver(&mut self, record: Record) -> Result<(), Error> {
            self.records.push(record);
            Ok(())
        }
    }

    fn run(name: &str, data: &[u8]) -> Vec<Record> {
        crate::init_test_log();
        let mut sink = CollectSink::default();
        Pipeline::new(&mut sink).run(name, data).unwrap();
        sink.records
    }

    #[test]
    fn mbox_stream_end_to_end() {
        let records = run(
            "input.mbox",
            b"From alice@example.com Thu Apr 23 13:02:19 1998\n\
              From: alice@example.com\n\
              Newsgroups: alt.test\n\
              Subject: hello\n\
              \n\
              body\n\
              From bob@example.com Thu Apr 23 14:00:00 1998\n\
              From: bob@example.com\n\
              Subject: no newsgroups, dropped\n\
              \n\
              body\n",
        );

        assert_eq!(1, records.len());
        assert_eq!(Some("hello".to_owned()), records[0].subject);
        assert_eq!("mbox", records[0].format);
        // No Date header; the envelope date fills in
        assert!(records[0].sent.is_some());
    }

    #[test]
    fn json_stream_end_to_end() {
        let records = run(
            "statuses",
            b"{\"created_at\":\"Sun Jan 01 07:00:06 +0000 2012\",\"id\":10,\
              \"lang\":\"en\",\"text\":\"Just a message.\"}\n\
              {\"delete\":{\"status\":{\"id\":11}}}\n\
              not json\n",
        );

        assert_eq!(1, records.len());
        assert_eq!(Some("10".to_owned()), records[0].message_id);
        assert_eq!(Some("en".to_owned()), records[0].lang);
    }

    #[test]
    fn hamster_by_suffix() {
        let article = b"From: a@b\nNewsgroups: alt.test\nSubject: inside\n\n\
                        hamster body\n";
        let mut data = Vec::new();
        data.extend_from_slice(&(article.len() as u32).to_le_bytes());
        data.extend_from_slice(article);

        let records = run("store.dat", &data);
        assert_eq!(1, records.len());
        assert_eq!("hamster", records[0].format);
        assert_eq!(Some("inside".to_owned()), records[0].subject);
    }

    #[test]
    fn single_anews_file() {
        let records = run(
            "article",
            b"Aucbvax.5217\n\
              net.general\n\
              ucbvax!mark\n\
              Mon Apr 12 12:00:04 1982\n\
              subject here\n\
              body here\n",
        );

        assert_eq!(1, records.len());
        assert_eq!("anews", records[0].format);
        assert_eq!(Some("mark".to_owned()), records[0].author_name);
    }

    #[test]
    fn single_imf_file() {
        let records = run(
            "article.eml",
            b"From: a@b\nNewsgroups: alt.test\nSubject: bare file\n\n\
              some text\n",
        );

        assert_eq!(1, records.len());
        assert_eq!("news", records[0].format);
        assert_eq!(Some("bare file".to_owned()), records[0].subject);
    }

    #[test]
    fn unrecognised_input_is_reported() {
        let mut sink = CollectSink::default();
        let result = Pipeline::new(&mut sink).run("noise.bin", &b"\x00\x01\x02garbage"[..]);
        assert!(matches!(result, Err(Error::UnrecognisedFormat)));
        assert!(sink.records.is_empty());
    }

    #[test]
    fn archive_without_unarchiver_errors() {
        let mut sink = CollectSink::default();
        let result =
            Pipeline::new(&mut sink).run("x.gz", &b"\x1F\x8B\x08rest"[..]);
        assert!(matches!(result, Err(Error::UnsupportedArchive(Format::Gzip))));
    }

    struct SingleMemberUnarchiver;

    impl Unarchiver for SingleMemberUnarchiver {
        fn expand<'a>(
            &self,
            _format: Format,
            _name: &str,
            _data: Box<dyn Read + 'a>,
        ) -> Result<Vec<ArchiveMember<'a>>, Error> {
            Ok(vec![ArchiveMember {
                name: "member.eml".to_owned(),
                data: Box::new(
                    &b"From: a@b\nNewsgroups: alt.test\nSubject: from archive\n\n\
                       text\n"[..],
                ),
            }])
        }
    }

    #[test]
    fn archive_members_re_enter_pipeline() {
        let mut sink = CollectSink::default();
        let unarchiver = SingleMemberUnarchiver;
        Pipeline::new(&mut sink)
            .with_unarchiver(&unarchiver)
            .run("x.gz", &b"\x1F\x8B\x08rest"[..])
            .unwrap();

        assert_eq!(1, sink.records.len());
        assert_eq!(Some("from archive".to_owned()), sink.records[0].subject);
    }
}

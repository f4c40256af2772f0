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

//! Byte-signature format identification.
//!
//! The sniffer peeks at a bounded prefix of the stream without consuming it;
//! whatever reads the stream afterwards still sees every byte. Identification
//! is strictly heuristic and never fails: an unreadable or unmatched stream
//! is simply `Unknown`.

use std::cmp::min;
use std::io::{self, Read};

/// Everything the sniffer can tell apart.
///
/// Archive/compression containers are distinguished from message containers:
/// the former are handed to an unarchiver collaborator whose members re-enter
/// the sniffer, the latter go straight to a reader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    /// Line-delimited JSON status stream.
    Json,
    /// Unix mbox.
    Mbox,
    Gzip,
    Bzip2,
    /// Legacy LZW `compress`.
    Compress,
    Zip,
    SevenZip,
    Tar,
    Unknown,
}

impl Format {
    pub fn is_archive(self) -> bool {
        matches!(
            self,
            Format::Gzip
                | Format::Bzip2
                | Format::Compress
                | Format::Zip
                | Format::SevenZip
                | Format::Tar
        )
    }
}

struct Signature {
    offset: usize,
    magic: &'static [u8],
    format: Format,
}

/// Checked in order; more specific signatures (longer, or anchored at a
/// non-zero offset) come first so that shorter prefixes cannot shadow them.
static SIGNATURES: &[Signature] = &[
    Signature {
        offset: 257,
        magic: b"ustar",
        format: Format::Tar,
    },
    Signature {
        offset: 0,
        magic: b"7z\xBC\xAF\x27\x1C",
        format: Format::SevenZip,
    },
    Signature {
        offset: 0,
        magic: b"From ",
        format: Format::Mbox,
    },
    Signature {
        offset: 0,
        magic: b"PK\x03\x04",
        format: Format::Zip,
    },
    Signature {
        offset: 0,
        magic: b"PK\x05\x06",
        format: Format::Zip,
    },
    Signature {
        offset: 0,
        magic: b"PK\x07\x08",
        format: Format::Zip,
    },
    Signature {
        offset: 0,
        magic: b"BZh",
        format: Format::Bzip2,
    },
    Signature {
        offset: 0,
        magic: b"\x1F\x8B",
        format: Format::Gzip,
    },
    Signature {
        offset: 0,
        magic: b"\x1F\x9D",
        format: Format::Compress,
    },
    Signature {
        offset: 0,
        magic: b"{",
        format: Format::Json,
    },
];

// Enough for the deepest signature and the tar checksum fallback.
const PEEK_LEN: usize = 512;

/// A named byte source supporting non-destructive peeking.
///
/// Peeked bytes are buffered and handed back out by the `Read`
/// implementation before any further bytes of the underlying stream.
pub struct PeekSource<R> {
    inner: R,
    name: String,
    buffer: Vec<u8>,
    pos: usize,
}

impl<R: Read> PeekSource<R> {
    pub fn new(name: impl Into<String>, inner: R) -> Self {
        PeekSource {
            inner,
            name: name.into(),
            buffer: Vec::new(),
            pos: 0,
        }
    }

    /// Display name of the stream, used only for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns up to `n` unconsumed bytes from the head of the stream.
    ///
    /// Fewer than `n` bytes are returned only at end of stream.
    pub fn peek(&mut self, n: usize) -> io::Result<&[u8]> {
        while self.buffer.len() - self.pos < n {
            let mut chunk = [0u8; 256];
            let nread = self.inner.read(&mut chunk)?;
            if 0 == nread {
                break;
            }
            self.buffer.extend_from_slice(&chunk[..nread]);
        }

        let end = min(self.buffer.len(), self.pos + n);
        Ok(&self.buffer[self.pos..end])
    }
}

impl<R: Read> Read for PeekSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pos < self.buffer.len() {
            let n = min(buf.len(), self.buffer.len() - self.pos);
            buf[..n].copy_from_slice(&self.buffer[self.pos..self.pos + n]);
            self.pos += n;
            if self.pos == self.buffer.len() {
                self.buffer.clear();
                self.pos = 0;
            }
            return Ok(n);
        }

        self.inner.read(buf)
    }
}

/// Classifies the stream by signature without consuming it.
///
/// An I/O failure during the peek yields `Unknown` rather than propagating,
/// since sniffing is advisory; the failure will resurface on the first real
/// read.
pub fn sniff(source: &mut PeekSource<impl Read>) -> Format {
    let head = match source.peek(PEEK_LEN) {
        Ok(head) => head,
        Err(_) => return Format::Unknown,
    };

    for sig in SIGNATURES {
        if head.len() >= sig.offset + sig.magic.len()
            && &head[sig.offset..sig.offset + sig.magic.len()] == sig.magic
        {
            return sig.format;
        }
    }

    // Pre-POSIX tar has no magic at all; fall back to verifying the header
    // checksum convention over the first 512-byte block.
    if head.len() >= 512 && tar_checksum_valid(&head[..512]) {
        return Format::Tar;
    }

    Format::Unknown
}

/// Whether a 512-byte block satisfies the tar header checksum: the stored
/// octal value at bytes 148..156 equals the byte sum of the block with the
/// checksum field itself counted as spaces.
fn tar_checksum_valid(block: &[u8]) -> bool {
    let stored = block[148..156]
        .iter()
        .map(|&b| b as char)
        .collect::<String>();
    let stored = match u32::from_str_radix(stored.trim_matches([' ', '\0'].as_ref()), 8) {
        Ok(v) => v,
        Err(_) => return false,
    };

    let mut sum = 0u32;
    for (i, &b) in block.iter().enumerate() {
        sum += if (148..156).contains(&i) {
            u32::from(b' ')
        } else {
            u32::from(b)
        };
    }

    // The all-NUL padding block trivially sums to eight spaces; reject it.
    stored == sum && block.iter().any(|&b| 0 != b)
}

#[cfg(test)]
mod test {
    use std::io::Read;

    use super::*;

    fn sniff_bytes(data: &[u8]) -> Format {
        sniff(&mut PeekSource::new("test", data))
    }

    #[test]
    fn test_signatures() {
        assert_eq!(Format::Mbox, sniff_bytes(b"From foo@bar Thu Apr 23 13:02:19 1998\n"));
        assert_eq!(Format::Json, sniff_bytes(b"{\"id\":10}\n"));
        assert_eq!(Format::Gzip, sniff_bytes(b"\x1F\x8B\x08\x00rest"));
        assert_eq!(Format::Compress, sniff_bytes(b"\x1F\x9Drest"));
        assert_eq!(Format::Bzip2, sniff_bytes(b"BZh91AY"));
        assert_eq!(Format::Zip, sniff_bytes(b"PK\x03\x04rest"));
        assert_eq!(Format::SevenZip, sniff_bytes(b"7z\xBC\xAF\x27\x1Crest"));
        assert_eq!(Format::Unknown, sniff_bytes(b"hello world"));
        assert_eq!(Format::Unknown, sniff_bytes(b""));
    }

    #[test]
    fn test_ustar_signature() {
        let mut block = vec![0u8; 1024];
        block[..4].copy_from_slice(b"file");
        block[257..262].copy_from_slice(b"ustar");
        assert_eq!(Format::Tar, sniff_bytes(&block));
    }

    #[test]
    fn test_tar_checksum_fallback() {
        let mut block = vec![0u8; 1024];
        block[..8].copy_from_slice(b"oldstyle");
        for b in &mut block[148..156] {
            *b = b' ';
        }
        let sum: u32 = block[..512].iter().map(|&b| u32::from(b)).sum();
        let digits = format!("{:06o}\0 ", sum);
        block[148..156].copy_from_slice(digits.as_bytes());

        assert_eq!(Format::Tar, sniff_bytes(&block));

        // Corrupting the checksum loses the classification
        block[0] ^= 1;
        assert_eq!(Format::Unknown, sniff_bytes(&block));
    }

    #[test]
    fn peek_is_not_destructive() {
        let data: &[u8] = b"From here to eternity";
        let mut source = PeekSource::new("test", data);
        assert_eq!(Format::Mbox, sniff(&mut source));

        let mut readback = Vec::new();
        source.read_to_end(&mut readback).unwrap();
        assert_eq!(data, &readback[..]);
    }

    #[test]
    fn short_peek_then_read() {
        let mut source = PeekSource::new("test", &b"abcdef"[..]);
        assert_eq!(b"abc", source.peek(3).unwrap());
        assert_eq!(b"abcd", source.peek(4).unwrap());

        let mut readback = String::new();
        source.read_to_string(&mut readback).unwrap();
        assert_eq!("abcdef", readback);
    }
}

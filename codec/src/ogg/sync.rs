//! Streaming page reader.
//!
//! Reads physical pages one at a time from any [`Read`], using the same
//! header parser and checksum rules as the demuxer. It does not group
//! pages into logical streams or reassemble packets.

use std::io::{self, Read};

use super::demux::{ChecksumMode, verify_checksum};
use super::error::{Error, ErrorKind, Result};
use super::page::{HEADER_SIZE, PageHeader};

/// A physical page as read from the input.
#[derive(Debug, Clone)]
pub struct RawPage {
    /// Byte offset of the page in the input
    pub offset: usize,
    /// Fixed header
    pub header: PageHeader,
    /// Segment table
    pub segment_table: Vec<u8>,
    /// Page body data
    pub body: Vec<u8>,
    /// False if the stored checksum did not match
    pub checksum_valid: bool,
}

impl RawPage {
    /// Total size of the page in bytes.
    pub fn len(&self) -> usize {
        HEADER_SIZE + self.segment_table.len() + self.body.len()
    }

    /// Returns true if the page carries no lacing values.
    pub fn is_empty(&self) -> bool {
        self.segment_table.is_empty()
    }

    /// Returns the lengths of the packet fragments on this page.
    ///
    /// The final fragment is open (continues on the next page) when the
    /// page ends with a 255 lacing value.
    pub fn fragment_lengths(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut len = 0usize;
        for &v in &self.segment_table {
            len += v as usize;
            if v < 255 {
                out.push(len);
                len = 0;
            }
        }
        if self.ends_open() {
            out.push(len);
        }
        out
    }

    /// Returns true if the last packet on this page continues on the next.
    pub fn ends_open(&self) -> bool {
        self.segment_table.last() == Some(&255)
    }
}

/// Reads Ogg pages from a byte stream.
pub struct PageReader<R: Read> {
    reader: R,
    checksum: ChecksumMode,
    offset: usize,
}

impl<R: Read> PageReader<R> {
    /// Creates a new page reader.
    pub fn new(reader: R, checksum: ChecksumMode) -> Self {
        Self {
            reader,
            checksum,
            offset: 0,
        }
    }

    /// Returns the offset of the next page.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Reads the next page. Returns `Ok(None)` at a clean end of input.
    pub fn read_page(&mut self) -> Result<Option<RawPage>> {
        let start = self.offset;
        let mut buf = vec![0u8; HEADER_SIZE];
        let n = self.fill(&mut buf)?;
        if n == 0 {
            return Ok(None);
        }
        buf.truncate(n);
        let header = PageHeader::parse(&buf, 0)
            .map_err(|e| Error::new(e.kind, start + e.page_offset, start + e.offset))?;

        let mut segment_table = vec![0u8; header.segments as usize];
        if self.fill(&mut segment_table)? < segment_table.len() {
            return Err(Error::new(ErrorKind::Truncated, start, self.offset));
        }

        let body_size: usize = segment_table.iter().map(|&s| s as usize).sum();
        let mut body = vec![0u8; body_size];
        if self.fill(&mut body)? < body_size {
            return Err(Error::new(ErrorKind::Truncated, start, self.offset));
        }

        buf.extend_from_slice(&segment_table);
        buf.extend_from_slice(&body);
        let checksum_valid = verify_checksum(self.checksum, &buf, header.checksum, start)?;

        Ok(Some(RawPage {
            offset: start,
            header,
            segment_table,
            body,
            checksum_valid,
        }))
    }

    /// Returns the inner reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads until `buf` is full or the input ends, returning the count.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.reader.read(&mut buf[n..]) {
                Ok(0) => break,
                Ok(k) => n += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(Error::new(ErrorKind::Io(e), self.offset, self.offset + n)),
            }
        }
        self.offset += n;
        Ok(n)
    }
}

impl<R: Read> Iterator for PageReader<R> {
    type Item = Result<RawPage>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_page().transpose()
    }
}

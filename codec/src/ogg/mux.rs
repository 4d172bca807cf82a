//! Ogg muxer.

use std::io::Write;

use tracing::debug;

use super::crc::{CHECKSUM_RANGE, page_checksum};
use super::error::{Error, ErrorKind, Result};
use super::page::{HEADER_SIZE, MAX_SEGMENTS, Page, PageHeader, flags};

/// Returns the lacing values for a packet of `len` bytes.
///
/// A packet whose length is a multiple of 255 ends with a 0 so readers do
/// not treat it as continuing.
pub fn lacing_values(len: usize) -> impl Iterator<Item = u8> {
    std::iter::repeat_n(255u8, len / 255).chain(std::iter::once((len % 255) as u8))
}

/// Number of lacing values needed for a packet of `len` bytes.
pub fn lacing_len(len: usize) -> usize {
    len / 255 + 1
}

/// Serializes one page.
///
/// Every packet is laced whole onto the page; a page that would need more
/// than 255 lacing values is rejected.
pub fn serialize_page(serial: u32, sequence: u32, header_type: u8, page: &Page) -> Result<Vec<u8>> {
    let segments: usize = page.packets.iter().map(|p| lacing_len(p.len())).sum();
    if segments > MAX_SEGMENTS {
        return Err(Error::new(ErrorKind::PageOverflow { segments }, 0, 0));
    }

    let header = PageHeader {
        header_type,
        granule_position: page.granule_position,
        serial,
        sequence,
        checksum: 0,
        segments: segments as u8,
    };

    let mut out = Vec::with_capacity(HEADER_SIZE + segments + page.body_len());
    out.extend_from_slice(&header.to_bytes());
    for packet in &page.packets {
        out.extend(lacing_values(packet.len()));
    }
    for packet in &page.packets {
        out.extend_from_slice(packet);
    }

    let crc = page_checksum(&out);
    out[CHECKSUM_RANGE].copy_from_slice(&crc.to_le_bytes());
    Ok(out)
}

/// Writes the pages of one logical stream.
pub struct Muxer<W: Write> {
    writer: W,
    serial: u32,
    sequence: u32,
    offset: usize,
}

impl<W: Write> Muxer<W> {
    /// Creates a new muxer for the stream `serial`.
    pub fn new(writer: W, serial: u32) -> Self {
        Self {
            writer,
            serial,
            sequence: 0,
            offset: 0,
        }
    }

    /// Returns the sequence number the next page will get.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    /// Returns the number of bytes written so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Writes the next page. The first page written gets the start flag;
    /// `eos` marks the last one.
    pub fn write_page(&mut self, page: &Page, eos: bool) -> Result<()> {
        let mut header_type = 0u8;
        if self.sequence == 0 {
            header_type |= flags::BOS;
        }
        if eos {
            header_type |= flags::EOS;
        }

        let bytes = serialize_page(self.serial, self.sequence, header_type, page)
            .map_err(|e| Error::new(e.kind, self.offset, self.offset))?;
        self.writer
            .write_all(&bytes)
            .map_err(|e| Error::new(ErrorKind::Io(e), self.offset, self.offset))?;

        debug!(
            serial = self.serial,
            sequence = self.sequence,
            granule = page.granule_position,
            packets = page.packets.len(),
            "wrote ogg page"
        );
        self.offset += bytes.len();
        self.sequence += 1;
        Ok(())
    }

    /// Writes `pages` as a complete stream, the last one carrying the end flag.
    pub fn write_stream(&mut self, pages: &[Page]) -> Result<()> {
        let last = pages.len().saturating_sub(1);
        for (i, page) in pages.iter().enumerate() {
            self.write_page(page, i == last)?;
        }
        Ok(())
    }

    /// Flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| Error::new(ErrorKind::Io(e), self.offset, self.offset))
    }

    /// Returns the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

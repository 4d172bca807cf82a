//! Logical streams.

use bytes::Bytes;

use super::error::Result;
use super::mux::Muxer;
use super::page::Page;

/// The pages sharing one serial number, from start to end of stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalStream {
    /// Stream serial number
    pub serial: u32,
    /// Pages in stream order; page `i` has sequence number `i`
    pub pages: Vec<Page>,
}

impl LogicalStream {
    /// Creates a stream with no pages.
    pub fn new(serial: u32) -> Self {
        Self {
            serial,
            pages: Vec::new(),
        }
    }

    /// Creates a stream from pages.
    pub fn with_pages(serial: u32, pages: Vec<Page>) -> Self {
        Self { serial, pages }
    }

    /// Returns an iterator over every packet in stream order.
    pub fn packets(&self) -> impl Iterator<Item = &Bytes> {
        self.pages.iter().flat_map(|p| p.packets.iter())
    }

    /// Returns the first packet of the stream, if any.
    pub fn first_packet(&self) -> Option<&Bytes> {
        self.packets().next()
    }

    /// Returns the granule position of the last page.
    pub fn granule_position(&self) -> u64 {
        self.pages.last().map(|p| p.granule_position).unwrap_or(0)
    }

    /// Serializes the stream, assigning sequence numbers and start/end flags
    /// from page positions.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut muxer = Muxer::new(Vec::new(), self.serial);
        muxer.write_stream(&self.pages)?;
        Ok(muxer.into_inner())
    }
}

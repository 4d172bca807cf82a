//! Ogg page structures.

use bytes::Bytes;

use super::error::{Error, ErrorKind, Result};

/// Capture pattern that starts every page.
pub const CAPTURE_PATTERN: &[u8; 4] = b"OggS";

/// Size of the fixed page header, up to and including the segment count.
pub const HEADER_SIZE: usize = 27;

/// Largest number of lacing values a page can carry.
pub const MAX_SEGMENTS: usize = 255;

/// Header type flags.
pub mod flags {
    /// Continuation of previous packet.
    pub const CONTINUATION: u8 = 0x01;
    /// Beginning of stream.
    pub const BOS: u8 = 0x02;
    /// End of stream.
    pub const EOS: u8 = 0x04;
}

/// The fixed 27-byte region of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageHeader {
    /// Header type flags
    pub header_type: u8,
    /// Absolute granule position
    pub granule_position: u64,
    /// Stream serial number
    pub serial: u32,
    /// Page sequence number
    pub sequence: u32,
    /// Stored CRC checksum
    pub checksum: u32,
    /// Number of lacing values that follow
    pub segments: u8,
}

impl PageHeader {
    /// Parses the fixed header of the page starting at `start`.
    ///
    /// Errors are positioned at `start` with the scan offset at the field
    /// that failed.
    pub fn parse(data: &[u8], start: usize) -> Result<Self> {
        let avail = data.len().saturating_sub(start);
        if avail < 5 {
            return Err(Error::new(ErrorKind::Truncated, start, start));
        }
        let buf = &data[start..];
        if &buf[0..4] != CAPTURE_PATTERN {
            return Err(Error::new(ErrorKind::BadCapturePattern, start, start));
        }
        if buf[4] != 0 {
            return Err(Error::new(
                ErrorKind::UnsupportedVersion(buf[4]),
                start,
                start + 4,
            ));
        }
        if avail < HEADER_SIZE {
            return Err(Error::new(ErrorKind::Truncated, start, start + 5));
        }

        Ok(Self {
            header_type: buf[5],
            granule_position: u64::from_le_bytes(read_array(&buf[6..14])),
            serial: u32::from_le_bytes(read_array(&buf[14..18])),
            sequence: u32::from_le_bytes(read_array(&buf[18..22])),
            checksum: u32::from_le_bytes(read_array(&buf[22..26])),
            segments: buf[26],
        })
    }

    /// Returns true if this is a beginning-of-stream page.
    pub fn is_bos(&self) -> bool {
        (self.header_type & flags::BOS) != 0
    }

    /// Returns true if this is an end-of-stream page.
    pub fn is_eos(&self) -> bool {
        (self.header_type & flags::EOS) != 0
    }

    /// Returns true if this page continues a packet from the previous page.
    pub fn is_continuation(&self) -> bool {
        (self.header_type & flags::CONTINUATION) != 0
    }

    /// Serializes the fixed header with the given checksum.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(CAPTURE_PATTERN);
        out[4] = 0;
        out[5] = self.header_type;
        out[6..14].copy_from_slice(&self.granule_position.to_le_bytes());
        out[14..18].copy_from_slice(&self.serial.to_le_bytes());
        out[18..22].copy_from_slice(&self.sequence.to_le_bytes());
        out[22..26].copy_from_slice(&self.checksum.to_le_bytes());
        out[26] = self.segments;
        out
    }
}

fn read_array<const N: usize>(buf: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(buf);
    out
}

/// One page of a logical stream.
///
/// `packets` holds the packets that complete on this page. A packet that
/// started on an earlier page is reassembled and attributed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Absolute granule position
    pub granule_position: u64,
    /// Page sequence number
    pub sequence: u32,
    /// Header type flags as read; the muxer derives its own
    pub header_type: u8,
    /// Stored CRC checksum (0 for pages built in memory)
    pub checksum: u32,
    /// False if the stored checksum did not match the page contents
    pub checksum_valid: bool,
    /// Packets, in order
    pub packets: Vec<Bytes>,
}

impl Page {
    /// Creates a page to be muxed.
    pub fn new(granule_position: u64, packets: Vec<Bytes>) -> Self {
        Self {
            granule_position,
            sequence: 0,
            header_type: 0,
            checksum: 0,
            checksum_valid: true,
            packets,
        }
    }

    /// Returns true if this is a beginning-of-stream page.
    pub fn is_bos(&self) -> bool {
        (self.header_type & flags::BOS) != 0
    }

    /// Returns true if this is an end-of-stream page.
    pub fn is_eos(&self) -> bool {
        (self.header_type & flags::EOS) != 0
    }

    /// Returns true if this is a continuation page.
    pub fn is_continuation(&self) -> bool {
        (self.header_type & flags::CONTINUATION) != 0
    }

    /// Total bytes of packet data on this page.
    pub fn body_len(&self) -> usize {
        self.packets.iter().map(|p| p.len()).sum()
    }
}

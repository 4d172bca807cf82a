//! Ogg container format.
//!
//! This module implements the Ogg bitstream format as defined in RFC 3533:
//! a validating demuxer for fully buffered input, a streaming page reader,
//! and a muxer that serializes logical streams with correct lacing and
//! checksums.

mod crc;
mod demux;
mod error;
mod mux;
mod page;
mod stream;
mod sync;

pub use crc::{crc32, crc32_update, page_checksum};
pub use demux::{ChecksumMode, DemuxOptions, Demuxer, demux};
pub use error::{Error, ErrorKind, Result};
pub use mux::{Muxer, lacing_len, lacing_values, serialize_page};
pub use page::{CAPTURE_PATTERN, HEADER_SIZE, MAX_SEGMENTS, Page, PageHeader, flags};
pub use stream::LogicalStream;
pub use sync::{PageReader, RawPage};

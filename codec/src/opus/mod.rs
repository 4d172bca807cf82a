//! Opus packet layout and the Ogg Opus mapping.
//!
//! This module covers the container side of Opus as defined in RFC 6716
//! (TOC byte and frame packing) and RFC 7845 (identification and comment
//! headers, paging). It does not decode audio.

mod error;
mod file;
mod head;
mod packet;
mod pool;
mod toc;

pub use error::{Error, Result};
pub use file::{DEFAULT_PAGE_DURATION, OpusFile, PagingPolicy};
pub use head::{OPUS_HEAD, OPUS_TAGS, OpusHead, OpusTags};
pub use packet::{MAX_FRAME_LEN, OpusPacket, valid_packet_duration};
pub use pool::{PacketId, PacketPool};
pub use toc::{Bandwidth, Configuration, ConfigurationMode, FrameCode, FrameDuration, TOC};

//! Ogg page framing and Opus packet layout.
//!
//! This crate provides:
//!
//! - `ogg`: a validating Ogg demuxer, a streaming page reader and a muxer
//! - `opus`: TOC parsing, frame packing and the Ogg Opus file mapping
//!
//! # Example
//!
//! ```rust
//! use opuscraft_codec::opus::{OpusFile, OpusHead, OpusTags, PacketPool, PagingPolicy};
//!
//! // Two 20 ms fullband CELT packets
//! let mut pool = PacketPool::new();
//! let first = pool.add_bytes(vec![0xf8, 0x01])?;
//! let second = pool.add_bytes(vec![0xf8, 0x02])?;
//! pool.emit(first)?;
//! pool.emit(second)?;
//!
//! let file = pool.into_file(OpusHead::default(), OpusTags::default());
//! let data = file.to_bytes(&PagingPolicy::default())?;
//!
//! let decoded = OpusFile::decode_ogg(data)?;
//! assert_eq!(decoded.total_samples(), 1920);
//! # Ok::<(), opuscraft_codec::opus::Error>(())
//! ```

pub mod ogg;
pub mod opus;

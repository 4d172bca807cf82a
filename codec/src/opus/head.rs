//! Opus identification and comment headers (RFC 7845 Section 5).

use bytes::{Buf, BufMut, Bytes};

use super::error::{Error, Result};

/// Magic signature of the identification header.
pub const OPUS_HEAD: &[u8; 8] = b"OpusHead";
/// Magic signature of the comment header.
pub const OPUS_TAGS: &[u8; 8] = b"OpusTags";

const HEAD_SIZE: usize = 19;

/// Identification header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusHead {
    /// Output channel count
    pub channels: u8,
    /// Samples at 48 kHz to discard from the decoder output at start
    pub pre_skip: u16,
    /// Sample rate of the original input (informational only)
    pub input_sample_rate: u32,
    /// Output gain in Q7.8 dB
    pub output_gain: i16,
    /// Channel mapping family
    pub mapping_family: u8,
    /// Channel mapping table following the fixed header, kept verbatim
    pub mapping_table: Bytes,
}

impl Default for OpusHead {
    fn default() -> Self {
        Self {
            channels: 1,
            pre_skip: 0,
            input_sample_rate: 0,
            output_gain: 0,
            mapping_family: 0,
            mapping_table: Bytes::new(),
        }
    }
}

impl OpusHead {
    /// Parses an identification header packet.
    pub fn parse(packet: &Bytes) -> Result<Self> {
        if !packet.starts_with(OPUS_HEAD) {
            return Err(Error::MissingMagic("header"));
        }
        if packet.len() < HEAD_SIZE {
            return Err(Error::InvalidHeaderPacket);
        }
        let mut buf = &packet[OPUS_HEAD.len()..HEAD_SIZE];
        let version = buf.get_u8();
        if version != 1 {
            return Err(Error::UnsupportedVersion(version));
        }
        Ok(Self {
            channels: buf.get_u8(),
            pre_skip: buf.get_u16_le(),
            input_sample_rate: buf.get_u32_le(),
            output_gain: buf.get_i16_le(),
            mapping_family: buf.get_u8(),
            mapping_table: packet.slice(HEAD_SIZE..),
        })
    }

    /// Serializes the header packet.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::with_capacity(HEAD_SIZE + self.mapping_table.len());
        out.put_slice(OPUS_HEAD);
        out.put_u8(1);
        out.put_u8(self.channels);
        out.put_u16_le(self.pre_skip);
        out.put_u32_le(self.input_sample_rate);
        out.put_i16_le(self.output_gain);
        out.put_u8(self.mapping_family);
        out.put_slice(&self.mapping_table);
        Bytes::from(out)
    }

    /// Returns the output gain in dB.
    pub fn output_gain_db(&self) -> f64 {
        self.output_gain as f64 / 256.0
    }
}

/// Comment header: vendor string and user comments.
///
/// Comments are usually `KEY=value` but are kept as opaque strings in
/// their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpusTags {
    pub vendor: String,
    pub comments: Vec<String>,
}

impl OpusTags {
    /// Parses a comment header packet.
    pub fn parse(packet: &[u8]) -> Result<Self> {
        if !packet.starts_with(OPUS_TAGS) {
            return Err(Error::MissingMagic("comment"));
        }
        let mut buf = &packet[OPUS_TAGS.len()..];

        let vendor = read_string(&mut buf, "vendor string")?;
        if buf.remaining() < 4 {
            return Err(Error::InvalidCommentPacket);
        }
        let count = buf.get_u32_le();
        let mut comments = Vec::new();
        for _ in 0..count {
            comments.push(read_string(&mut buf, "user comment")?);
        }

        Ok(Self { vendor, comments })
    }

    /// Serializes the comment header packet.
    pub fn to_bytes(&self) -> Bytes {
        let mut out = Vec::new();
        out.put_slice(OPUS_TAGS);
        out.put_u32_le(self.vendor.len() as u32);
        out.put_slice(self.vendor.as_bytes());
        out.put_u32_le(self.comments.len() as u32);
        for comment in &self.comments {
            out.put_u32_le(comment.len() as u32);
            out.put_slice(comment.as_bytes());
        }
        Bytes::from(out)
    }

    /// Returns the values of every comment whose key matches `key`,
    /// compared case-insensitively.
    pub fn get<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.comments.iter().filter_map(move |c| {
            let (k, v) = c.split_once('=')?;
            k.eq_ignore_ascii_case(key).then_some(v)
        })
    }
}

/// Reads a 32-bit length-prefixed UTF-8 string.
fn read_string(buf: &mut &[u8], field: &'static str) -> Result<String> {
    if buf.remaining() < 4 {
        return Err(Error::InvalidCommentPacket);
    }
    let len = buf.get_i32_le();
    if len < 0 || len as usize > buf.remaining() {
        return Err(Error::InvalidCommentPacket);
    }
    let rest: &[u8] = *buf;
    let (raw, rest) = rest.split_at(len as usize);
    *buf = rest;
    String::from_utf8(raw.to_vec()).map_err(|_| Error::InvalidUtf8 { field })
}

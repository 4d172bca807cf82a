//! Opus packet framing.
//!
//! Splits a packet into its compressed frames according to the frame code
//! in the TOC byte (RFC 6716 Section 3.2). Codes 0, 1 and 2 are supported;
//! code 3 packets are rejected.

use bytes::{BufMut, Bytes, BytesMut};

use super::error::{Error, Result};
use super::toc::{Configuration, ConfigurationMode, FrameCode, FrameDuration, TOC};

/// Largest compressed frame allowed by RFC 6716.
pub const MAX_FRAME_LEN: usize = 1275;

/// A decoded Opus audio packet: its TOC and the frames it carries.
///
/// Frames are slices of the packet buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusPacket {
    toc: TOC,
    frames: Vec<Bytes>,
    data: Bytes,
}

impl OpusPacket {
    /// Decodes a packet.
    pub fn decode(data: impl Into<Bytes>) -> Result<Self> {
        let data: Bytes = data.into();
        let Some(&first) = data.first() else {
            return Err(Error::EmptyPacket);
        };
        let toc = TOC::new(first);

        let frames = match toc.frame_code() {
            FrameCode::OneFrame => vec![data.slice(1..)],
            FrameCode::TwoEqualFrames => {
                let n = data.len() - 1;
                if n % 2 != 0 {
                    return Err(Error::OddCodeOneLength(n));
                }
                let half = 1 + n / 2;
                vec![data.slice(1..half), data.slice(half..)]
            }
            FrameCode::TwoDifferentFrames => {
                let (len, start) = read_frame_length(&data[1..])?;
                let start = 1 + start;
                if len > data.len() - start {
                    return Err(Error::TruncatedPacket);
                }
                vec![data.slice(start..start + len), data.slice(start + len..)]
            }
            FrameCode::ArbitraryFrames => return Err(Error::UnsupportedFrameCode3),
        };

        Ok(Self { toc, frames, data })
    }

    /// Builds a packet from frames, choosing the TOC from `config`,
    /// `stereo` and `code`.
    pub fn encode(config: Configuration, stereo: bool, code: FrameCode, frames: Vec<Bytes>) -> Result<Self> {
        let toc = TOC::from_parts(config, stereo, code);
        let body_len: usize = frames.iter().map(|f| f.len()).sum();
        let mut out = BytesMut::with_capacity(3 + body_len);
        out.put_u8(toc.0);

        match (code, frames.as_slice()) {
            (FrameCode::OneFrame, [_]) => {}
            (FrameCode::OneFrame, _) => return Err(Error::InvalidFrameLayout("code 0 takes one frame")),
            (FrameCode::TwoEqualFrames, [a, b]) if a.len() == b.len() => {}
            (FrameCode::TwoEqualFrames, _) => {
                return Err(Error::InvalidFrameLayout("code 1 takes two frames of equal size"));
            }
            (FrameCode::TwoDifferentFrames, [a, _]) => write_frame_length(&mut out, a.len())?,
            (FrameCode::TwoDifferentFrames, _) => {
                return Err(Error::InvalidFrameLayout("code 2 takes two frames"));
            }
            (FrameCode::ArbitraryFrames, _) => return Err(Error::UnsupportedFrameCode3),
        }
        for frame in &frames {
            out.extend_from_slice(frame);
        }

        Self::decode(out.freeze())
    }

    /// Returns the TOC byte.
    pub fn toc(&self) -> TOC {
        self.toc
    }

    /// Returns the configuration.
    pub fn configuration(&self) -> Configuration {
        self.toc.configuration()
    }

    /// Returns the coding mode.
    pub fn mode(&self) -> ConfigurationMode {
        self.configuration().mode()
    }

    /// Returns the internal sample rate class in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.configuration().sample_rate()
    }

    /// Returns the frame duration.
    pub fn frame_duration(&self) -> FrameDuration {
        self.configuration().frame_duration()
    }

    /// Returns the samples per frame at 48 kHz.
    pub fn frame_samples(&self) -> u32 {
        self.configuration().frame_samples()
    }

    /// Returns true if this packet contains stereo audio.
    pub fn is_stereo(&self) -> bool {
        self.toc.is_stereo()
    }

    /// Returns the frame code.
    pub fn frame_code(&self) -> FrameCode {
        self.toc.frame_code()
    }

    /// Returns the compressed frames.
    pub fn frames(&self) -> &[Bytes] {
        &self.frames
    }

    /// Returns the total number of samples at 48 kHz.
    pub fn samples(&self) -> u32 {
        self.frame_samples() * self.frames.len() as u32
    }

    /// Returns the whole packet.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the packet length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: a decoded packet holds at least its TOC byte.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Reads a code 2 frame length, returning the length and the bytes used.
fn read_frame_length(data: &[u8]) -> Result<(usize, usize)> {
    match data {
        [] => Err(Error::TruncatedPacket),
        [first, ..] if *first < 252 => Ok((*first as usize, 1)),
        [first, second, ..] => Ok((*first as usize + 4 * *second as usize, 2)),
        [_] => Err(Error::TruncatedPacket),
    }
}

fn write_frame_length(out: &mut BytesMut, len: usize) -> Result<()> {
    if len > MAX_FRAME_LEN {
        return Err(Error::FrameTooLong(len));
    }
    if len < 252 {
        out.put_u8(len as u8);
    } else {
        let first = 252 + (len & 3);
        out.put_u8(first as u8);
        out.put_u8(((len - first) / 4) as u8);
    }
    Ok(())
}

/// Returns true if `samples` is a duration an Opus encoder produces for one
/// packet: 2.5, 5, 10, 20, 40 or 60 ms at 48 kHz.
pub fn valid_packet_duration(samples: u32) -> bool {
    FrameDuration::from_samples(samples).is_some()
}

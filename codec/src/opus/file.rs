//! Opus files: the Ogg mapping of an Opus stream.
//!
//! A stream starts with an identification header page and a comment header
//! page, each holding exactly one packet, followed by audio packets.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::error::{Error, Result};
use super::head::{OPUS_HEAD, OpusHead, OpusTags};
use super::packet::OpusPacket;
use crate::ogg::{Demuxer, LogicalStream, MAX_SEGMENTS, Page, lacing_len};

/// Default page budget: one second at 48 kHz.
pub const DEFAULT_PAGE_DURATION: u64 = 48000;

/// How audio packets are grouped into pages when muxing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PagingPolicy {
    /// Largest total packet duration per page, in samples at 48 kHz. A page
    /// always takes at least one packet, so a single longer packet still
    /// gets its own page.
    pub page_duration: u64,
}

impl Default for PagingPolicy {
    fn default() -> Self {
        Self {
            page_duration: DEFAULT_PAGE_DURATION,
        }
    }
}

/// An Opus stream: headers plus decoded audio packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpusFile {
    /// Serial number of the logical stream
    pub serial: u32,
    pub head: OpusHead,
    pub tags: OpusTags,
    pub packets: Vec<OpusPacket>,
}

impl OpusFile {
    /// Creates a file from headers and audio packets.
    pub fn new(head: OpusHead, tags: OpusTags, packets: Vec<OpusPacket>) -> Self {
        Self {
            serial: 0,
            head,
            tags,
            packets,
        }
    }

    /// Decodes the Opus stream carried by `stream`.
    pub fn decode_stream(stream: &LogicalStream) -> Result<Self> {
        if stream.pages.len() < 2 {
            return Err(Error::StreamTooShort(stream.pages.len()));
        }

        let head = OpusHead::parse(header_packet(stream, 0)?)?;
        let tags = OpusTags::parse(header_packet(stream, 1)?)?;

        let packets = stream.pages[2..]
            .iter()
            .flat_map(|page| page.packets.iter())
            .enumerate()
            .map(|(index, data)| {
                OpusPacket::decode(data.clone()).map_err(|e| Error::Packet {
                    index,
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            serial = stream.serial,
            channels = head.channels,
            packets = packets.len(),
            "decoded opus stream"
        );
        Ok(Self {
            serial: stream.serial,
            head,
            tags,
            packets,
        })
    }

    /// Demuxes `data` with default options and decodes the first Opus
    /// stream in it.
    pub fn decode_ogg(data: impl Into<Bytes>) -> Result<Self> {
        Self::decode_ogg_with(&Demuxer::default(), data)
    }

    /// Demuxes `data` with `demuxer` and decodes the first stream whose
    /// first packet is an identification header.
    pub fn decode_ogg_with(demuxer: &Demuxer, data: impl Into<Bytes>) -> Result<Self> {
        let streams = demuxer.demux(data)?;
        let stream = streams
            .iter()
            .find(|s| s.first_packet().is_some_and(|p| p.starts_with(OPUS_HEAD)))
            .ok_or(Error::NoOpusStream)?;
        Self::decode_stream(stream)
    }

    /// Returns the total duration of the audio packets in samples at 48 kHz.
    pub fn total_samples(&self) -> u64 {
        self.packets.iter().map(|p| p.samples() as u64).sum()
    }

    /// Returns the total bytes of compressed frame data.
    pub fn frame_bytes(&self) -> usize {
        self.packets
            .iter()
            .flat_map(|p| p.frames())
            .map(|f| f.len())
            .sum()
    }

    /// Clears the vendor string, comments and input sample rate.
    pub fn strip(&mut self) {
        self.tags = OpusTags::default();
        self.head.input_sample_rate = 0;
    }

    /// Builds the logical stream: a header page, a comment page, then audio
    /// pages filled greedily up to the policy's duration budget. Each audio
    /// page's granule position is the total sample count through that page.
    pub fn to_stream(&self, policy: &PagingPolicy) -> LogicalStream {
        let mut pages = vec![
            Page::new(0, vec![self.head.to_bytes()]),
            Page::new(0, vec![self.tags.to_bytes()]),
        ];

        let mut granule = 0u64;
        let mut rest = self.packets.as_slice();
        while !rest.is_empty() {
            let mut duration = 0u64;
            let mut segments = 0usize;
            let mut taken = 0;
            for packet in rest {
                let samples = packet.samples() as u64;
                let laced = lacing_len(packet.len());
                if taken > 0
                    && (duration + samples > policy.page_duration || segments + laced > MAX_SEGMENTS)
                {
                    break;
                }
                duration += samples;
                segments += laced;
                taken += 1;
            }
            let (page, tail) = rest.split_at(taken);
            granule += duration;
            pages.push(Page::new(granule, page.iter().map(|p| p.data().clone()).collect()));
            rest = tail;
        }

        LogicalStream::with_pages(self.serial, pages)
    }

    /// Serializes the file as an Ogg physical bitstream.
    pub fn to_bytes(&self, policy: &PagingPolicy) -> Result<Vec<u8>> {
        Ok(self.to_stream(policy).to_bytes()?)
    }
}

/// Returns the single packet on header page `index`.
fn header_packet(stream: &LogicalStream, index: usize) -> Result<&Bytes> {
    match stream.pages[index].packets.as_slice() {
        [packet] => Ok(packet),
        packets => Err(Error::HeaderPacketCount {
            page: index,
            count: packets.len(),
        }),
    }
}

impl TryFrom<&LogicalStream> for OpusFile {
    type Error = Error;

    fn try_from(stream: &LogicalStream) -> Result<Self> {
        Self::decode_stream(stream)
    }
}

impl From<&OpusFile> for LogicalStream {
    fn from(file: &OpusFile) -> Self {
        file.to_stream(&PagingPolicy::default())
    }
}

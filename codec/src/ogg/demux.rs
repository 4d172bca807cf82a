//! Ogg demuxer.
//!
//! Splits a fully buffered physical bitstream into its logical streams.
//! This is a validating reader: the first structural or sequencing problem
//! aborts the parse with an error positioned at the offending page.

use std::collections::HashMap;

use bytes::{Bytes, BytesMut};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::crc::page_checksum;
use super::error::{Error, ErrorKind, Result};
use super::page::{HEADER_SIZE, Page, PageHeader};
use super::stream::LogicalStream;

/// What to do when a page's stored checksum does not match its contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumMode {
    /// Do not verify checksums.
    Ignore,
    /// Log a warning and mark the page, but keep parsing.
    Warn,
    /// Fail with [`ErrorKind::ChecksumMismatch`].
    #[default]
    Reject,
}

/// Demuxer configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxOptions {
    pub checksum: ChecksumMode,
}

/// Checks a page checksum according to `mode`.
///
/// Returns whether the checksum matched.
pub(crate) fn verify_checksum(
    mode: ChecksumMode,
    page: &[u8],
    stored: u32,
    page_offset: usize,
) -> Result<bool> {
    if mode == ChecksumMode::Ignore {
        return Ok(true);
    }
    let computed = page_checksum(page);
    if computed == stored {
        return Ok(true);
    }
    match mode {
        ChecksumMode::Reject => Err(Error::new(
            ErrorKind::ChecksumMismatch { stored, computed },
            page_offset,
            page_offset + page.len(),
        )),
        _ => {
            warn!(
                page_offset,
                stored = format_args!("{stored:#010x}"),
                computed = format_args!("{computed:#010x}"),
                "ogg page checksum mismatch"
            );
            Ok(false)
        }
    }
}

/// Per-serial bookkeeping for a stream that has not seen its end page.
struct OpenStream {
    index: usize,
    last_page_offset: usize,
    partial: Option<BytesMut>,
}

/// Splits a physical bitstream into logical streams.
#[derive(Debug, Clone, Default)]
pub struct Demuxer {
    options: DemuxOptions,
}

impl Demuxer {
    /// Creates a demuxer with the given options.
    pub fn new(options: DemuxOptions) -> Self {
        Self { options }
    }

    /// Returns the demuxer options.
    pub fn options(&self) -> &DemuxOptions {
        &self.options
    }

    /// Demultiplexes `data` into its logical streams, in the order their
    /// start pages appear.
    ///
    /// Packets that fit within one page are zero-copy slices of `data`.
    pub fn demux(&self, data: impl Into<Bytes>) -> Result<Vec<LogicalStream>> {
        let data: Bytes = data.into();
        let mut streams: Vec<LogicalStream> = Vec::new();
        let mut open: HashMap<u32, OpenStream> = HashMap::new();
        let mut pos = 0;

        while pos < data.len() {
            pos = self.read_page(&data, pos, &mut streams, &mut open)?;
        }

        // Report the earliest stream still open.
        if let Some((serial, state)) = open.iter().min_by_key(|(_, s)| s.index) {
            let kind = if state.partial.is_some() {
                ErrorKind::IncompletePacket
            } else {
                ErrorKind::UnterminatedStream(*serial)
            };
            return Err(Error::new(kind, state.last_page_offset, data.len()));
        }

        Ok(streams)
    }

    /// Reads the page at `start` and returns the offset just past it.
    fn read_page(
        &self,
        data: &Bytes,
        start: usize,
        streams: &mut Vec<LogicalStream>,
        open: &mut HashMap<u32, OpenStream>,
    ) -> Result<usize> {
        let header = PageHeader::parse(data, start)?;
        let mut i = start + HEADER_SIZE;
        let err = |kind: ErrorKind, at: usize| Error::new(kind, start, at);

        let serial = header.serial;
        if header.is_bos() {
            if open.contains_key(&serial) {
                return Err(err(ErrorKind::MultipleStartPages(serial), i));
            }
            debug!(serial, offset = start, "ogg stream opened");
            open.insert(
                serial,
                OpenStream {
                    index: streams.len(),
                    last_page_offset: start,
                    partial: None,
                },
            );
            streams.push(LogicalStream::new(serial));
        }
        let state = open
            .get_mut(&serial)
            .ok_or_else(|| err(ErrorKind::NoStartPage(serial), i))?;
        state.last_page_offset = start;
        let stream = &mut streams[state.index];

        let expected = stream.pages.len() as u32;
        if header.sequence != expected {
            return Err(err(
                ErrorKind::SequenceMismatch {
                    expected,
                    got: header.sequence,
                },
                i,
            ));
        }

        let nsegs = header.segments as usize;
        if nsegs > data.len() - i {
            return Err(err(ErrorKind::Truncated, i));
        }
        let lacing = &data[i..i + nsegs];
        i += nsegs;

        let mut partial = state.partial.take();
        if partial.is_some() && !header.is_continuation() {
            return Err(err(ErrorKind::IncompletePacket, i));
        }

        let mut packets = Vec::new();
        let mut pk_start = i;
        for &len in lacing {
            let len = len as usize;
            if len > data.len() - i {
                return Err(err(ErrorKind::Truncated, i));
            }
            i += len;
            if len < 255 {
                let packet = match partial.take() {
                    Some(mut buf) => {
                        buf.extend_from_slice(&data[pk_start..i]);
                        buf.freeze()
                    }
                    None => data.slice(pk_start..i),
                };
                packets.push(packet);
                pk_start = i;
            }
        }
        if lacing.last() == Some(&255) {
            let mut buf = partial.unwrap_or_default();
            buf.extend_from_slice(&data[pk_start..i]);
            partial = Some(buf);
        }
        if partial.is_some() && header.is_eos() {
            return Err(err(ErrorKind::IncompletePacket, i));
        }

        let checksum_valid =
            verify_checksum(self.options.checksum, &data[start..i], header.checksum, start)?;

        stream.pages.push(Page {
            granule_position: header.granule_position,
            sequence: header.sequence,
            header_type: header.header_type,
            checksum: header.checksum,
            checksum_valid,
            packets,
        });

        if header.is_eos() {
            debug!(serial, pages = stream.pages.len(), "ogg stream closed");
            open.remove(&serial);
        } else {
            state.partial = partial;
        }

        Ok(i)
    }
}

/// Demultiplexes `data` with the default (strict) options.
pub fn demux(data: impl Into<Bytes>) -> Result<Vec<LogicalStream>> {
    Demuxer::default().demux(data)
}

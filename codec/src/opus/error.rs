//! Error types for the Opus mapping layer.

use crate::ogg;

/// Result type alias for Opus operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Opus packet and file handling.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("empty packet")]
    EmptyPacket,

    /// Code 1 packets split their payload into two equal halves.
    #[error("code 1 packet has odd number of payload bytes ({0})")]
    OddCodeOneLength(usize),

    #[error("truncated packet")]
    TruncatedPacket,

    #[error("code 3 packets not supported")]
    UnsupportedFrameCode3,

    /// Frames handed to the packet encoder do not fit the frame code.
    #[error("invalid frame layout: {0}")]
    InvalidFrameLayout(&'static str),

    #[error("frame of {0} bytes is too long")]
    FrameTooLong(usize),

    /// No configuration matches a mode/rate/duration combination.
    #[error("no opus configuration for {0}")]
    InvalidConfiguration(String),

    #[error("invalid packet duration {0} samples")]
    InvalidDuration(u32),

    #[error("audio packet {index}: {source}")]
    Packet {
        index: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("stream too short: {0} pages")]
    StreamTooShort(usize),

    #[error("page {page} must hold exactly one packet, found {count}")]
    HeaderPacketCount { page: usize, count: usize },

    #[error("missing {0} packet")]
    MissingMagic(&'static str),

    #[error("unknown version {0}")]
    UnsupportedVersion(u8),

    #[error("invalid header packet")]
    InvalidHeaderPacket,

    #[error("invalid comment packet")]
    InvalidCommentPacket,

    #[error("invalid UTF-8 in {field}")]
    InvalidUtf8 { field: &'static str },

    #[error("no opus stream")]
    NoOpusStream,

    #[error("unknown packet id {0}")]
    UnknownPacket(usize),

    #[error(transparent)]
    Ogg(#[from] ogg::Error),
}

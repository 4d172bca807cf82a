//! Error types for the Ogg framing layer.

use std::fmt;
use std::io;

/// Result type alias for Ogg operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What went wrong while reading or writing Ogg pages.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Not enough bytes for the capture pattern, fixed header, segment
    /// table or a declared packet length.
    #[error("truncated page")]
    Truncated,

    #[error("missing page header")]
    BadCapturePattern,

    #[error("unknown stream structure version {0}")]
    UnsupportedVersion(u8),

    #[error("stream {0:#010x} has multiple start pages")]
    MultipleStartPages(u32),

    #[error("stream {0:#010x} has no start page")]
    NoStartPage(u32),

    #[error("got sequence number {got}, expected {expected}")]
    SequenceMismatch { expected: u32, got: u32 },

    #[error("incomplete packet")]
    IncompletePacket,

    #[error("unterminated stream {0:#010x}")]
    UnterminatedStream(u32),

    /// Stored and recomputed page checksums differ.
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// A page would need more lacing values than the segment count allows.
    #[error("page needs {segments} lacing values, at most 255 allowed")]
    PageOverflow { segments: usize },

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// An Ogg error positioned in the input.
///
/// `page_offset` is where the offending page starts and `offset` is where
/// scanning stopped. For the muxer both point at the start of the page
/// being serialized.
#[derive(Debug)]
pub struct Error {
    pub kind: ErrorKind,
    pub page_offset: usize,
    pub offset: usize,
}

impl Error {
    pub fn new(kind: ErrorKind, page_offset: usize, offset: usize) -> Self {
        Self {
            kind,
            page_offset,
            offset,
        }
    }

    /// Returns true for checksum mismatches, which some producers are known
    /// to emit on otherwise well-formed pages.
    pub fn is_integrity(&self) -> bool {
        matches!(self.kind, ErrorKind::ChecksumMismatch { .. })
    }

    /// Returns true for sequencing violations (start/end pages, sequence
    /// numbers, packets left open).
    pub fn is_sequencing(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::MultipleStartPages(_)
                | ErrorKind::NoStartPage(_)
                | ErrorKind::SequenceMismatch { .. }
                | ErrorKind::IncompletePacket
                | ErrorKind::UnterminatedStream(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (page at offset {}, stopped at offset {})",
            self.kind, self.page_offset, self.offset
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Io(e) => Some(e),
            _ => None,
        }
    }
}

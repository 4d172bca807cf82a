//! Opus TOC (Table of Contents) parsing.
//!
//! Implements RFC 6716 Section 3.1.

use std::time::Duration;

use super::error::{Error, Result};

/// TOC byte from an Opus packet header.
///
/// Layout:
/// ```text
///          0 1 2 3 4 5 6 7
///         +-+-+-+-+-+-+-+-+
///         | config  |s| c |
///         +-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TOC(pub u8);

impl TOC {
    /// Creates a TOC from a byte.
    pub const fn new(byte: u8) -> Self {
        Self(byte)
    }

    /// Builds a TOC byte from its fields.
    pub fn from_parts(config: Configuration, stereo: bool, code: FrameCode) -> Self {
        Self(((config.0 & 0x1f) << 3) | ((stereo as u8) << 2) | code.bits())
    }

    /// Returns the configuration number (0-31).
    pub fn configuration(&self) -> Configuration {
        Configuration(self.0 >> 3)
    }

    /// Returns true if the TOC indicates stereo audio.
    pub fn is_stereo(&self) -> bool {
        (self.0 & 0b00000100) != 0
    }

    /// Returns the frame code (number of frames per packet).
    pub fn frame_code(&self) -> FrameCode {
        FrameCode::from_bits(self.0 & 0b00000011)
    }
}

impl std::fmt::Display for TOC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "opus_toc: stereo={}, mode={}, bw={}, {}, {}",
            self.is_stereo(),
            self.configuration().mode(),
            self.configuration().bandwidth(),
            self.frame_code(),
            self.configuration().frame_duration(),
        )
    }
}

/// Opus configuration number (0-31).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration(pub u8);

impl Configuration {
    /// Finds the configuration for a mode, internal sample rate and frame
    /// duration.
    pub fn from_parts(mode: ConfigurationMode, sample_rate: u32, duration: FrameDuration) -> Result<Self> {
        (0..32u8)
            .map(Configuration)
            .find(|c| {
                c.mode() == mode && c.sample_rate() == sample_rate && c.frame_duration() == duration
            })
            .ok_or_else(|| Error::InvalidConfiguration(format!("{mode} at {sample_rate} Hz, {duration}")))
    }

    /// Returns the configuration mode (SILK, CELT, or Hybrid).
    pub fn mode(&self) -> ConfigurationMode {
        match self.0 {
            0..=11 => ConfigurationMode::Silk,
            12..=15 => ConfigurationMode::Hybrid,
            _ => ConfigurationMode::CELT,
        }
    }

    /// Returns the audio bandwidth.
    pub fn bandwidth(&self) -> Bandwidth {
        const SILK: [Bandwidth; 3] = [Bandwidth::NB, Bandwidth::MB, Bandwidth::WB];
        const HYBRID: [Bandwidth; 2] = [Bandwidth::SWB, Bandwidth::FB];
        const CELT: [Bandwidth; 4] = [Bandwidth::NB, Bandwidth::WB, Bandwidth::SWB, Bandwidth::FB];
        let c = self.0 as usize;
        match self.mode() {
            ConfigurationMode::Silk => SILK[c >> 2],
            ConfigurationMode::Hybrid => HYBRID[(c >> 1) & 1],
            ConfigurationMode::CELT => CELT[(c >> 2) & 3],
        }
    }

    /// Returns the internal sample rate class in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.bandwidth().sample_rate()
    }

    /// Returns the duration of each frame.
    pub fn frame_duration(&self) -> FrameDuration {
        use FrameDuration::*;
        const SILK: [FrameDuration; 4] = [Duration10ms, Duration20ms, Duration40ms, Duration60ms];
        const HYBRID: [FrameDuration; 2] = [Duration10ms, Duration20ms];
        const CELT: [FrameDuration; 4] = [Duration2500us, Duration5ms, Duration10ms, Duration20ms];
        let c = self.0 as usize;
        match self.mode() {
            ConfigurationMode::Silk => SILK[c & 3],
            ConfigurationMode::Hybrid => HYBRID[c & 1],
            ConfigurationMode::CELT => CELT[c & 3],
        }
    }

    /// Returns the samples per frame at 48 kHz, which is also the granule
    /// position increment for one frame.
    pub fn frame_samples(&self) -> u32 {
        self.frame_duration().samples()
    }
}

/// Configuration mode (SILK, CELT, or Hybrid).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigurationMode {
    Silk,
    CELT,
    Hybrid,
}

impl std::fmt::Display for ConfigurationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Silk => write!(f, "Silk"),
            Self::CELT => write!(f, "CELT"),
            Self::Hybrid => write!(f, "Hybrid"),
        }
    }
}

/// Frame code indicating number of frames per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCode {
    /// One frame in the packet.
    OneFrame,
    /// Two frames with equal compressed size.
    TwoEqualFrames,
    /// Two frames with different compressed sizes.
    TwoDifferentFrames,
    /// Arbitrary number of frames.
    ArbitraryFrames,
}

impl FrameCode {
    fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::OneFrame,
            1 => Self::TwoEqualFrames,
            2 => Self::TwoDifferentFrames,
            _ => Self::ArbitraryFrames,
        }
    }

    /// Returns the 2-bit code.
    pub fn bits(&self) -> u8 {
        match self {
            Self::OneFrame => 0,
            Self::TwoEqualFrames => 1,
            Self::TwoDifferentFrames => 2,
            Self::ArbitraryFrames => 3,
        }
    }
}

impl std::fmt::Display for FrameCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OneFrame => write!(f, "One Frame"),
            Self::TwoEqualFrames => write!(f, "Two Equal Frames"),
            Self::TwoDifferentFrames => write!(f, "Two Different Frames"),
            Self::ArbitraryFrames => write!(f, "Arbitrary Frames"),
        }
    }
}

/// Frame duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameDuration {
    Duration2500us,
    Duration5ms,
    Duration10ms,
    Duration20ms,
    Duration40ms,
    Duration60ms,
}

impl FrameDuration {
    /// Returns the duration as a Duration.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Duration2500us => Duration::from_micros(2500),
            Self::Duration5ms => Duration::from_millis(5),
            Self::Duration10ms => Duration::from_millis(10),
            Self::Duration20ms => Duration::from_millis(20),
            Self::Duration40ms => Duration::from_millis(40),
            Self::Duration60ms => Duration::from_millis(60),
        }
    }

    /// Returns the number of samples at 48 kHz.
    pub fn samples(&self) -> u32 {
        match self {
            Self::Duration2500us => 120,
            Self::Duration5ms => 240,
            Self::Duration10ms => 480,
            Self::Duration20ms => 960,
            Self::Duration40ms => 1920,
            Self::Duration60ms => 2880,
        }
    }

    /// Returns the duration lasting `samples` at 48 kHz, if it is one.
    pub fn from_samples(samples: u32) -> Option<Self> {
        match samples {
            120 => Some(Self::Duration2500us),
            240 => Some(Self::Duration5ms),
            480 => Some(Self::Duration10ms),
            960 => Some(Self::Duration20ms),
            1920 => Some(Self::Duration40ms),
            2880 => Some(Self::Duration60ms),
            _ => None,
        }
    }
}

impl std::fmt::Display for FrameDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duration2500us => write!(f, "2.5ms"),
            Self::Duration5ms => write!(f, "5ms"),
            Self::Duration10ms => write!(f, "10ms"),
            Self::Duration20ms => write!(f, "20ms"),
            Self::Duration40ms => write!(f, "40ms"),
            Self::Duration60ms => write!(f, "60ms"),
        }
    }
}

/// Audio bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bandwidth {
    /// Narrowband (4 kHz audio, 8 kHz sample rate)
    NB,
    /// Medium-band (6 kHz audio, 12 kHz sample rate)
    MB,
    /// Wideband (8 kHz audio, 16 kHz sample rate)
    WB,
    /// Super-wideband (12 kHz audio, 24 kHz sample rate)
    SWB,
    /// Fullband (20 kHz audio, 48 kHz sample rate)
    FB,
}

impl Bandwidth {
    /// Returns the effective sample rate for this bandwidth.
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::NB => 8000,
            Self::MB => 12000,
            Self::WB => 16000,
            Self::SWB => 24000,
            Self::FB => 48000,
        }
    }
}

impl std::fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NB => write!(f, "Narrowband"),
            Self::MB => write!(f, "Mediumband"),
            Self::WB => write!(f, "Wideband"),
            Self::SWB => write!(f, "Superwideband"),
            Self::FB => write!(f, "Fullband"),
        }
    }
}

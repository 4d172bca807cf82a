//! Opus stream report.

use std::collections::BTreeMap;

use clap::Args;
use serde::Serialize;

use opuscraft_codec::opus::{OpusFile, OpusPacket};

use super::load_opus;
use crate::Cli;
use crate::config::Config;
use crate::output::Output;

/// Show Opus stream headers and packet statistics.
#[derive(Args)]
pub struct InfoCommand {
    /// Input file
    file: String,

    /// Include a per-packet listing
    #[arg(long)]
    packets: bool,
}

#[derive(Debug, Serialize)]
struct InfoReport {
    serial: String,
    channels: u8,
    pre_skip: u16,
    input_sample_rate: u32,
    output_gain_db: f64,
    mapping_family: u8,
    vendor: String,
    comments: Vec<String>,
    packets: usize,
    total_samples: u64,
    duration_secs: f64,
    frame_bytes: usize,
    bitrate_kbps: f64,
    /// Packet counts by mode, bandwidth and frame duration
    configurations: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    packet_list: Option<Vec<PacketReport>>,
}

#[derive(Debug, Serialize)]
struct PacketReport {
    mode: String,
    sample_rate: u32,
    frame_duration: String,
    stereo: bool,
    samples: u32,
    length: usize,
    frame_sizes: Vec<usize>,
}

impl From<&OpusPacket> for PacketReport {
    fn from(packet: &OpusPacket) -> Self {
        Self {
            mode: packet.mode().to_string(),
            sample_rate: packet.sample_rate(),
            frame_duration: packet.frame_duration().to_string(),
            stereo: packet.is_stereo(),
            samples: packet.samples(),
            length: packet.len(),
            frame_sizes: packet.frames().iter().map(|f| f.len()).collect(),
        }
    }
}

impl From<&OpusFile> for InfoReport {
    fn from(file: &OpusFile) -> Self {
        let total_samples = file.total_samples();
        let duration_secs = total_samples as f64 / 48000.0;
        let packet_bytes: usize = file.packets.iter().map(|p| p.len()).sum();
        let bitrate_kbps = if duration_secs > 0.0 {
            packet_bytes as f64 * 8.0 / duration_secs / 1000.0
        } else {
            0.0
        };

        let mut configurations = BTreeMap::new();
        for packet in &file.packets {
            let config = packet.configuration();
            let key = format!(
                "{} {} {}",
                config.mode(),
                config.bandwidth(),
                config.frame_duration()
            );
            *configurations.entry(key).or_insert(0) += 1;
        }

        Self {
            serial: format!("{:#010x}", file.serial),
            channels: file.head.channels,
            pre_skip: file.head.pre_skip,
            input_sample_rate: file.head.input_sample_rate,
            output_gain_db: file.head.output_gain_db(),
            mapping_family: file.head.mapping_family,
            vendor: file.tags.vendor.clone(),
            comments: file.tags.comments.clone(),
            packets: file.packets.len(),
            total_samples,
            duration_secs,
            frame_bytes: file.frame_bytes(),
            bitrate_kbps,
            configurations,
            packet_list: None,
        }
    }
}

impl InfoCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = Config::from_cli(cli)?;
        let file = load_opus(&config, &self.file)?;
        let mut report = InfoReport::from(&file);
        if self.packets {
            report.packet_list = Some(file.packets.iter().map(PacketReport::from).collect());
        }
        Output::from_cli(cli).write(&report)
    }
}

//! Ogg page structure report.

use clap::Args;
use serde::Serialize;

use opuscraft_codec::ogg::{Demuxer, LogicalStream, Page, PageReader, RawPage, flags};

use super::read_input;
use crate::Cli;
use crate::config::Config;
use crate::output::Output;

/// Show the Ogg page structure of a file.
///
/// By default the file is fully validated and reported per logical stream.
/// With `--raw`, physical pages are listed in file order without grouping
/// them into streams, which also works on files the demuxer rejects.
#[derive(Args)]
pub struct OggCommand {
    /// Input file
    file: String,

    /// List physical pages without stream validation
    #[arg(long)]
    raw: bool,
}

#[derive(Debug, Serialize)]
struct StreamReport {
    serial: String,
    pages: usize,
    packets: usize,
    granule_position: u64,
    page_list: Vec<PageReport>,
}

#[derive(Debug, Serialize)]
struct PageReport {
    sequence: u32,
    granule_position: u64,
    flags: Vec<&'static str>,
    packet_sizes: Vec<usize>,
    checksum: String,
    checksum_valid: bool,
}

#[derive(Debug, Serialize)]
struct RawPageReport {
    offset: usize,
    size: usize,
    serial: String,
    sequence: u32,
    granule_position: u64,
    flags: Vec<&'static str>,
    fragments: Vec<usize>,
    ends_open: bool,
    checksum_valid: bool,
}

fn flag_names(header_type: u8) -> Vec<&'static str> {
    [
        (flags::CONTINUATION, "continuation"),
        (flags::BOS, "bos"),
        (flags::EOS, "eos"),
    ]
    .into_iter()
    .filter(|(bit, _)| header_type & bit != 0)
    .map(|(_, name)| name)
    .collect()
}

impl From<&Page> for PageReport {
    fn from(page: &Page) -> Self {
        Self {
            sequence: page.sequence,
            granule_position: page.granule_position,
            flags: flag_names(page.header_type),
            packet_sizes: page.packets.iter().map(|p| p.len()).collect(),
            checksum: format!("{:#010x}", page.checksum),
            checksum_valid: page.checksum_valid,
        }
    }
}

impl From<&LogicalStream> for StreamReport {
    fn from(stream: &LogicalStream) -> Self {
        Self {
            serial: format!("{:#010x}", stream.serial),
            pages: stream.pages.len(),
            packets: stream.packets().count(),
            granule_position: stream.granule_position(),
            page_list: stream.pages.iter().map(PageReport::from).collect(),
        }
    }
}

impl From<&RawPage> for RawPageReport {
    fn from(page: &RawPage) -> Self {
        Self {
            offset: page.offset,
            size: page.len(),
            serial: format!("{:#010x}", page.header.serial),
            sequence: page.header.sequence,
            granule_position: page.header.granule_position,
            flags: flag_names(page.header.header_type),
            fragments: page.fragment_lengths(),
            ends_open: page.ends_open(),
            checksum_valid: page.checksum_valid,
        }
    }
}

impl OggCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = Config::from_cli(cli)?;
        let output = Output::from_cli(cli);
        let data = read_input(&self.file)?;

        if self.raw {
            output.write(&raw_report(&config, &data)?)
        } else {
            output.write(&stream_report(&config, data)?)
        }
    }
}

fn stream_report(config: &Config, data: Vec<u8>) -> anyhow::Result<Vec<StreamReport>> {
    let streams = Demuxer::new(config.demux).demux(data)?;
    Ok(streams.iter().map(StreamReport::from).collect())
}

fn raw_report(config: &Config, data: &[u8]) -> anyhow::Result<Vec<RawPageReport>> {
    let mut pages = Vec::new();
    for page in PageReader::new(data, config.demux.checksum) {
        pages.push(RawPageReport::from(&page?));
    }
    Ok(pages)
}

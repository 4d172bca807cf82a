//! CLI commands.

mod info;
mod ogg;
mod remux;
mod strip;

pub use info::InfoCommand;
pub use ogg::OggCommand;
pub use remux::RemuxCommand;
pub use strip::StripCommand;

use anyhow::Context;
use tracing::debug;

use opuscraft_codec::ogg::Demuxer;
use opuscraft_codec::opus::OpusFile;

use crate::Cli;
use crate::config::Config;

/// Reads an input file.
pub(crate) fn read_input(path: &str) -> anyhow::Result<Vec<u8>> {
    let data = std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
    debug!(path, bytes = data.len(), "read input");
    Ok(data)
}

/// Reads and decodes the Opus stream in `path`.
pub(crate) fn load_opus(config: &Config, path: &str) -> anyhow::Result<OpusFile> {
    let data = read_input(path)?;
    let demuxer = Demuxer::new(config.demux);
    OpusFile::decode_ogg_with(&demuxer, data).with_context(|| format!("failed to decode {path}"))
}

/// Returns the `--output` path, required by commands that write a file.
pub(crate) fn output_path(cli: &Cli) -> anyhow::Result<&str> {
    cli.output
        .as_deref()
        .context("an output file is required (-o/--output)")
}

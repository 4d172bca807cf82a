//! Metadata stripping.

use clap::Args;
use tracing::info;

use super::{load_opus, output_path};
use crate::Cli;
use crate::config::Config;
use crate::output::write_binary;

/// Remove tags and the input sample rate, keeping the audio packets.
///
/// The vendor string and all comments are cleared. Packets are re-paged
/// with the configured page duration.
#[derive(Args)]
pub struct StripCommand {
    /// Input file
    file: String,
}

impl StripCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let config = Config::from_cli(cli)?;
        let out = output_path(cli)?;

        let mut file = load_opus(&config, &self.file)?;
        let removed = file.tags.comments.len();
        file.strip();

        let data = file.to_bytes(&config.paging)?;
        write_binary(&data, out)?;
        info!(input = %self.file, output = out, removed, bytes = data.len(), "stripped");
        Ok(())
    }
}

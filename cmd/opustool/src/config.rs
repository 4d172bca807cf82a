//! Configuration file handling.

use std::fs;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use opuscraft_codec::ogg::DemuxOptions;
use opuscraft_codec::opus::PagingPolicy;

use crate::Cli;

/// Tool configuration, read from a YAML file.
///
/// ```yaml
/// demux:
///   checksum: warn
/// paging:
///   page_duration: 96000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub demux: DemuxOptions,
    pub paging: PagingPolicy,
}

impl Config {
    /// Loads a config file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path).with_context(|| format!("failed to read config {path}"))?;
        let config: Config =
            serde_yaml::from_str(&data).with_context(|| format!("failed to parse config {path}"))?;
        debug!(path, ?config, "loaded config");
        Ok(config)
    }

    /// Builds the effective config: the `--config` file if given, with
    /// command line flags applied on top.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Some(mode) = cli.checksum {
            config.demux.checksum = mode.into();
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use opuscraft_codec::ogg::ChecksumMode;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load() {
        let file = write_config("demux:\n  checksum: warn\npaging:\n  page_duration: 96000\n");
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.demux.checksum, ChecksumMode::Warn);
        assert_eq!(config.paging.page_duration, 96000);
    }

    #[test]
    fn test_load_partial() {
        let file = write_config("paging:\n  page_duration: 960\n");
        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.demux.checksum, ChecksumMode::Reject);
        assert_eq!(config.paging.page_duration, 960);
    }

    #[test]
    fn test_load_missing() {
        assert!(Config::load("/nonexistent/opustool.yaml").is_err());
    }

    #[test]
    fn test_flag_overrides_file() {
        let file = write_config("demux:\n  checksum: ignore\n");
        let path = file.path().to_str().unwrap();
        let cli = Cli::parse_from(["opustool", "--config", path, "--checksum", "warn", "ogg", "x.opus"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.demux.checksum, ChecksumMode::Warn);

        let cli = Cli::parse_from(["opustool", "--config", path, "ogg", "x.opus"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.demux.checksum, ChecksumMode::Ignore);
    }
}

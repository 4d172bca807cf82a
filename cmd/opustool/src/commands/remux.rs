//! Re-muxing with new tags or paging.

use clap::Args;
use tracing::info;

use opuscraft_codec::opus::OpusTags;

use super::{load_opus, output_path};
use crate::Cli;
use crate::config::Config;
use crate::output::write_binary;

/// Rewrite a file with new tags, serial number or page duration.
///
/// Audio packets are copied unchanged. `--comment` replaces every existing
/// comment with the same key (compared case-insensitively).
#[derive(Args)]
pub struct RemuxCommand {
    /// Input file
    file: String,

    /// Vendor string
    #[arg(long)]
    vendor: Option<String>,

    /// Set a comment (KEY=VALUE), may be repeated
    #[arg(long = "comment", value_parser = parse_comment)]
    comments: Vec<String>,

    /// Drop existing comments before applying --comment
    #[arg(long)]
    clear_comments: bool,

    /// Page duration in samples at 48 kHz, overrides the config file
    #[arg(long)]
    page_duration: Option<u64>,

    /// Serial number of the output stream
    #[arg(long)]
    serial: Option<u32>,
}

fn parse_comment(s: &str) -> Result<String, String> {
    match s.split_once('=') {
        Some((key, _)) if !key.is_empty() => Ok(s.to_string()),
        _ => Err(format!("expected KEY=VALUE, got {s:?}")),
    }
}

fn comment_key(comment: &str) -> &str {
    comment.split_once('=').map_or(comment, |(key, _)| key)
}

impl RemuxCommand {
    pub fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let mut config = Config::from_cli(cli)?;
        if let Some(duration) = self.page_duration {
            config.paging.page_duration = duration;
        }
        let out = output_path(cli)?;

        let mut file = load_opus(&config, &self.file)?;
        self.apply_tags(&mut file.tags);
        if let Some(serial) = self.serial {
            file.serial = serial;
        }

        let data = file.to_bytes(&config.paging)?;
        write_binary(&data, out)?;
        info!(
            input = %self.file,
            output = out,
            page_duration = config.paging.page_duration,
            bytes = data.len(),
            "remuxed"
        );
        Ok(())
    }

    fn apply_tags(&self, tags: &mut OpusTags) {
        if let Some(vendor) = &self.vendor {
            tags.vendor = vendor.clone();
        }
        if self.clear_comments {
            tags.comments.clear();
        }
        for comment in &self.comments {
            let key = comment_key(comment);
            tags.comments.retain(|c| !comment_key(c).eq_ignore_ascii_case(key));
            tags.comments.push(comment.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::{sample_file, write_sample};
    use clap::Parser;
    use opuscraft_codec::ogg;
    use opuscraft_codec::opus::OpusFile;

    #[test]
    fn test_parse_comment() {
        assert_eq!(parse_comment("TITLE=x").unwrap(), "TITLE=x");
        assert_eq!(parse_comment("EMPTY=").unwrap(), "EMPTY=");
        assert!(parse_comment("novalue").is_err());
        assert!(parse_comment("=x").is_err());
    }

    #[test]
    fn test_remux() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(dir.path(), "in.opus", &sample_file(20));
        let out = dir.path().join("out.opus");

        let cli = Cli::parse_from([
            "opustool",
            "remux",
            input.as_str(),
            "-o",
            out.to_str().unwrap(),
            "--vendor",
            "opustool",
            "--comment",
            "title=Renamed",
            "--comment",
            "ARTIST=Someone",
            "--page-duration",
            "4800",
            "--serial",
            "42",
        ]);
        cli.run().unwrap();

        let data = std::fs::read(&out).unwrap();
        let streams = ogg::demux(data.clone()).unwrap();
        assert_eq!(streams[0].serial, 42);
        // 20 packets of 960 samples, 5 per page
        assert_eq!(streams[0].pages.len(), 2 + 4);

        let file = OpusFile::decode_ogg(data).unwrap();
        assert_eq!(file.tags.vendor, "opustool");
        assert_eq!(
            file.tags.comments,
            vec!["ENCODER=test", "title=Renamed", "ARTIST=Someone"]
        );
        assert_eq!(file.packets, sample_file(20).packets);
    }

    #[test]
    fn test_remux_clear_comments() {
        let cmd = RemuxCommand {
            file: String::new(),
            vendor: None,
            comments: vec!["A=1".to_string()],
            clear_comments: true,
            page_duration: None,
            serial: None,
        };
        let mut tags = sample_file(0).tags;
        cmd.apply_tags(&mut tags);
        assert_eq!(tags.vendor, "libopus 1.4");
        assert_eq!(tags.comments, vec!["A=1"]);
    }
}

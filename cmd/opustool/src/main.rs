//! opustool - inspect and re-mux Ogg/Opus files.

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod output;

use commands::{InfoCommand, OggCommand, RemuxCommand, StripCommand};
use opuscraft_codec::ogg::ChecksumMode;

/// opustool - inspect and re-mux Ogg/Opus files.
///
/// Reports page and stream structure, decodes Opus headers and packet
/// layout, and rewrites files with new metadata or paging.
#[derive(Parser)]
#[command(name = "opustool")]
#[command(about = "Ogg/Opus inspection and re-muxing tool")]
#[command(version)]
pub struct Cli {
    /// Config file (YAML)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Page checksum handling, overrides the config file
    #[arg(long, global = true, value_enum)]
    pub checksum: Option<ChecksumArg>,

    /// Output file (reports default to stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Output reports as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the Ogg page structure of a file
    Ogg(OggCommand),
    /// Show Opus stream headers and packet statistics
    Info(InfoCommand),
    /// Remove tags and the input sample rate
    Strip(StripCommand),
    /// Rewrite a file with new tags or page duration
    Remux(RemuxCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChecksumArg {
    Ignore,
    Warn,
    Reject,
}

impl From<ChecksumArg> for ChecksumMode {
    fn from(arg: ChecksumArg) -> Self {
        match arg {
            ChecksumArg::Ignore => ChecksumMode::Ignore,
            ChecksumArg::Warn => ChecksumMode::Warn,
            ChecksumArg::Reject => ChecksumMode::Reject,
        }
    }
}

impl Cli {
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Ogg(cmd) => cmd.run(self),
            Commands::Info(cmd) => cmd.run(self),
            Commands::Strip(cmd) => cmd.run(self),
            Commands::Remux(cmd) => cmd.run(self),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    cli.run()
}

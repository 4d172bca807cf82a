//! Output utilities.

use std::{fs::File, io::Write};

use serde::Serialize;

use crate::Cli;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// YAML format (default).
    #[default]
    Yaml,
    /// JSON format.
    Json,
}

/// Where and how reports are written.
pub struct Output {
    pub format: OutputFormat,
    pub file: Option<String>,
}

impl Output {
    pub fn new(format: OutputFormat, file: Option<String>) -> Self {
        Self { format, file }
    }

    /// Report output as selected by `--json` and `--output`.
    pub fn from_cli(cli: &Cli) -> Self {
        let format = if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        };
        Self::new(format, cli.output.clone())
    }

    /// Renders a report.
    pub fn render<T: Serialize>(&self, value: &T) -> anyhow::Result<String> {
        Ok(match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }

    /// Writes a report to the output file, or stdout.
    pub fn write<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let output = self.render(value)?;
        match &self.file {
            Some(path) => {
                let mut file = File::create(path)?;
                file.write_all(output.as_bytes())?;
            }
            None => {
                println!("{}", output);
            }
        }
        Ok(())
    }
}

/// Writes binary data to a file.
pub fn write_binary(data: &[u8], path: &str) -> anyhow::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Report {
        name: &'static str,
        pages: u32,
    }

    #[test]
    fn test_render() {
        let report = Report { name: "a", pages: 3 };
        let yaml = Output::new(OutputFormat::Yaml, None).render(&report).unwrap();
        assert!(yaml.contains("pages: 3"));
        let json = Output::new(OutputFormat::Json, None).render(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["name"], "a");
    }

    #[test]
    fn test_write_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let output = Output::new(OutputFormat::Json, Some(path.to_str().unwrap().to_string()));
        output.write(&Report { name: "b", pages: 1 }).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"pages\": 1"));
    }
}

//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod parse;
pub mod simulate;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use marginsim_core::models::config::SimConfig;

/// Output format shared by `parse`, `simulate` and `batch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for written output.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// How input text should be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum InputFormat {
    /// Pasted tabular quote text
    Text,
    /// Structured JSON line items
    Json,
}

impl InputFormat {
    /// Guess from a file extension, defaulting to text.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => InputFormat::Json,
            _ => InputFormat::Text,
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marginsim")
        .join("config.json")
}

/// Load the config from `--config`, else the default file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SimConfig> {
    if let Some(path) = config_path {
        return SimConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(SimConfig::from_file(&path)?)
    } else {
        Ok(SimConfig::default())
    }
}

/// Read a file, or stdin when the path is `-`.
pub fn read_input(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(text);
    }

    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

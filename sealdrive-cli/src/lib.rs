//! Library half of the `sealdrive` command-line client.
//!
//! Parsing, configuration and command execution live here so they can be
//! driven from tests; `main.rs` only wires up logging and the terminal.

mod commands;
mod config;
mod prompt;

pub use commands::{Command, Session, format_row, guess_content_type};
pub use config::{CliConfig, DEFAULT_CONFIG_FILE};
pub use prompt::TerminalPrompt;

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sealdrive")]
#[command(about = "Passphrase-encrypted file storage")]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Data directory, overriding the config file
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Owner whose files are managed
    #[arg(short, long, env = "SEALDRIVE_OWNER")]
    pub owner: String,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads the config file and applies command-line overrides.
    pub fn resolve_config(&self) -> anyhow::Result<CliConfig> {
        let mut config = CliConfig::load(self.config.as_deref())?;
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        Ok(config)
    }
}

//! sealdrive command-line client.
//!
//! Usage:
//!   sealdrive --owner alice upload report.pdf
//!   sealdrive --owner alice list --recent
//!   sealdrive --owner alice download <id> --out report.pdf
//!
//! Passphrases are read from the terminal and never stored.

use anyhow::{Context, Result};
use clap::Parser;
use sealdrive_cli::{Cli, Session, TerminalPrompt};
use sealdrive_types::OwnerId;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.resolve_config()?;
    let owner = OwnerId::parse(&cli.owner).context("Invalid owner")?;
    let session = Session::open(&config, owner).await?;

    let mut stdout = std::io::stdout();
    session.run(cli.command, &TerminalPrompt, &mut stdout).await
}

fn init_logging(verbose: bool) {
    let log_level = if verbose { Level::DEBUG } else { Level::WARN };
    let builder = FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();
    match EnvFilter::try_from_default_env() {
        Ok(filter) if !verbose => builder.with_env_filter(filter).init(),
        _ => builder.with_max_level(log_level).init(),
    }
}

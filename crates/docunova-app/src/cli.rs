use std::path::PathBuf;

use clap::Parser;

/// DocuNova: ask questions about your documents from the terminal.
#[derive(Parser, Debug)]
#[command(name = "docunova", version, about)]
pub struct Args {
    /// Ask one question, print the answer, and exit.
    #[arg(short = 'a', long)]
    pub ask: Option<String>,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. `docunova=debug`).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Bearer token for the backend. Falls back to `DOCUNOVA_TOKEN`.
    #[arg(long)]
    pub token: Option<String>,

    /// State file path override.
    #[arg(long, conflicts_with = "ephemeral")]
    pub state_file: Option<PathBuf>,

    /// Keep token, selection and preferences in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    pub print_config: bool,
}

pub fn parse() -> Args {
    Args::parse()
}

use clap::Parser;
use std::path::PathBuf;

/// Reset a hosted AuraFlow POS backend and load demonstration data.
///
/// Reads SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY from the environment
/// or a .env file. Every run deletes all existing rows first.
#[derive(Debug, Parser)]
#[command(name = "auraflow-seed")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Do not ask before deleting existing data
    #[arg(short, long)]
    pub yes: bool,

    /// User id that sample orders are attributed to; empty skips orders
    #[arg(short, long, value_name = "ID")]
    pub operator: Option<String>,

    /// Load the dataset from a YAML file instead of the built-in one
    #[arg(short, long, value_name = "PATH")]
    pub dataset: Option<PathBuf>,

    /// Run against an in-memory store; nothing is sent to the backend
    #[arg(long)]
    pub dry_run: bool,
}

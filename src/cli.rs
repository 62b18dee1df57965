//! Command-line arguments

use clap::{ArgAction, Parser};
use std::path::PathBuf;

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Clone, Debug, Parser)]
#[command(
    author,
    version,
    about = "ftpmirror - wipe remote FTP directories and re-upload local trees, per project"
)]
pub struct Args {
    /// Project list (JSON, or TOML when the extension is .toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Only mirror the named project (repeatable)
    #[arg(short, long = "project", action = ArgAction::Append)]
    pub projects: Vec<String>,

    /// Debug-level logging for individual remote operations
    #[arg(short, long)]
    pub verbose: bool,

    /// Also append log lines to this file
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,

    /// Validate the configuration and exit without connecting
    #[arg(long)]
    pub check: bool,
}

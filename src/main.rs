//! ftpmirror - per-project destructive FTP mirroring
//!
//! For every configured project: connect, wipe the remote root, upload the
//! local tree, disconnect. A failing project is logged and skipped.

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, info, warn};

use ftpmirror::cli::Args;
use ftpmirror::ftp::FtpConnector;
use ftpmirror::{logger, run_all, Config, MirrorEngine};

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    logger::init(args.verbose, args.log_file.as_deref())?;

    ctrlc::set_handler(move || {
        warn!("interrupted by user, exiting");
        // Exit immediately with 130 (128 + SIGINT)
        std::process::exit(130);
    })
    .context("Error setting Ctrl-C handler")?;

    debug!(config = %args.config.display(), "loading configuration");
    let config = Config::load(&args.config).context("Failed to load configuration")?;
    let projects = config.select(&args.projects)?;

    if args.check {
        for p in &projects {
            info!(
                project = %p.name,
                local = %p.local_path.display(),
                remote = %p.remote_path,
                host = %p.endpoint.address(),
                "configured"
            );
        }
        info!(projects = projects.len(), "configuration OK");
        return Ok(ExitCode::SUCCESS);
    }

    if projects.is_empty() {
        warn!("no projects configured, nothing to do");
    }

    let engine = MirrorEngine::new(FtpConnector);
    let summary = run_all(&engine, &projects);
    Ok(ExitCode::from(summary.exit_code()))
}

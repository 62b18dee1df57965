//! ftpmirror library
//!
//! Destructive one-way mirroring of local directory trees onto FTP servers,
//! one configured project at a time.

pub mod cli;
pub mod config;
pub mod error;
pub mod fs_enum;
pub mod ftp;
pub mod logger;
pub mod mirror;
pub mod remote;
pub mod runner;

pub use config::{Config, Endpoint, ProjectSpec};
pub use error::{ConfigError, MirrorError, RemoteError};
pub use mirror::{MirrorEngine, MirrorStats};
pub use runner::{run_all, RunSummary};

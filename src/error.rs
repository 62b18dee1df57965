//! Error taxonomy for configuration loading and per-project mirroring

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by a remote store transport.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("ftp: {0}")]
    Ftp(#[from] suppaftp::FtpError),

    #[error("i/o: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Protocol(String),
}

/// Failure of one project's mirror run. Each variant names the step that
/// failed; the runner logs it and moves on to the next project.
#[derive(Error, Debug)]
pub enum MirrorError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: RemoteError,
    },

    #[error("login as {username} failed: {source}")]
    Auth {
        username: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to list remote root {path}: {source}")]
    List {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to delete remote entry {path}: {source}")]
    Delete {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to walk local tree at {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read local file {}: {source}", path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create remote directory {path}: {source}")]
    RemoteDir {
        path: String,
        #[source]
        source: RemoteError,
    },

    #[error("failed to store {} as {remote}: {source}", local.display())]
    RemoteStore {
        local: PathBuf,
        remote: String,
        #[source]
        source: RemoteError,
    },
}

impl MirrorError {
    /// Short name of the step that failed.
    pub fn phase(&self) -> &'static str {
        match self {
            MirrorError::Connect { .. } => "connect",
            MirrorError::Auth { .. } => "auth",
            MirrorError::List { .. } => "list",
            MirrorError::Delete { .. } => "delete",
            MirrorError::Walk { .. } => "walk",
            MirrorError::LocalRead { .. } => "local-read",
            MirrorError::RemoteDir { .. } => "remote-dir",
            MirrorError::RemoteStore { .. } => "remote-store",
        }
    }
}

/// Fatal configuration failure. Nothing is mirrored when one of these occurs.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("no project named '{0}' in configuration")]
    UnknownProject(String),
}

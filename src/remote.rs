//! Remote store capability traits and remote path helpers
//!
//! The mirror engine only talks to a remote through these traits. The FTP
//! adapter lives in `ftp.rs`; tests provide an in-memory store.

use std::io::Read;
use std::path::{Component, Path};
use std::time::Duration;

use crate::config::Endpoint;
use crate::error::RemoteError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// One immediate child of a listed remote directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl RemoteEntry {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
        }
    }

    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Directory,
        }
    }
}

/// Opens unauthenticated sessions to an endpoint.
pub trait Connector {
    type Session: RemoteSession;

    fn connect(&self, endpoint: &Endpoint, timeout: Duration) -> Result<Self::Session, RemoteError>;
}

/// An open connection to a remote store. Calls are blocking and issued one
/// at a time.
pub trait RemoteSession {
    fn login(&mut self, username: &str, password: &str) -> Result<(), RemoteError>;

    /// Immediate children of `path`, without `.` and `..`.
    fn list(&mut self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError>;

    fn delete_file(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Remove `path` and everything below it.
    fn delete_dir_recursive(&mut self, path: &str) -> Result<(), RemoteError>;

    fn make_dir(&mut self, path: &str) -> Result<(), RemoteError>;

    /// Store the full contents of `reader` at `path`, returning bytes written.
    fn store<R: Read>(&mut self, path: &str, reader: &mut R) -> Result<u64, RemoteError>;

    fn quit(&mut self) -> Result<(), RemoteError>;
}

/// Join a remote directory and a `/`-separated relative path without
/// doubling separators. `"/"` stays the root.
pub fn remote_join(root: &str, relative: &str) -> String {
    let relative = relative.trim_start_matches('/');
    let base = root.trim_end_matches('/');
    if relative.is_empty() {
        return if base.is_empty() && root.starts_with('/') {
            "/".to_string()
        } else {
            base.to_string()
        };
    }
    format!("{base}/{relative}")
}

/// Render a relative local path with `/` separators for use on the remote.
/// Non-UTF-8 names are converted lossily.
pub fn to_remote_relative(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Every proper prefix of `path` plus `path` itself, shortest first.
/// `"/a/b"` yields `["/a", "/a/b"]`.
pub fn remote_ancestors(path: &str) -> Vec<String> {
    let absolute = path.starts_with('/');
    let mut out = Vec::new();
    let mut current = String::new();
    for part in path.split('/').filter(|p| !p.is_empty()) {
        if !current.is_empty() || absolute {
            current.push('/');
        }
        current.push_str(part);
        out.push(current.clone());
    }
    out
}

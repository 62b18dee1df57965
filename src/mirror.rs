//! Mirror engine: wipe a project's remote root and rebuild it from the local
//! tree.
//!
//! Steps run strictly in order and each one returns a typed error:
//! connect, login, wipe, walk-and-upload, quit. The session is closed on a
//! best-effort basis whatever happened after a successful connect.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::ProjectSpec;
use crate::error::MirrorError;
use crate::fs_enum::{FileFilter, LocalTree};
use crate::remote::{
    remote_ancestors, remote_join, to_remote_relative, Connector, EntryKind, RemoteSession,
};

const UPLOAD_BUFFER_SIZE: usize = 256 * 1024;

/// Statistics for one project's mirror run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorStats {
    pub remote_entries_deleted: u64,
    pub dirs_created: u64,
    pub files_uploaded: u64,
    pub bytes_uploaded: u64,
}

impl MirrorStats {
    pub fn add_file(&mut self, bytes: u64) {
        self.files_uploaded += 1;
        self.bytes_uploaded += bytes;
    }
}

pub struct MirrorEngine<C> {
    connector: C,
    connect_timeout: Option<Duration>,
}

impl<C: Connector> MirrorEngine<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            connect_timeout: None,
        }
    }

    /// Override every project's configured connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Replicate one project's local tree onto its remote root, destructively.
    pub fn mirror_project(&self, project: &ProjectSpec) -> Result<MirrorStats, MirrorError> {
        let endpoint = &project.endpoint;
        let timeout = self
            .connect_timeout
            .unwrap_or_else(|| endpoint.connect_timeout());

        debug!(host = %endpoint.host, port = endpoint.port, "dial");
        let mut session = self
            .connector
            .connect(endpoint, timeout)
            .map_err(|source| MirrorError::Connect {
                addr: endpoint.address(),
                source,
            })?;

        let result = run_session(&mut session, project);

        if let Err(e) = session.quit() {
            warn!(error = %e, "failed to close session");
        }
        result
    }
}

fn run_session<S: RemoteSession>(
    session: &mut S,
    project: &ProjectSpec,
) -> Result<MirrorStats, MirrorError> {
    let endpoint = &project.endpoint;
    session
        .login(&endpoint.username, &endpoint.password)
        .map_err(|source| MirrorError::Auth {
            username: endpoint.username.clone(),
            source,
        })?;

    let mut stats = MirrorStats::default();
    wipe_remote_root(session, project, &mut stats)?;
    upload_tree(session, project, &mut stats)?;
    Ok(stats)
}

/// Delete every immediate child of the remote root. Stops at the first
/// failed deletion and leaves later siblings in place.
fn wipe_remote_root<S: RemoteSession>(
    session: &mut S,
    project: &ProjectSpec,
    stats: &mut MirrorStats,
) -> Result<(), MirrorError> {
    let root = remote_join(&project.remote_path, "");
    let root = root.as_str();
    info!(remote_path = root, "removing everything on remote server");

    let entries = match session.list(root) {
        Ok(entries) => entries,
        Err(e) if project.create_remote_root => {
            info!(remote_path = root, error = %e, "remote root not listable, creating it");
            create_remote_root(session, root)?;
            session.list(root).map_err(|source| MirrorError::List {
                path: root.to_string(),
                source,
            })?
        }
        Err(source) => {
            return Err(MirrorError::List {
                path: root.to_string(),
                source,
            })
        }
    };

    for entry in entries {
        let remote_path = remote_join(root, &entry.name);
        debug!(remote_path = %remote_path, "deleting remote entry");
        let deleted = match entry.kind {
            EntryKind::File => session.delete_file(&remote_path),
            EntryKind::Directory => session.delete_dir_recursive(&remote_path),
        };
        if let Err(source) = deleted {
            error!(remote_path = %remote_path, error = %source, "can not delete remote entry");
            return Err(MirrorError::Delete {
                path: remote_path,
                source,
            });
        }
        stats.remote_entries_deleted += 1;
    }
    Ok(())
}

/// Create each component of `root`. Components that already exist make
/// `make_dir` fail, so only the final component's failure counts.
fn create_remote_root<S: RemoteSession>(session: &mut S, root: &str) -> Result<(), MirrorError> {
    let ancestors = remote_ancestors(root);
    let last = ancestors.len().saturating_sub(1);
    for (idx, dir) in ancestors.iter().enumerate() {
        match session.make_dir(dir) {
            Ok(()) => debug!(remote_path = %dir, "created remote root component"),
            Err(source) if idx == last => {
                return Err(MirrorError::RemoteDir {
                    path: dir.clone(),
                    source,
                })
            }
            Err(e) => debug!(remote_path = %dir, error = %e, "remote root component not created"),
        }
    }
    Ok(())
}

/// Walk the local tree and replicate each entry. Directories come out of the
/// walk before their children, so each parent exists remotely before anything
/// is stored into it.
fn upload_tree<S: RemoteSession>(
    session: &mut S,
    project: &ProjectSpec,
    stats: &mut MirrorStats,
) -> Result<(), MirrorError> {
    let tree = LocalTree::new(
        &project.local_path,
        FileFilter::new(&project.exclude_files, &project.exclude_dirs),
    );
    info!(path = %tree.root().display(), "iterating over local directories");

    for entry in tree.entries() {
        let entry = entry.map_err(|source| {
            error!(path = %tree.root().display(), error = %source, "error walking");
            MirrorError::Walk {
                path: tree.root().to_path_buf(),
                source,
            }
        })?;

        let remote_path = remote_join(
            &project.remote_path,
            &to_remote_relative(&entry.relative_path),
        );
        debug!(local = %entry.path.display(), remote = %remote_path, "processing path");

        if entry.is_directory() {
            if let Err(source) = session.make_dir(&remote_path) {
                error!(remote_path = %remote_path, error = %source, "can not create remote dir");
                return Err(MirrorError::RemoteDir {
                    path: remote_path,
                    source,
                });
            }
            stats.dirs_created += 1;
            continue;
        }

        let file = File::open(&entry.path).map_err(|source| {
            error!(path = %entry.path.display(), error = %source, "can not read local file");
            MirrorError::LocalRead {
                path: entry.path.clone(),
                source,
            }
        })?;
        let mut reader = BufReader::with_capacity(UPLOAD_BUFFER_SIZE, file);
        match session.store(&remote_path, &mut reader) {
            Ok(bytes) => stats.add_file(bytes),
            Err(source) => {
                error!(remote_path = %remote_path, error = %source, "can not store remote file");
                return Err(MirrorError::RemoteStore {
                    local: entry.path,
                    remote: remote_path,
                    source,
                });
            }
        }
    }
    Ok(())
}

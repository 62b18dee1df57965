#![allow(dead_code)]

//! In-memory remote store used by the integration tests.

use std::collections::{BTreeMap, HashSet};
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ftpmirror::config::{Endpoint, ProjectSpec};
use ftpmirror::remote::{Connector, RemoteEntry, RemoteSession};
use ftpmirror::RemoteError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Dir,
    File(Vec<u8>),
}

/// Remote operation as observed by the server, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Login(String),
    List(String),
    DeleteFile(String),
    DeleteDir(String),
    MakeDir(String),
    Store(String),
    Quit,
}

#[derive(Default)]
struct State {
    nodes: BTreeMap<String, Node>,
    calls: Vec<Call>,
    refuse_hosts: HashSet<String>,
    bad_passwords: HashSet<String>,
    fail_delete: HashSet<String>,
    fail_mkdir: HashSet<String>,
    fail_store: HashSet<String>,
    fail_quit: bool,
}

/// Shared handle on one fake server; clones see the same state.
#[derive(Clone, Default)]
pub struct MemoryServer {
    state: Arc<Mutex<State>>,
}

impl State {
    fn has_dir_parent(&self, path: &str) -> bool {
        matches!(
            parent_of(path).and_then(|p| self.nodes.get(p)),
            Some(Node::Dir)
        )
    }
}

fn refused(msg: impl Into<String>) -> RemoteError {
    RemoteError::Protocol(msg.into())
}

fn parent_of(path: &str) -> Option<&str> {
    let idx = path.rfind('/')?;
    if idx == 0 {
        Some("/")
    } else {
        Some(&path[..idx])
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        let server = Self::default();
        server.add_dir("/");
        server
    }

    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    pub fn add_dir(&self, path: &str) {
        self.with(|s| s.nodes.insert(path.to_string(), Node::Dir));
    }

    pub fn add_file(&self, path: &str, contents: &[u8]) {
        self.with(|s| s.nodes.insert(path.to_string(), Node::File(contents.to_vec())));
    }

    pub fn refuse_host(&self, host: &str) {
        self.with(|s| s.refuse_hosts.insert(host.to_string()));
    }

    pub fn reject_password(&self, password: &str) {
        self.with(|s| s.bad_passwords.insert(password.to_string()));
    }

    pub fn fail_delete(&self, path: &str) {
        self.with(|s| s.fail_delete.insert(path.to_string()));
    }

    pub fn fail_mkdir(&self, path: &str) {
        self.with(|s| s.fail_mkdir.insert(path.to_string()));
    }

    pub fn fail_store(&self, path: &str) {
        self.with(|s| s.fail_store.insert(path.to_string()));
    }

    pub fn fail_quit(&self) {
        self.with(|s| s.fail_quit = true);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.with(|s| s.calls.clone())
    }

    pub fn clear_calls(&self) {
        self.with(|s| s.calls.clear());
    }

    pub fn exists(&self, path: &str) -> bool {
        self.with(|s| s.nodes.contains_key(path))
    }

    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.with(|s| match s.nodes.get(path) {
            Some(Node::File(bytes)) => Some(bytes.clone()),
            _ => None,
        })
    }

    /// Everything strictly below `root`, keyed by path relative to it.
    pub fn snapshot(&self, root: &str) -> BTreeMap<String, Node> {
        let prefix = format!("{}/", root.trim_end_matches('/'));
        self.with(|s| {
            s.nodes
                .iter()
                .filter_map(|(k, v)| {
                    k.strip_prefix(&prefix)
                        .filter(|rel| !rel.is_empty())
                        .map(|rel| (rel.to_string(), v.clone()))
                })
                .collect()
        })
    }

    pub fn connector(&self) -> MemoryConnector {
        MemoryConnector {
            server: self.clone(),
        }
    }
}

pub struct MemoryConnector {
    server: MemoryServer,
}

impl Connector for MemoryConnector {
    type Session = MemorySession;

    fn connect(&self, endpoint: &Endpoint, _timeout: Duration) -> Result<MemorySession, RemoteError> {
        let addr = endpoint.address();
        self.server.with(|s| {
            s.calls.push(Call::Connect(addr.clone()));
            if s.refuse_hosts.contains(&endpoint.host) {
                return Err(refused(format!("connection refused: {addr}")));
            }
            Ok(())
        })?;
        Ok(MemorySession {
            server: self.server.clone(),
            logged_in: false,
        })
    }
}

pub struct MemorySession {
    server: MemoryServer,
    logged_in: bool,
}

impl MemorySession {
    fn require_login(&self) -> Result<(), RemoteError> {
        if self.logged_in {
            Ok(())
        } else {
            Err(refused("530 not logged in"))
        }
    }
}

impl RemoteSession for MemorySession {
    fn login(&mut self, username: &str, password: &str) -> Result<(), RemoteError> {
        self.server.with(|s| {
            s.calls.push(Call::Login(username.to_string()));
            if s.bad_passwords.contains(password) {
                return Err(refused("530 login incorrect"));
            }
            Ok(())
        })?;
        self.logged_in = true;
        Ok(())
    }

    fn list(&mut self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        self.require_login()?;
        self.server.with(|s| {
            s.calls.push(Call::List(path.to_string()));
            match s.nodes.get(path) {
                Some(Node::Dir) => {}
                _ => return Err(refused(format!("550 {path}: no such directory"))),
            }
            let prefix = format!("{}/", path.trim_end_matches('/'));
            Ok(s.nodes
                .iter()
                .filter_map(|(k, v)| {
                    let rel = k.strip_prefix(&prefix)?;
                    if rel.is_empty() || rel.contains('/') {
                        return None;
                    }
                    Some(match v {
                        Node::Dir => RemoteEntry::directory(rel),
                        Node::File(_) => RemoteEntry::file(rel),
                    })
                })
                .collect())
        })
    }

    fn delete_file(&mut self, path: &str) -> Result<(), RemoteError> {
        self.require_login()?;
        self.server.with(|s| {
            s.calls.push(Call::DeleteFile(path.to_string()));
            if s.fail_delete.contains(path) {
                return Err(refused(format!("550 {path}: permission denied")));
            }
            if !matches!(s.nodes.get(path), Some(Node::File(_))) {
                return Err(refused(format!("550 {path}: not a file")));
            }
            s.nodes.remove(path);
            Ok(())
        })
    }

    fn delete_dir_recursive(&mut self, path: &str) -> Result<(), RemoteError> {
        self.require_login()?;
        self.server.with(|s| {
            s.calls.push(Call::DeleteDir(path.to_string()));
            if s.fail_delete.contains(path) {
                return Err(refused(format!("550 {path}: permission denied")));
            }
            if s.nodes.get(path) != Some(&Node::Dir) {
                return Err(refused(format!("550 {path}: not a directory")));
            }
            let prefix = format!("{path}/");
            s.nodes.retain(|k, _| k != path && !k.starts_with(&prefix));
            Ok(())
        })
    }

    fn make_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        self.require_login()?;
        self.server.with(|s| {
            s.calls.push(Call::MakeDir(path.to_string()));
            if s.fail_mkdir.contains(path) {
                return Err(refused(format!("550 {path}: permission denied")));
            }
            if s.nodes.contains_key(path) {
                return Err(refused(format!("550 {path}: file exists")));
            }
            if !s.has_dir_parent(path) {
                return Err(refused(format!("550 {path}: parent does not exist")));
            }
            s.nodes.insert(path.to_string(), Node::Dir);
            Ok(())
        })
    }

    fn store<R: Read>(&mut self, path: &str, reader: &mut R) -> Result<u64, RemoteError> {
        self.require_login()?;
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        self.server.with(|s| {
            s.calls.push(Call::Store(path.to_string()));
            if s.fail_store.contains(path) {
                return Err(refused(format!("451 {path}: local error in processing")));
            }
            if !s.has_dir_parent(path) {
                return Err(refused(format!("553 {path}: parent does not exist")));
            }
            let len = buf.len() as u64;
            s.nodes.insert(path.to_string(), Node::File(buf));
            Ok(len)
        })
    }

    fn quit(&mut self) -> Result<(), RemoteError> {
        self.server.with(|s| {
            s.calls.push(Call::Quit);
            if s.fail_quit {
                return Err(refused("421 service not available"));
            }
            Ok(())
        })
    }
}

pub fn project(name: &str, host: &str, local: &Path, remote: &str) -> ProjectSpec {
    ProjectSpec {
        name: name.to_string(),
        local_path: local.to_path_buf(),
        remote_path: remote.to_string(),
        endpoint: Endpoint {
            host: host.to_string(),
            port: 21,
            username: "deploy".to_string(),
            password: "secret".to_string(),
            connect_timeout_secs: 5,
        },
        create_remote_root: false,
        exclude_files: Vec::new(),
        exclude_dirs: Vec::new(),
    }
}

pub fn write_file(path: &Path, contents: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Local tree under `root`, keyed like [`MemoryServer::snapshot`].
pub fn local_snapshot(root: &Path) -> BTreeMap<String, Node> {
    walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .map(|entry| {
            let entry = entry.unwrap();
            let rel = entry
                .path()
                .strip_prefix(root)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/");
            let node = if entry.file_type().is_dir() {
                Node::Dir
            } else {
                Node::File(std::fs::read(entry.path()).unwrap())
            };
            (rel, node)
        })
        .collect()
}

//! FTP transport built on `suppaftp`

use std::io::Read;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;
use std::time::Duration;

use suppaftp::list::File as ListLine;
use suppaftp::types::FileType;
use suppaftp::FtpStream;
use tracing::debug;

use crate::config::Endpoint;
use crate::error::RemoteError;
use crate::remote::{remote_join, Connector, EntryKind, RemoteEntry, RemoteSession};

/// Connects to plain (non-TLS) FTP servers in passive mode.
///
/// The timeout bounds each TCP connect attempt only. Host name resolution
/// happens beforehand through the system resolver and is not covered by it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FtpConnector;

impl Connector for FtpConnector {
    type Session = FtpSession;

    fn connect(&self, endpoint: &Endpoint, timeout: Duration) -> Result<FtpSession, RemoteError> {
        let addrs: Vec<SocketAddr> = (endpoint.host.as_str(), endpoint.port)
            .to_socket_addrs()?
            .collect();
        if addrs.is_empty() {
            return Err(RemoteError::Protocol(format!(
                "{} did not resolve to any address",
                endpoint.host
            )));
        }

        // Try each resolved address in turn, keep the last failure
        let mut last_err = None;
        for addr in addrs {
            debug!(%addr, "dialing");
            match FtpStream::connect_timeout(addr, timeout) {
                Ok(stream) => return Ok(FtpSession { stream }),
                Err(e) => last_err = Some(e),
            }
        }
        match last_err {
            Some(e) => Err(e.into()),
            None => Err(RemoteError::Protocol("no address to dial".into())),
        }
    }
}

pub struct FtpSession {
    stream: FtpStream,
}

impl FtpSession {
    fn parse_listing(lines: Vec<String>) -> Result<Vec<RemoteEntry>, RemoteError> {
        let mut entries = Vec::with_capacity(lines.len());
        for line in lines {
            if line.trim().is_empty() || line.starts_with("total ") {
                continue;
            }
            let parsed = ListLine::from_str(&line).map_err(|e| {
                RemoteError::Protocol(format!("unparseable LIST line '{line}': {e}"))
            })?;
            let name = parsed.name();
            if name == "." || name == ".." {
                continue;
            }
            let kind = if parsed.is_directory() {
                EntryKind::Directory
            } else {
                EntryKind::File
            };
            entries.push(RemoteEntry {
                name: name.to_string(),
                kind,
            });
        }
        Ok(entries)
    }
}

impl RemoteSession for FtpSession {
    fn login(&mut self, username: &str, password: &str) -> Result<(), RemoteError> {
        self.stream.login(username, password)?;
        // ASCII mode would rewrite line endings in uploaded files
        self.stream.transfer_type(FileType::Binary)?;
        Ok(())
    }

    fn list(&mut self, path: &str) -> Result<Vec<RemoteEntry>, RemoteError> {
        let lines = self.stream.list(Some(path))?;
        Self::parse_listing(lines)
    }

    fn delete_file(&mut self, path: &str) -> Result<(), RemoteError> {
        self.stream.rm(path)?;
        Ok(())
    }

    fn delete_dir_recursive(&mut self, path: &str) -> Result<(), RemoteError> {
        for entry in self.list(path)? {
            let child = remote_join(path, &entry.name);
            match entry.kind {
                EntryKind::Directory => self.delete_dir_recursive(&child)?,
                EntryKind::File => self.stream.rm(&child)?,
            }
        }
        self.stream.rmdir(path)?;
        Ok(())
    }

    fn make_dir(&mut self, path: &str) -> Result<(), RemoteError> {
        self.stream.mkdir(path)?;
        Ok(())
    }

    fn store<R: Read>(&mut self, path: &str, reader: &mut R) -> Result<u64, RemoteError> {
        Ok(self.stream.put_file(path, reader)?)
    }

    fn quit(&mut self) -> Result<(), RemoteError> {
        self.stream.quit()?;
        Ok(())
    }
}

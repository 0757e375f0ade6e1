//! Network namespace resolution.
//!
//! A namespace is named the way operators write it in configuration:
//!
//! - `""` is the namespace the exporter runs in,
//! - a value containing `/` is a namespace file such as `/proc/1234/ns/net`,
//! - anything else is a named namespace under [`NETNS_RUN_DIR`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::connection::Connection;
use crate::error::{Error, Result};

/// The runtime directory where `ip netns add` places named namespaces.
pub const NETNS_RUN_DIR: &str = "/var/run/netns";

/// A resolved namespace reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceSpec<'a> {
    /// The caller's own namespace.
    Default,
    /// A named namespace in [`NETNS_RUN_DIR`].
    Named(&'a str),
    /// A namespace file path.
    Path(&'a Path),
}

impl<'a> NamespaceSpec<'a> {
    /// Resolve a namespace identifier.
    pub fn parse(netns: &'a str) -> Self {
        if netns.is_empty() {
            Self::Default
        } else if netns.contains('/') {
            Self::Path(Path::new(netns))
        } else {
            Self::Named(netns)
        }
    }

    /// Path of the namespace file, `None` for the default namespace.
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Self::Default => None,
            Self::Named(name) => Some(Path::new(NETNS_RUN_DIR).join(name)),
            Self::Path(path) => Some(path.to_path_buf()),
        }
    }

    /// Open a route connection inside this namespace.
    pub fn connection(&self) -> Result<Connection> {
        match self.path() {
            None => Connection::new(),
            Some(path) => Connection::new_in_namespace_path(path),
        }
    }
}

/// List the named namespaces in [`NETNS_RUN_DIR`], sorted.
///
/// A missing directory means no named namespaces exist.
pub fn list() -> Result<Vec<String>> {
    list_in(Path::new(NETNS_RUN_DIR))
}

fn list_in(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(Error::Io(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Check whether a named namespace exists.
pub fn exists(name: &str) -> bool {
    Path::new(NETNS_RUN_DIR).join(name).exists()
}

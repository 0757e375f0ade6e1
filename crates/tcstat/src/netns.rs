//! The namespaces and interfaces a collector walks.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::netlink::{Connection, LinkMessage};

/// An interface inside a namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Interface {
    pub index: u32,
    pub name: String,
}

impl Interface {
    pub fn new(index: u32, name: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
        }
    }
}

impl From<&LinkMessage> for Interface {
    fn from(link: &LinkMessage) -> Self {
        Self::new(link.ifindex(), link.name_or())
    }
}

/// Namespace identifier to its interfaces, iterated in identifier order.
///
/// The empty identifier is the exporter's own namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceSet(BTreeMap<String, Vec<Interface>>);

impl NamespaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a namespace.
    pub fn insert(&mut self, netns: impl Into<String>, interfaces: Vec<Interface>) {
        self.0.insert(netns.into(), interfaces);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, netns: impl Into<String>, interfaces: Vec<Interface>) -> Self {
        self.insert(netns, interfaces);
        self
    }

    pub fn get(&self, netns: &str) -> Option<&[Interface]> {
        self.0.get(netns).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Interface])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of interfaces across all namespaces.
    pub fn interface_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl FromIterator<(String, Vec<Interface>)> for NamespaceSet {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Interface>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Keep the links named in `wanted`, in that order, or all of them when it is empty.
///
/// Names that match no link are returned separately.
pub fn select_interfaces(links: &[LinkMessage], wanted: &[String]) -> (Vec<Interface>, Vec<String>) {
    if wanted.is_empty() {
        let mut all: Vec<Interface> = links.iter().map(Interface::from).collect();
        all.sort_by_key(|i| i.index);
        return (all, Vec::new());
    }

    let mut found = Vec::with_capacity(wanted.len());
    let mut missing = Vec::new();
    for name in wanted {
        match links.iter().find(|l| l.name() == Some(name.as_str())) {
            Some(link) => found.push(Interface::from(link)),
            None => missing.push(name.clone()),
        }
    }
    (found, missing)
}

/// Build the namespace set for a configuration by dumping each namespace's links.
///
/// A namespace that cannot be opened or listed is an error. Configured
/// interfaces that do not exist are logged and skipped.
pub async fn discover(config: &Config) -> Result<NamespaceSet> {
    let mut set = NamespaceSet::new();

    for (netns, wanted) in config.targets() {
        let conn = Connection::for_namespace(&netns)?;
        let links = conn.get_links().await?;
        let (interfaces, missing) = select_interfaces(&links, &wanted);

        for name in &missing {
            warn!(netns = %netns, interface = %name, "configured interface not found, skipping");
        }
        debug!(netns = %netns, interfaces = interfaces.len(), "discovered namespace");

        set.insert(netns, interfaces);
    }

    Ok(set)
}

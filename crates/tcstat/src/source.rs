//! Where qdisc records come from.
//!
//! [`QdiscSource`] is the boundary the collector queries once per interface
//! and cycle. [`NetlinkSource`] answers it from the kernel; tests answer it
//! from memory.

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::netlink::{Connection, TcMessage};

/// Default bound on a single fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Raw statistics of one qdisc, as the kernel reports them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QdiscStats {
    pub bytes: u64,
    pub packets: u64,
    /// Byte rate from the rate estimator.
    pub bps: u32,
    /// Packet rate from the rate estimator.
    pub pps: u32,
    /// Bytes currently queued.
    pub backlog: u32,
    pub drops: u32,
    pub overlimits: u32,
    /// Packets currently queued.
    pub qlen: u32,
}

/// One qdisc attached to an interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QdiscRecord {
    /// Qdisc type, empty if the kernel did not say.
    pub kind: String,
    /// Raw handle.
    pub handle: u32,
    /// Raw parent handle.
    pub parent: u32,
    pub stats: QdiscStats,
}

impl From<TcMessage> for QdiscRecord {
    fn from(msg: TcMessage) -> Self {
        let stats = QdiscStats {
            bytes: msg.bytes(),
            packets: msg.packets(),
            bps: msg.bps(),
            pps: msg.pps(),
            backlog: msg.backlog(),
            drops: msg.drops(),
            overlimits: msg.overlimits(),
            qlen: msg.qlen(),
        };
        Self {
            handle: msg.handle(),
            parent: msg.parent(),
            kind: msg.kind.unwrap_or_default(),
            stats,
        }
    }
}

/// Something that can list the qdiscs of an interface.
///
/// `netns` uses the namespace identifiers of the collector's namespace set:
/// `""` for the exporter's own namespace. Record order carries no meaning.
pub trait QdiscSource: Send + Sync {
    fn fetch(
        &self,
        ifindex: u32,
        netns: &str,
    ) -> impl Future<Output = Result<Vec<QdiscRecord>>> + Send;
}

/// Reads qdiscs from the kernel over rtnetlink.
///
/// Every fetch opens its own socket in the target namespace, so concurrent
/// collections never share one.
#[derive(Debug, Clone)]
pub struct NetlinkSource {
    timeout: Duration,
}

impl NetlinkSource {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Bound each fetch by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for NetlinkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl QdiscSource for NetlinkSource {
    async fn fetch(&self, ifindex: u32, netns: &str) -> Result<Vec<QdiscRecord>> {
        let query = async {
            let conn = Connection::for_namespace(netns)?;
            let qdiscs = conn.get_qdiscs_by_index(ifindex).await?;
            Ok::<_, Error>(qdiscs.into_iter().map(QdiscRecord::from).collect::<Vec<_>>())
        };

        tokio::time::timeout(self.timeout, query)
            .await
            .map_err(|_| Error::Timeout(self.timeout))?
    }
}

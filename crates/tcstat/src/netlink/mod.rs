//! Async rtnetlink plumbing: sockets, framing, typed qdisc and link messages,
//! and namespace-scoped connections.
//!
//! # Example
//!
//! ```ignore
//! use tcstat::netlink::Connection;
//!
//! let conn = Connection::for_namespace("blue")?;
//! for link in conn.get_links().await? {
//!     for qdisc in conn.get_qdiscs_by_index(link.ifindex()).await? {
//!         println!("{} {}: {} bytes", link.name_or(), qdisc.kind().unwrap_or("?"), qdisc.bytes());
//!     }
//! }
//! ```

pub mod builder;
pub mod connection;
pub mod message;
pub mod messages;
pub mod namespace;
pub mod parse;
pub mod socket;
pub mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use builder::MessageBuilder;
pub use connection::Connection;
pub use messages::{LinkMessage, TcMessage, TcStatsBasic, TcStatsQueue, TcStatsRateEst};
pub use namespace::{NETNS_RUN_DIR, NamespaceSpec};
pub use parse::FromNetlink;
pub use socket::NetlinkSocket;

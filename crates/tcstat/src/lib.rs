//! Traffic-control (qdisc) statistics for Prometheus.
//!
//! This crate reads qdisc statistics from the kernel over rtnetlink, across
//! any number of network namespaces, and turns them into metric samples with
//! a fixed label set.
//!
//! # Features
//!
//! - `integration` - root-only tests that create a network namespace
//!
//! # Example
//!
//! ```ignore
//! use tcstat::{Config, NetlinkSource, QdiscCollector, exposition, netns};
//!
//! #[tokio::main]
//! async fn main() -> tcstat::Result<()> {
//!     let config = Config::default();
//!     let namespaces = netns::discover(&config).await?;
//!
//!     let collector = QdiscCollector::new("tc", namespaces, NetlinkSource::new())?;
//!     let samples = collector.collect().await;
//!     print!("{}", exposition::encode_text(collector.describe(), &samples)?);
//!
//!     Ok(())
//! }
//! ```

pub mod collector;
pub mod config;
pub mod error;
pub mod exposition;
pub mod handle;
pub mod host;
#[cfg(test)]
mod log_capture;
pub mod netlink;
pub mod netns;
pub mod schema;
pub mod source;

pub use collector::{InterfaceFailure, MetricSample, QdiscCollector, QdiscLabels, Snapshot};
pub use config::Config;
pub use error::{Error, Result};
pub use handle::Handle;
pub use host::{HostResolver, StaticHost, SystemHost};
pub use netns::{Interface, NamespaceSet};
pub use schema::{LABELS, MetricDesc, Schema, Statistic, ValueKind};
pub use source::{NetlinkSource, QdiscRecord, QdiscSource, QdiscStats};

//! Turns qdisc records into metric samples.
//!
//! One collection walks every namespace, then every interface in it, asks
//! the [`QdiscSource`] for that interface's qdiscs and emits eight samples
//! per qdisc, one per [`Statistic`]. A failing interface is logged, recorded
//! in the [`Snapshot`] and skipped; it never stops the walk.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::handle::Handle;
use crate::host::{HostResolver, SystemHost};
use crate::netns::{Interface, NamespaceSet};
use crate::schema::{MetricDesc, Schema, Statistic, ValueKind};
use crate::source::{QdiscRecord, QdiscSource};

/// Label values shared by the eight samples of one qdisc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QdiscLabels {
    pub host: String,
    pub netns: String,
    pub linkindex: String,
    pub link: String,
    pub kind: String,
    pub handle: String,
    pub parent: String,
}

impl QdiscLabels {
    fn new(host: &str, netns: &str, interface: &Interface, record: &QdiscRecord) -> Self {
        Self {
            host: host.to_string(),
            netns: netns.to_string(),
            linkindex: interface.index.to_string(),
            link: interface.name.clone(),
            kind: record.kind.clone(),
            handle: Handle::from_raw(record.handle).to_string(),
            parent: Handle::from_raw(record.parent).to_string(),
        }
    }

    /// Values in [`LABELS`](crate::schema::LABELS) order.
    pub fn values(&self) -> [&str; 7] {
        [
            &self.host,
            &self.netns,
            &self.linkindex,
            &self.link,
            &self.kind,
            &self.handle,
            &self.parent,
        ]
    }
}

/// One value of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample<'a> {
    pub desc: &'a MetricDesc,
    pub value: f64,
    pub labels: Arc<QdiscLabels>,
}

impl MetricSample<'_> {
    pub fn kind(&self) -> ValueKind {
        self.desc.kind
    }

    pub fn label_values(&self) -> [&str; 7] {
        self.labels.values()
    }
}

/// An interface whose qdiscs could not be read.
#[derive(Debug)]
pub struct InterfaceFailure {
    pub netns: String,
    pub interface: Interface,
    pub error: Error,
}

/// The outcome of one collection.
#[derive(Debug, Default)]
pub struct Snapshot<'a> {
    pub samples: Vec<MetricSample<'a>>,
    pub failures: Vec<InterfaceFailure>,
}

/// Collects qdisc statistics for a fixed set of namespaces and interfaces.
pub struct QdiscCollector<S, H = SystemHost> {
    schema: Schema,
    netns: Arc<NamespaceSet>,
    source: S,
    host: H,
}

impl<S: QdiscSource> QdiscCollector<S> {
    /// Create a collector whose metric names start with `prefix`.
    ///
    /// Fails if `prefix` does not make valid metric names.
    pub fn new(prefix: &str, netns: impl Into<Arc<NamespaceSet>>, source: S) -> Result<Self> {
        let schema = Schema::new(prefix)?;
        let netns = netns.into();
        info!(
            collector = "qdisc",
            namespaces = netns.len(),
            interfaces = netns.interface_count(),
            "making qdisc collector"
        );

        Ok(Self {
            schema,
            netns,
            source,
            host: SystemHost,
        })
    }
}

impl<S: QdiscSource, H: HostResolver> QdiscCollector<S, H> {
    /// Use `host` to fill the `host` label.
    pub fn with_host_resolver<H2: HostResolver>(self, host: H2) -> QdiscCollector<S, H2> {
        QdiscCollector {
            schema: self.schema,
            netns: self.netns,
            source: self.source,
            host,
        }
    }

    /// The eight descriptors this collector emits, in emission order.
    pub fn describe(&self) -> &[MetricDesc] {
        self.schema.descriptors()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn namespaces(&self) -> &NamespaceSet {
        &self.netns
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Collect samples, dropping the failure details.
    pub async fn collect(&self) -> Vec<MetricSample<'_>> {
        self.snapshot().await.samples
    }

    /// Collect samples and the interfaces that could not be read.
    pub async fn snapshot(&self) -> Snapshot<'_> {
        let host = match self.host.hostname() {
            Ok(host) => host,
            Err(e) => {
                error!(collector = "qdisc", err = %e, "failed to get hostname");
                String::new()
            }
        };

        let mut snapshot = Snapshot::default();

        for (netns, interfaces) in self.netns.iter() {
            for interface in interfaces {
                let records = match self.source.fetch(interface.index, netns).await {
                    Ok(records) => records,
                    Err(e) => {
                        error!(
                            collector = "qdisc",
                            netns = %netns,
                            interface = %interface.name,
                            err = %e,
                            "failed to get qdiscs"
                        );
                        snapshot.failures.push(InterfaceFailure {
                            netns: netns.to_string(),
                            interface: interface.clone(),
                            error: e,
                        });
                        continue;
                    }
                };

                for record in &records {
                    self.emit(&host, netns, interface, record, &mut snapshot.samples);
                }
            }
        }

        debug!(
            collector = "qdisc",
            samples = snapshot.samples.len(),
            failures = snapshot.failures.len(),
            "collection finished"
        );
        snapshot
    }

    fn emit<'a>(
        &'a self,
        host: &str,
        netns: &str,
        interface: &Interface,
        record: &QdiscRecord,
        out: &mut Vec<MetricSample<'a>>,
    ) {
        let labels = Arc::new(QdiscLabels::new(host, netns, interface, record));
        out.extend(Statistic::ALL.iter().map(|&statistic| MetricSample {
            desc: self.schema.get(statistic),
            value: statistic.value(&record.stats),
            labels: Arc::clone(&labels),
        }));
    }
}

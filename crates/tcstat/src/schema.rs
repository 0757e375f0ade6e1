//! The fixed set of qdisc metrics.

use std::collections::HashMap;
use std::fmt;

use prometheus::core::Desc;
use prometheus::proto::MetricType;

use crate::error::Result;
use crate::source::QdiscStats;

/// Default metric name prefix.
pub const DEFAULT_PREFIX: &str = "tc";

/// Subsystem part of every metric name.
pub const SUBSYSTEM: &str = "qdisc";

/// Label names, in the order label values are emitted.
pub const LABELS: [&str; 7] = ["host", "netns", "linkindex", "link", "type", "handle", "parent"];

/// How a value should be interpreted by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Counter,
    Gauge,
}

impl ValueKind {
    pub fn metric_type(self) -> MetricType {
        match self {
            Self::Counter => MetricType::COUNTER,
            Self::Gauge => MetricType::GAUGE,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        })
    }
}

/// One of the eight statistics reported per qdisc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Statistic {
    Bytes,
    Packets,
    Bps,
    Pps,
    Backlog,
    Drops,
    Overlimits,
    Qlen,
}

impl Statistic {
    /// All statistics in emission order.
    pub const ALL: [Statistic; 8] = [
        Self::Bytes,
        Self::Packets,
        Self::Bps,
        Self::Pps,
        Self::Backlog,
        Self::Drops,
        Self::Overlimits,
        Self::Qlen,
    ];

    /// Metric name after the subsystem.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Bytes => "bytes_total",
            Self::Packets => "packets_total",
            Self::Bps => "bps",
            Self::Pps => "pps",
            Self::Backlog => "backlog_total",
            Self::Drops => "drops_total",
            Self::Overlimits => "overlimits_total",
            Self::Qlen => "qlen_total",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            Self::Bytes => "Qdisc byte counter",
            Self::Packets => "Qdisc packet counter",
            Self::Bps => "Qdisc byte rate",
            Self::Pps => "Qdisc packet rate",
            Self::Backlog => "Qdisc queue backlog",
            Self::Drops => "Qdisc queue drops",
            Self::Overlimits => "Qdisc queue overlimits",
            Self::Qlen => "Qdisc queue length",
        }
    }

    /// Backlog and queue length are instantaneous but stay counters so
    /// existing dashboards and recording rules keep working.
    pub fn kind(self) -> ValueKind {
        match self {
            Self::Bps | Self::Pps => ValueKind::Gauge,
            _ => ValueKind::Counter,
        }
    }

    /// Pick this statistic out of a record's stats.
    pub fn value(self, stats: &QdiscStats) -> f64 {
        match self {
            Self::Bytes => stats.bytes as f64,
            Self::Packets => stats.packets as f64,
            Self::Bps => stats.bps as f64,
            Self::Pps => stats.pps as f64,
            Self::Backlog => stats.backlog as f64,
            Self::Drops => stats.drops as f64,
            Self::Overlimits => stats.overlimits as f64,
            Self::Qlen => stats.qlen as f64,
        }
    }
}

/// Join the non-empty name parts with `_`.
pub fn fq_name(prefix: &str, subsystem: &str, name: &str) -> String {
    [prefix, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

/// A metric descriptor.
#[derive(Debug, Clone)]
pub struct MetricDesc {
    pub statistic: Statistic,
    pub fq_name: String,
    pub help: String,
    pub kind: ValueKind,
    desc: Desc,
}

impl MetricDesc {
    fn new(prefix: &str, statistic: Statistic) -> Result<Self> {
        let fq_name = fq_name(prefix, SUBSYSTEM, statistic.suffix());
        let help = statistic.help().to_string();
        let desc = Desc::new(
            fq_name.clone(),
            help.clone(),
            LABELS.iter().map(|l| l.to_string()).collect(),
            HashMap::new(),
        )?;

        Ok(Self {
            statistic,
            fq_name,
            help,
            kind: statistic.kind(),
            desc,
        })
    }

    /// Label names, in emission order.
    pub fn labels(&self) -> &[String] {
        &self.desc.variable_labels
    }

    /// The validated Prometheus descriptor.
    pub fn prometheus_desc(&self) -> &Desc {
        &self.desc
    }
}

impl PartialEq for MetricDesc {
    fn eq(&self, other: &Self) -> bool {
        self.statistic == other.statistic
            && self.fq_name == other.fq_name
            && self.help == other.help
            && self.kind == other.kind
    }
}

/// The eight descriptors, in [`Statistic::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    descs: Vec<MetricDesc>,
}

impl Schema {
    /// Build and validate the descriptors for a metric name prefix.
    ///
    /// An empty prefix yields names starting with `qdisc_`.
    pub fn new(prefix: &str) -> Result<Self> {
        let descs = Statistic::ALL
            .iter()
            .map(|&s| MetricDesc::new(prefix, s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { descs })
    }

    pub fn descriptors(&self) -> &[MetricDesc] {
        &self.descs
    }

    pub fn get(&self, statistic: Statistic) -> &MetricDesc {
        // descs is built from Statistic::ALL, whose order matches the discriminants.
        &self.descs[statistic as usize]
    }
}

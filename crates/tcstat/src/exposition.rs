//! Prometheus exposition of collected samples.

use prometheus::core::{Collector, Desc};
use prometheus::proto::{Counter, Gauge, LabelPair, Metric, MetricFamily};
use prometheus::{Encoder, Registry, TextEncoder};

use crate::collector::MetricSample;
use crate::error::{Error, Result};
use crate::schema::{MetricDesc, ValueKind};

/// Content type of [`encode_text`] output.
pub const TEXT_CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

/// Group samples into one family per descriptor, in descriptor order.
///
/// Descriptors without samples produce no family.
pub fn families(descs: &[MetricDesc], samples: &[MetricSample<'_>]) -> Vec<MetricFamily> {
    descs
        .iter()
        .filter_map(|desc| {
            let metrics: Vec<Metric> = samples
                .iter()
                .filter(|s| s.desc.statistic == desc.statistic)
                .map(|s| to_metric(desc, s))
                .collect();
            if metrics.is_empty() {
                return None;
            }

            let mut family = MetricFamily::default();
            family.set_name(desc.fq_name.clone());
            family.set_help(desc.help.clone());
            family.set_field_type(desc.kind.metric_type());
            family.set_metric(metrics.into());
            Some(family)
        })
        .collect()
}

fn to_metric(desc: &MetricDesc, sample: &MetricSample<'_>) -> Metric {
    let labels: Vec<LabelPair> = desc
        .labels()
        .iter()
        .zip(sample.label_values())
        .map(|(name, value)| {
            let mut pair = LabelPair::default();
            pair.set_name(name.clone());
            pair.set_value(value.to_string());
            pair
        })
        .collect();

    let mut metric = Metric::default();
    metric.set_label(labels.into());
    match desc.kind {
        ValueKind::Counter => {
            let mut counter = Counter::default();
            counter.set_value(sample.value);
            metric.set_counter(counter);
        }
        ValueKind::Gauge => {
            let mut gauge = Gauge::default();
            gauge.set_value(sample.value);
            metric.set_gauge(gauge);
        }
    }
    metric
}

/// Hands one collection's families to a registry.
struct SnapshotCollector {
    descs: Vec<Desc>,
    families: Vec<MetricFamily>,
}

impl Collector for SnapshotCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        self.families.clone()
    }
}

/// Gather samples through a fresh [`Registry`].
///
/// The registry rejects duplicate or inconsistent descriptors and returns
/// families sorted by name, each with its metrics sorted by label values.
pub fn gather(descs: &[MetricDesc], samples: &[MetricSample<'_>]) -> Result<Vec<MetricFamily>> {
    let registry = Registry::new();
    registry.register(Box::new(SnapshotCollector {
        descs: descs.iter().map(|d| d.prometheus_desc().clone()).collect(),
        families: families(descs, samples),
    }))?;
    Ok(registry.gather())
}

/// Encode samples in the Prometheus text format.
pub fn encode_text(descs: &[MetricDesc], samples: &[MetricSample<'_>]) -> Result<String> {
    let families = gather(descs, samples)?;
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| Error::Parse(format!("exposition is not UTF-8: {e}")))
}

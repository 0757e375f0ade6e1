//! tcstat-exporter - Prometheus exporter for Linux qdisc statistics.

mod http;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tcstat::config::DEFAULT_NETNS_KEY;
use tcstat::netlink::namespace;
use tcstat::{
    Config, HostResolver, NetlinkSource, QdiscCollector, StaticHost, SystemHost, exposition, netns,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "tcstat-exporter",
    version,
    about = "Prometheus exporter for Linux traffic-control qdisc statistics"
)]
struct Cli {
    /// YAML configuration file.
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to serve metrics on (overrides listen_address).
    #[arg(short = 'l', long, value_name = "ADDR")]
    listen: Option<String>,

    /// Metric name prefix (overrides metric_prefix).
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,

    /// Log filter when RUST_LOG is unset (overrides log_level).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Watch every interface of a namespace. Repeatable.
    #[arg(long = "netns", value_name = "NAME")]
    netns: Vec<String>,

    /// Watch every named namespace in /var/run/netns plus the default one.
    #[arg(long)]
    all_netns: bool,

    /// Collect once, print the metrics to stdout and exit.
    #[arg(long)]
    once: bool,
}

impl Cli {
    /// Load the configuration file and apply command-line overrides.
    fn config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(listen) = &self.listen {
            config.listen_address = listen.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.metric_prefix = prefix.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = Some(level.clone());
        }
        for name in &self.netns {
            config.add_netns(name.as_str());
        }
        if self.all_netns {
            config.add_netns(DEFAULT_NETNS_KEY);
            for name in namespace::list().context("listing named namespaces")? {
                config.add_netns(name);
            }
        }

        config.validate().context("invalid configuration")?;
        Ok(config)
    }
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = config.log_level.as_deref().unwrap_or("info");
            EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?
        }
    };

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;
    init_tracing(&config)?;

    let namespaces = netns::discover(&config)
        .await
        .context("discovering namespaces and interfaces")?;
    tracing::info!(
        namespaces = namespaces.len(),
        interfaces = namespaces.interface_count(),
        prefix = %config.metric_prefix,
        "discovered interfaces"
    );

    let source = NetlinkSource::new().with_timeout(config.fetch_timeout());
    let collector = QdiscCollector::new(&config.metric_prefix, namespaces, source)
        .context("building qdisc collector")?;

    match &config.hostname {
        Some(name) => {
            let collector = collector.with_host_resolver(StaticHost::new(name.clone()));
            run(&cli, &config, collector).await
        }
        None => run(&cli, &config, collector.with_host_resolver(SystemHost)).await,
    }
}

async fn run<H>(
    cli: &Cli,
    config: &Config,
    collector: QdiscCollector<NetlinkSource, H>,
) -> anyhow::Result<()>
where
    H: HostResolver + 'static,
{
    if cli.once {
        let samples = collector.collect().await;
        let text = exposition::encode_text(collector.describe(), &samples)?;
        print!("{text}");
        return Ok(());
    }

    let addr = config.listen_addr()?;
    http::serve(addr, Arc::new(collector)).await
}

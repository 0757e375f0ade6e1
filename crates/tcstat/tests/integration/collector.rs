//! Full collections against a real namespace.

use tcstat::{Interface, NamespaceSet, NetlinkSource, QdiscCollector, Result, StaticHost};

use crate::common::TestNamespace;

#[tokio::test]
async fn test_collect_from_namespace() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("collect")?;
    ns.add_dummy("dummy0")?;
    ns.add_qdisc("dummy0", &["root", "handle", "8001:", "fq_codel"])?;

    let links = ns.connection()?.get_links().await?;
    let dummy = links.iter().find(|l| l.name() == Some("dummy0")).unwrap();

    let set = NamespaceSet::new()
        .with(ns.name(), vec![Interface::from(dummy)])
        .with("tcstat-test-gone", vec![Interface::new(1, "lo")]);
    let collector = QdiscCollector::new("tc", set, NetlinkSource::new())?
        .with_host_resolver(StaticHost::new("ci"));

    let snapshot = collector.snapshot().await;
    assert_eq!(snapshot.failures.len(), 1);
    assert_eq!(snapshot.failures[0].netns, "tcstat-test-gone");
    assert!(snapshot.samples.len() >= 8);
    assert_eq!(snapshot.samples.len() % 8, 0);

    let root = snapshot
        .samples
        .iter()
        .find(|s| s.labels.kind == "fq_codel")
        .unwrap();
    assert_eq!(root.labels.handle, "8001:0");
    assert_eq!(root.labels.parent, "ffff:ffff");
    assert_eq!(root.labels.link, "dummy0");
    assert_eq!(root.labels.netns, ns.name());

    Ok(())
}

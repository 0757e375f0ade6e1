//! Qdisc dumps through the netlink source.

use tcstat::source::{NetlinkSource, QdiscSource};
use tcstat::{Handle, Result};

use crate::common::TestNamespace;

async fn ifindex(ns: &TestNamespace, name: &str) -> Result<u32> {
    let links = ns.connection()?.get_links().await?;
    Ok(links
        .iter()
        .find(|l| l.name() == Some(name))
        .map(|l| l.ifindex())
        .unwrap())
}

#[tokio::test]
async fn test_fetch_root_qdisc() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("fetch")?;
    ns.add_dummy("dummy0")?;
    ns.add_qdisc("dummy0", &["root", "handle", "8001:", "fq_codel"])?;
    let index = ifindex(&ns, "dummy0").await?;

    let records = NetlinkSource::new().fetch(index, ns.name()).await?;
    let root = records.iter().find(|r| r.kind == "fq_codel").unwrap();

    assert_eq!(Handle::from_raw(root.handle).to_string(), "8001:0");
    assert_eq!(Handle::from_raw(root.parent).to_string(), "ffff:ffff");

    Ok(())
}

#[tokio::test]
async fn test_fetch_only_returns_requested_interface() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("filter")?;
    ns.add_dummy("dummy0")?;
    ns.add_dummy("dummy1")?;
    ns.add_qdisc("dummy0", &["root", "handle", "1:", "htb"])?;
    ns.add_qdisc("dummy1", &["root", "handle", "2:", "tbf", "rate", "1mbit", "burst", "32kbit", "latency", "400ms"])?;
    let index = ifindex(&ns, "dummy1").await?;

    let records = NetlinkSource::new().fetch(index, ns.name()).await?;
    assert!(!records.is_empty());
    assert!(records.iter().all(|r| r.kind != "htb"));
    assert!(records.iter().any(|r| r.kind == "tbf"));

    Ok(())
}

#[tokio::test]
async fn test_fetch_by_namespace_path() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("path")?;
    let path = format!("/var/run/netns/{}", ns.name());
    let by_path = NetlinkSource::new().fetch(1, &path).await?;
    let by_name = NetlinkSource::new().fetch(1, ns.name()).await?;
    assert_eq!(by_path.len(), by_name.len());

    Ok(())
}

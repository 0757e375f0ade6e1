//! Link enumeration and namespace discovery.

use tcstat::config::Config;
use tcstat::{Interface, Result, netns};

use crate::common::TestNamespace;

#[tokio::test]
async fn test_links_in_fresh_namespace() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("links")?;
    ns.add_dummy("dummy0")?;

    let conn = ns.connection()?;
    let links = conn.get_links().await?;

    let names: Vec<_> = links.iter().filter_map(|l| l.name()).collect();
    assert!(names.contains(&"lo"));
    assert!(names.contains(&"dummy0"));

    Ok(())
}

#[tokio::test]
async fn test_discover_configured_interfaces() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("discover")?;
    ns.add_dummy("dummy0")?;
    ns.add_dummy("dummy1")?;

    let yaml = format!(
        "netns:\n  {}:\n    interfaces: [dummy1, missing0, dummy0]\n",
        ns.name()
    );
    let config = Config::from_yaml(&yaml)?;
    let set = netns::discover(&config).await?;

    let interfaces = set.get(ns.name()).unwrap();
    let names: Vec<_> = interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["dummy1", "dummy0"]);

    Ok(())
}

#[tokio::test]
async fn test_discover_all_interfaces() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("discoverall")?;
    ns.add_dummy("dummy0")?;

    let mut config = Config::default();
    config.add_netns(ns.name());
    let set = netns::discover(&config).await?;

    let interfaces = set.get(ns.name()).unwrap();
    assert_eq!(interfaces[0], Interface::new(1, "lo"));
    assert!(interfaces.iter().any(|i| i.name == "dummy0"));
    assert!(interfaces.windows(2).all(|w| w[0].index < w[1].index));

    Ok(())
}

#[tokio::test]
async fn test_namespace_listing() -> Result<()> {
    require_root!();

    let ns = TestNamespace::new("list")?;
    let names = tcstat::netlink::namespace::list()?;
    assert!(names.iter().any(|n| n == ns.name()));
    assert!(tcstat::netlink::namespace::exists(ns.name()));

    Ok(())
}

#[tokio::test]
async fn test_namespace_socket_leaves_caller_in_place() -> Result<()> {
    require_root!();

    let before = std::fs::read_link("/proc/thread-self/ns/net")?;

    let ns = TestNamespace::new("stay")?;
    ns.add_dummy("tcstaystay0")?;
    let conn = ns.connection()?;
    assert!(conn.get_links().await?.iter().any(|l| l.name() == Some("tcstaystay0")));

    assert_eq!(std::fs::read_link("/proc/thread-self/ns/net")?, before);

    // The caller's own namespace never sees the dummy link.
    let local = tcstat::netlink::Connection::new()?.get_links().await?;
    assert!(local.iter().all(|l| l.name() != Some("tcstaystay0")));

    Ok(())
}

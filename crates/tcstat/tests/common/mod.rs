//! Helpers for root-only tests: throwaway named namespaces and `require_root!`.

use std::io;
use std::process::Command;
use std::sync::atomic::{AtomicU32, Ordering};

use tcstat::netlink::Connection;
use tcstat::{Error, Result};

static NAMESPACE_COUNTER: AtomicU32 = AtomicU32::new(0);

fn unique_ns_name(prefix: &str) -> String {
    let id = NAMESPACE_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("tcstat-test-{}-{}-{}", prefix, std::process::id(), id)
}

/// A named network namespace, deleted on drop.
pub struct TestNamespace {
    name: String,
}

impl TestNamespace {
    pub fn new(prefix: &str) -> Result<Self> {
        let name = unique_ns_name(prefix);

        let status = Command::new("ip")
            .args(["netns", "add", &name])
            .status()
            .map_err(|e| Error::Io(io::Error::from(e.kind())))?;

        if !status.success() {
            return Err(Error::InvalidMessage(format!(
                "failed to create namespace: {}",
                name
            )));
        }

        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn connection(&self) -> Result<Connection> {
        Connection::for_namespace(&self.name)
    }

    /// Run a command in the namespace and return its stdout.
    pub fn exec(&self, cmd: &str, args: &[&str]) -> Result<String> {
        let output = Command::new("ip")
            .args(["netns", "exec", &self.name, cmd])
            .args(args)
            .output()
            .map_err(|e| Error::Io(io::Error::from(e.kind())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::InvalidMessage(format!(
                "command failed: {} {:?}: {}",
                cmd, args, stderr
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn add_dummy(&self, name: &str) -> Result<()> {
        self.exec("ip", &["link", "add", name, "type", "dummy"])?;
        self.exec("ip", &["link", "set", name, "up"])?;
        Ok(())
    }

    pub fn add_qdisc(&self, dev: &str, args: &[&str]) -> Result<()> {
        let mut full = vec!["qdisc", "add", "dev", dev];
        full.extend_from_slice(args);
        self.exec("tc", &full)?;
        Ok(())
    }
}

impl Drop for TestNamespace {
    fn drop(&mut self) {
        let _ = Command::new("ip")
            .args(["netns", "del", &self.name])
            .status();
    }
}

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions.
    unsafe { libc::geteuid() == 0 }
}

/// Skip the test if not running as root.
#[macro_export]
macro_rules! require_root {
    () => {
        if !crate::common::is_root() {
            eprintln!("Skipping test: requires root");
            return Ok(());
        }
    };
}

//! Local host name lookup.

use std::ffi::CStr;
use std::io;

use crate::error::Result;

/// Resolves the value of the `host` label.
pub trait HostResolver: Send + Sync {
    fn hostname(&self) -> Result<String>;
}

/// Asks the kernel for the host name of the exporter's UTS namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostResolver for SystemHost {
    fn hostname(&self) -> Result<String> {
        let mut buf = [0u8; 256];
        // SAFETY: buf is a valid writable buffer of the length passed in.
        let ret = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
        if ret < 0 {
            return Err(io::Error::last_os_error().into());
        }
        // Truncated names are not guaranteed to be NUL-terminated.
        let end = buf.len() - 1;
        buf[end] = 0;
        let name = CStr::from_bytes_until_nul(&buf)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(name)
    }
}

/// Always reports the same name.
#[derive(Debug, Clone, Default)]
pub struct StaticHost(pub String);

impl StaticHost {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl HostResolver for StaticHost {
    fn hostname(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

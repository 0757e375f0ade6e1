//! Async rtnetlink socket.

use std::fs::File;
use std::io;
use std::os::unix::io::{AsRawFd, RawFd};
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;

use bytes::BytesMut;
use netlink_sys::{Socket, SocketAddr, protocols};
use tokio::io::Interest;
use tokio::io::unix::AsyncFd;

use crate::error::{Error, Result};

/// Receive buffer size. Large enough for a full dump datagram.
const RECV_BUF_SIZE: usize = 32768;

/// Async `NETLINK_ROUTE` socket bound to one network namespace.
pub struct NetlinkSocket {
    fd: AsyncFd<Socket>,
    seq: AtomicU32,
    pid: u32,
}

impl NetlinkSocket {
    /// Create a socket in the caller's network namespace.
    pub fn new() -> Result<Self> {
        let (socket, pid) = open_socket()?;
        Self::from_socket(socket, pid)
    }

    /// Create a socket that operates in the namespace referred to by `ns_fd`.
    ///
    /// The socket is opened on a short-lived thread that enters the target
    /// namespace and exits afterwards, so the calling thread never leaves its
    /// own namespace. A socket keeps the namespace it was created in for its
    /// whole lifetime.
    pub fn new_in_namespace(ns_fd: RawFd) -> Result<Self> {
        let (socket, pid) = thread::scope(|scope| {
            scope
                .spawn(|| {
                    // SAFETY: ns_fd refers to an open namespace file owned by the caller,
                    // and only this thread switches namespace.
                    let ret = unsafe { libc::setns(ns_fd, libc::CLONE_NEWNET) };
                    if ret < 0 {
                        return Err(Error::Io(io::Error::last_os_error()));
                    }
                    open_socket()
                })
                .join()
                .unwrap_or_else(|_| Err(Error::Io(io::Error::other("namespace thread panicked"))))
        })?;
        Self::from_socket(socket, pid)
    }

    /// Create a socket in the namespace file at `ns_path`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        let ns_file = open_namespace(ns_path.as_ref())?;
        Self::new_in_namespace(ns_file.as_raw_fd())
    }

    fn from_socket(socket: Socket, pid: u32) -> Result<Self> {
        let fd = AsyncFd::new(socket)?;

        Ok(Self {
            fd,
            seq: AtomicU32::new(1),
            pid,
        })
    }

    /// Get the next sequence number.
    pub fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Get the local port ID assigned by the kernel.
    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Send a message.
    pub async fn send(&self, msg: &[u8]) -> Result<()> {
        loop {
            let mut guard = self.fd.ready(Interest::WRITABLE).await?;

            match guard.try_io(|inner| inner.get_ref().send(msg, 0)) {
                Ok(result) => {
                    result?;
                    return Ok(());
                }
                Err(_would_block) => continue,
            }
        }
    }

    /// Receive one datagram.
    pub async fn recv_msg(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::with_capacity(RECV_BUF_SIZE);

        loop {
            let mut guard = self.fd.ready(Interest::READABLE).await?;

            match guard.try_io(|inner| inner.get_ref().recv(&mut buf, 0)) {
                Ok(result) => {
                    result?;
                    return Ok(buf.to_vec());
                }
                Err(_would_block) => continue,
            }
        }
    }
}

/// Open and bind a non-blocking socket in the current thread's namespace.
fn open_socket() -> Result<(Socket, u32)> {
    let mut socket = Socket::new(protocols::NETLINK_ROUTE)?;
    socket.set_non_blocking(true)?;

    let mut addr = SocketAddr::new(0, 0);
    socket.bind(&addr)?;
    socket.get_address(&mut addr)?;

    // Older kernels reject extended ACK; plain errors still work.
    socket.set_ext_ack(true).ok();

    Ok((socket, addr.port_number()))
}

/// Open a namespace file. Only a missing file means the namespace is unknown.
fn open_namespace(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::NamespaceNotFound {
            name: path.display().to_string(),
        },
        _ => Error::Io(e),
    })
}

impl AsRawFd for NetlinkSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.get_ref().as_raw_fd()
    }
}

//! Qdisc handle decoding.
//!
//! Handles and parents are 32-bit values split into a 16-bit major and a
//! 16-bit minor. They are always rendered as `major:minor` in lowercase hex
//! without padding, including the reserved values: the root parent is
//! `ffff:ffff`, never `root`.

use std::fmt;

/// Root qdisc parent.
pub const ROOT: u32 = 0xFFFF_FFFF;
/// Ingress qdisc parent.
pub const INGRESS: u32 = 0xFFFF_FFF1;
/// Clsact qdisc parent.
pub const CLSACT: u32 = 0xFFFF_FFF2;
/// Unspecified handle.
pub const UNSPEC: u32 = 0;

/// Split a raw handle into `(major, minor)`.
#[inline]
pub const fn decode(handle: u32) -> (u16, u16) {
    ((handle >> 16) as u16, (handle & 0xFFFF) as u16)
}

/// A decoded handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Handle {
    /// Major number (upper 16 bits).
    pub major: u16,
    /// Minor number (lower 16 bits).
    pub minor: u16,
}

impl Handle {
    pub const ROOT: Self = Self::from_raw(ROOT);
    pub const INGRESS: Self = Self::from_raw(INGRESS);
    pub const CLSACT: Self = Self::from_raw(CLSACT);
    pub const UNSPEC: Self = Self::from_raw(UNSPEC);

    /// Create a handle from a raw 32-bit value.
    pub const fn from_raw(raw: u32) -> Self {
        let (major, minor) = decode(raw);
        Self { major, minor }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}:{:x}", self.major, self.minor)
    }
}

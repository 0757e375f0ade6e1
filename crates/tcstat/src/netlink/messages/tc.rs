//! Strongly-typed qdisc message.

use winnow::prelude::*;
use winnow::token::take;

use crate::netlink::parse::{
    FromNetlink, PResult, attrs, cut, parse_attr, parse_string_from_bytes, u32_at, u64_at,
};
use crate::netlink::types::TcMsg;

/// Attribute IDs for TCA_* constants.
mod attr_ids {
    pub const TCA_KIND: u16 = 1;
    pub const TCA_STATS: u16 = 3;
    pub const TCA_STATS2: u16 = 7;
}

/// Nested TCA_STATS2 attribute IDs.
mod stats2_ids {
    pub const TCA_STATS_BASIC: u16 = 1;
    pub const TCA_STATS_RATE_EST: u16 = 2;
    pub const TCA_STATS_QUEUE: u16 = 3;
    pub const TCA_STATS_BASIC_HW: u16 = 7;
    pub const TCA_STATS_PKT64: u16 = 8;
}

/// Size of the legacy `struct tc_stats` block.
const TC_STATS_LEN: usize = 36;

/// A qdisc as reported by `RTM_NEWQDISC`.
#[derive(Debug, Clone, Default)]
pub struct TcMessage {
    /// Fixed-size header (struct tcmsg).
    pub header: TcMsg,
    /// Qdisc type (e.g. "fq_codel", "htb").
    pub kind: Option<String>,
    /// Basic statistics.
    pub stats_basic: Option<TcStatsBasic>,
    /// Queue statistics.
    pub stats_queue: Option<TcStatsQueue>,
    /// Rate estimator.
    pub stats_rate_est: Option<TcStatsRateEst>,
}

/// Byte and packet counters (`gnet_stats_basic`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcStatsBasic {
    pub bytes: u64,
    pub packets: u64,
}

/// Queue statistics (`gnet_stats_queue`), without requeues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcStatsQueue {
    /// Current queue length in packets.
    pub qlen: u32,
    /// Backlog in bytes.
    pub backlog: u32,
    pub drops: u32,
    pub overlimits: u32,
}

/// Rate estimator (`gnet_stats_rate_est`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TcStatsRateEst {
    /// Bytes per second.
    pub bps: u32,
    /// Packets per second.
    pub pps: u32,
}

impl TcMessage {
    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.tcm_ifindex as u32
    }

    /// Get the qdisc handle.
    pub fn handle(&self) -> u32 {
        self.header.tcm_handle
    }

    /// Get the parent handle.
    pub fn parent(&self) -> u32 {
        self.header.tcm_parent
    }

    /// Get the kind if present.
    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn bytes(&self) -> u64 {
        self.stats_basic.map(|s| s.bytes).unwrap_or(0)
    }

    pub fn packets(&self) -> u64 {
        self.stats_basic.map(|s| s.packets).unwrap_or(0)
    }

    pub fn drops(&self) -> u32 {
        self.stats_queue.map(|s| s.drops).unwrap_or(0)
    }

    pub fn overlimits(&self) -> u32 {
        self.stats_queue.map(|s| s.overlimits).unwrap_or(0)
    }

    pub fn qlen(&self) -> u32 {
        self.stats_queue.map(|s| s.qlen).unwrap_or(0)
    }

    pub fn backlog(&self) -> u32 {
        self.stats_queue.map(|s| s.backlog).unwrap_or(0)
    }

    /// Bytes per second, 0 without a rate estimator.
    pub fn bps(&self) -> u32 {
        self.stats_rate_est.map(|s| s.bps).unwrap_or(0)
    }

    /// Packets per second, 0 without a rate estimator.
    pub fn pps(&self) -> u32 {
        self.stats_rate_est.map(|s| s.pps).unwrap_or(0)
    }

    fn has_stats(&self) -> bool {
        self.stats_basic.is_some() || self.stats_queue.is_some() || self.stats_rate_est.is_some()
    }
}

impl FromNetlink for TcMessage {
    fn write_dump_header(buf: &mut Vec<u8>) {
        buf.extend_from_slice(TcMsg::new().as_bytes());
    }

    fn parse(input: &mut &[u8]) -> PResult<Self> {
        if input.len() < TcMsg::SIZE {
            return cut();
        }

        let header_bytes: &[u8] = take(TcMsg::SIZE).parse_next(input)?;
        let header = TcMsg::from_bytes(header_bytes).or_else(|_| cut())?;

        let mut msg = TcMessage {
            header,
            ..Default::default()
        };
        let mut legacy = None;

        while input.len() >= 4 {
            let (attr_type, data) = parse_attr(input)?;
            match attr_type {
                attr_ids::TCA_KIND => msg.kind = Some(parse_string_from_bytes(data)),
                attr_ids::TCA_STATS2 => parse_stats2(&mut msg, data),
                attr_ids::TCA_STATS => legacy = Some(data),
                _ => {}
            }
        }

        // The kernel sends both blocks; tc_stats only fills in when STATS2 is missing.
        if let Some(data) = legacy.filter(|_| !msg.has_stats()) {
            parse_legacy_stats(&mut msg, data);
        }

        Ok(msg)
    }
}

/// Parse the nested TCA_STATS2 attributes.
fn parse_stats2(msg: &mut TcMessage, data: &[u8]) {
    for (attr_type, payload) in attrs(data) {
        match attr_type {
            stats2_ids::TCA_STATS_BASIC => {
                if let (Some(bytes), Some(packets)) = (u64_at(payload, 0), u32_at(payload, 8)) {
                    let stats = msg.stats_basic.get_or_insert_with(Default::default);
                    stats.bytes = bytes;
                    // PKT64 may already have supplied the full-width count.
                    if stats.packets == 0 {
                        stats.packets = packets as u64;
                    }
                }
            }
            stats2_ids::TCA_STATS_PKT64 => {
                if let Some(packets) = u64_at(payload, 0) {
                    msg.stats_basic.get_or_insert_with(Default::default).packets = packets;
                }
            }
            stats2_ids::TCA_STATS_QUEUE => {
                if payload.len() >= 20 {
                    msg.stats_queue = Some(TcStatsQueue {
                        qlen: u32_at(payload, 0).unwrap_or(0),
                        backlog: u32_at(payload, 4).unwrap_or(0),
                        drops: u32_at(payload, 8).unwrap_or(0),
                        overlimits: u32_at(payload, 16).unwrap_or(0),
                    });
                }
            }
            stats2_ids::TCA_STATS_RATE_EST => {
                if let (Some(bps), Some(pps)) = (u32_at(payload, 0), u32_at(payload, 4)) {
                    msg.stats_rate_est = Some(TcStatsRateEst { bps, pps });
                }
            }
            // Hardware counters are a subset of the software ones.
            stats2_ids::TCA_STATS_BASIC_HW => {}
            _ => {}
        }
    }
}

/// Parse the legacy TCA_STATS block (struct tc_stats).
///
/// Layout: u64 bytes, then u32 packets, drops, overlimits, bps, pps, qlen, backlog.
fn parse_legacy_stats(msg: &mut TcMessage, data: &[u8]) {
    if data.len() < TC_STATS_LEN {
        return;
    }
    let word = |offset| u32_at(data, offset).unwrap_or(0);

    msg.stats_basic = Some(TcStatsBasic {
        bytes: u64_at(data, 0).unwrap_or(0),
        packets: word(8) as u64,
    });
    msg.stats_queue = Some(TcStatsQueue {
        qlen: word(28),
        backlog: word(32),
        drops: word(12),
        overlimits: word(16),
    });
    msg.stats_rate_est = Some(TcStatsRateEst {
        bps: word(20),
        pps: word(24),
    });
}

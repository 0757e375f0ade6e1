//! Strongly-typed link message.

use winnow::prelude::*;
use winnow::token::take;

use crate::netlink::parse::{FromNetlink, PResult, cut, parse_attr, parse_string_from_bytes};
use crate::netlink::types::IfInfoMsg;

mod attr_ids {
    pub const IFLA_IFNAME: u16 = 3;
}

/// A link as reported by `RTM_NEWLINK`, reduced to what the collector needs.
#[derive(Debug, Clone, Default)]
pub struct LinkMessage {
    /// Fixed-size header.
    pub header: IfInfoMsg,
    /// Interface name (IFLA_IFNAME).
    pub name: Option<String>,
}

impl LinkMessage {
    /// Get the interface index.
    pub fn ifindex(&self) -> u32 {
        self.header.ifi_index as u32
    }

    /// Get the interface name.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get the interface name, or "?" if unknown.
    pub fn name_or(&self) -> &str {
        self.name().unwrap_or("?")
    }
}

impl FromNetlink for LinkMessage {
    fn write_dump_header(buf: &mut Vec<u8>) {
        buf.extend_from_slice(IfInfoMsg::new().as_bytes());
    }

    fn parse(input: &mut &[u8]) -> PResult<Self> {
        if input.len() < IfInfoMsg::SIZE {
            return cut();
        }

        let header_bytes: &[u8] = take(IfInfoMsg::SIZE).parse_next(input)?;
        let header = IfInfoMsg::from_bytes(header_bytes).or_else(|_| cut())?;

        let mut msg = LinkMessage {
            header,
            ..Default::default()
        };

        while input.len() >= 4 {
            let (attr_type, data) = parse_attr(input)?;
            if attr_type == attr_ids::IFLA_IFNAME {
                msg.name = Some(parse_string_from_bytes(data));
            }
        }

        Ok(msg)
    }
}

//! Captured rtnetlink payloads for parser tests.
//!
//! Payloads start after the nlmsghdr, the way `FromNetlink::from_bytes`
//! expects them. Multi-byte fields are written in native byte order.

use super::message::{NLM_F_MULTI, NLMSG_HDRLEN, NlMsgHdr, nlmsg_align};
use super::types::TcMsg;

/// Append one attribute (header, payload and padding) to `buf`.
pub fn push_attr(buf: &mut Vec<u8>, attr_type: u16, payload: &[u8]) {
    let len = (4 + payload.len()) as u16;
    buf.extend_from_slice(&len.to_ne_bytes());
    buf.extend_from_slice(&attr_type.to_ne_bytes());
    buf.extend_from_slice(payload);
    buf.resize(nlmsg_align(buf.len()), 0);
}

/// Wrap a payload in a netlink header as one message of a dump reply.
pub fn frame(msg_type: u16, seq: u32, payload: &[u8]) -> Vec<u8> {
    let mut hdr = NlMsgHdr::new(msg_type, NLM_F_MULTI);
    hdr.nlmsg_len = (NLMSG_HDRLEN + payload.len()) as u32;
    hdr.nlmsg_seq = seq;
    let mut buf = hdr.as_bytes().to_vec();
    buf.extend_from_slice(payload);
    buf.resize(nlmsg_align(buf.len()), 0);
    buf
}

fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

/// Legacy `struct tc_stats`.
fn tc_stats(bytes: u64, rest: [u32; 7]) -> Vec<u8> {
    let mut data = bytes.to_ne_bytes().to_vec();
    data.extend(words(&rest));
    data
}

/// fq_codel root qdisc on eth0 (ifindex 2), handle 8001:0.
/// Captured from: tc -s qdisc show dev eth0
pub fn qdisc_fq_codel() -> Vec<u8> {
    let mut header = TcMsg::new().with_ifindex(2);
    header.tcm_handle = 0x8001_0000;
    header.tcm_parent = 0xffff_ffff;
    header.tcm_info = 2;

    let mut buf = header.as_bytes().to_vec();
    push_attr(&mut buf, 1, b"fq_codel\0");
    // TCA_OPTIONS: TCA_FQ_CODEL_TARGET = 4999us
    let mut options = Vec::new();
    push_attr(&mut options, 1, &4999u32.to_ne_bytes());
    push_attr(&mut buf, 2 | 0x8000, &options);

    let mut stats2 = Vec::new();
    // TCA_STATS_BASIC: bytes = 100, packets = 5, padding
    let mut basic = 100u64.to_ne_bytes().to_vec();
    basic.extend(words(&[5, 0]));
    push_attr(&mut stats2, 1, &basic);
    // TCA_STATS_RATE_EST: bps = 10, pps = 1
    push_attr(&mut stats2, 2, &words(&[10, 1]));
    // TCA_STATS_QUEUE: qlen = 1, backlog = 3, drops = 2, requeues = 0, overlimits = 4
    push_attr(&mut stats2, 3, &words(&[1, 3, 2, 0, 4]));
    push_attr(&mut buf, 7 | 0x8000, &stats2);

    // TCA_STATS: stale legacy copy the kernel sends alongside STATS2.
    push_attr(&mut buf, 3, &tc_stats(99, [4, 1, 3, 9, 9, 0, 2]));
    buf
}

/// pfifo_fast qdisc on ifindex 3 reporting only the legacy TCA_STATS block.
pub fn qdisc_legacy_stats() -> Vec<u8> {
    let mut header = TcMsg::new().with_ifindex(3);
    header.tcm_parent = 0xffff_ffff;

    let mut buf = header.as_bytes().to_vec();
    push_attr(&mut buf, 1, b"pfifo_fast\0");
    // bytes, packets, drops, overlimits, bps, pps, qlen, backlog
    push_attr(&mut buf, 3, &tc_stats(1500, [10, 1, 2, 300, 4, 5, 6]));
    buf
}

/// Link message for the loopback interface.
/// Captured from: ip link show lo
pub fn link_loopback() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x00, 0x00]); // family, pad
    buf.extend_from_slice(&772u16.to_ne_bytes()); // ARPHRD_LOOPBACK
    buf.extend_from_slice(&1i32.to_ne_bytes()); // index = 1
    buf.extend_from_slice(&0x49u32.to_ne_bytes()); // IFF_UP | IFF_LOOPBACK | IFF_RUNNING
    buf.extend_from_slice(&0u32.to_ne_bytes()); // change
    push_attr(&mut buf, 3, b"lo\0"); // IFLA_IFNAME
    push_attr(&mut buf, 4, &65536u32.to_ne_bytes()); // IFLA_MTU
    push_attr(&mut buf, 13, &1000u32.to_ne_bytes()); // IFLA_TXQLEN
    push_attr(&mut buf, 6, b"noqueue\0"); // IFLA_QDISC
    push_attr(&mut buf, 16, &[0]); // IFLA_OPERSTATE
    buf
}

/// Link message for eth0 (ifindex 2).
pub fn link_eth0() -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(&1u16.to_ne_bytes()); // ARPHRD_ETHER
    buf.extend_from_slice(&2i32.to_ne_bytes());
    buf.extend_from_slice(&0x1043u32.to_ne_bytes()); // UP | BROADCAST | RUNNING | MULTICAST
    buf.extend_from_slice(&0u32.to_ne_bytes());
    push_attr(&mut buf, 3, b"eth0\0");
    push_attr(&mut buf, 4, &1500u32.to_ne_bytes());
    push_attr(&mut buf, 6, b"fq_codel\0");
    buf
}

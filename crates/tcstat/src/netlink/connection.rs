//! High-level rtnetlink connection.

use std::path::Path;

use tracing::{debug, warn};

use super::builder::MessageBuilder;
use super::message::{MessageIter, NLMSG_HDRLEN, NlMsgError, NlMsgHdr, NlMsgType, nlmsg_align};
use super::messages::{LinkMessage, TcMessage};
use super::namespace::NamespaceSpec;
use super::parse::FromNetlink;
use super::socket::NetlinkSocket;
use super::types::TcMsg;
use crate::error::{Error, Result};

/// An rtnetlink connection bound to one network namespace.
pub struct Connection {
    socket: NetlinkSocket,
}

impl Connection {
    /// Create a connection in the caller's namespace.
    pub fn new() -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new()?,
        })
    }

    /// Create a connection in the namespace file at `ns_path`.
    pub fn new_in_namespace_path<P: AsRef<Path>>(ns_path: P) -> Result<Self> {
        Ok(Self {
            socket: NetlinkSocket::new_in_namespace_path(ns_path)?,
        })
    }

    /// Create a connection for a namespace identifier (`""`, a name, or a path).
    pub fn for_namespace(netns: &str) -> Result<Self> {
        NamespaceSpec::parse(netns).connection()
    }

    /// Send a dump request and collect every reply message (header included).
    pub async fn dump(&self, mut builder: MessageBuilder) -> Result<Vec<Vec<u8>>> {
        let seq = self.socket.next_seq();
        builder.set_seq(seq);
        builder.set_pid(self.socket.pid());

        let msg = builder.finish();
        self.socket.send(&msg).await?;

        let mut responses = Vec::new();
        loop {
            let data = self.socket.recv_msg().await?;
            if collect_dump_replies(&data, seq, &mut responses)? {
                break;
            }
        }

        Ok(responses)
    }

    /// Send a dump request and parse every reply into `T`.
    ///
    /// Replies that fail to parse are skipped.
    pub async fn dump_typed<T: FromNetlink>(&self, msg_type: u16) -> Result<Vec<T>> {
        let mut builder = MessageBuilder::dump(msg_type);
        let mut header = Vec::new();
        T::write_dump_header(&mut header);
        builder.append_bytes(&header);

        let responses = self.dump(builder).await?;
        Ok(parse_replies(&responses))
    }

    /// Get all network interfaces.
    pub async fn get_links(&self) -> Result<Vec<LinkMessage>> {
        self.dump_typed(NlMsgType::RTM_GETLINK)
            .await
            .map_err(|e| e.with_context("dumping links"))
    }

    /// Get the qdiscs attached to one interface.
    ///
    /// The index goes into the request header so that kernels that filter
    /// dumps do the work; replies are filtered again for those that don't.
    pub async fn get_qdiscs_by_index(&self, ifindex: u32) -> Result<Vec<TcMessage>> {
        let mut builder = MessageBuilder::dump(NlMsgType::RTM_GETQDISC);
        builder.append_bytes(TcMsg::new().with_ifindex(ifindex as i32).as_bytes());

        let responses = self
            .dump(builder)
            .await
            .map_err(|e| e.with_context(format!("dumping qdiscs on ifindex {ifindex}")))?;

        Ok(parse_replies::<TcMessage>(&responses)
            .into_iter()
            .filter(|q| q.ifindex() == ifindex)
            .collect())
    }
}

/// Fold one received datagram into `responses`.
///
/// Returns `true` once the dump terminator for `seq` has been seen.
fn collect_dump_replies(data: &[u8], seq: u32, responses: &mut Vec<Vec<u8>>) -> Result<bool> {
    let mut rest = data;
    for result in MessageIter::new(data) {
        let (header, payload) = result?;
        let msg_len = header.nlmsg_len as usize;
        let whole = &rest[..msg_len];
        rest = rest.get(nlmsg_align(msg_len)..).unwrap_or(&[]);

        if header.nlmsg_seq != seq {
            continue;
        }

        if header.is_error() {
            let err = NlMsgError::from_bytes(payload)?;
            if !err.is_ack() {
                return Err(Error::from_errno(err.error));
            }
            continue;
        }

        if header.is_done() {
            if header.is_dump_interrupted() {
                debug!(seq, "netlink dump was interrupted, results may be inconsistent");
            }
            return Ok(true);
        }

        responses.push(whole.to_vec());
    }
    Ok(false)
}

/// Parse every reply payload, logging and skipping the ones that don't parse.
fn parse_replies<T: FromNetlink>(responses: &[Vec<u8>]) -> Vec<T> {
    responses
        .iter()
        .filter(|r| r.len() >= NLMSG_HDRLEN)
        .filter_map(|r| match T::from_bytes(&r[NLMSG_HDRLEN..]) {
            Ok(msg) => Some(msg),
            Err(e) => {
                warn!(
                    msg_type = NlMsgHdr::from_bytes(r).map(|h| h.nlmsg_type).unwrap_or(0),
                    len = r.len(),
                    err = %e,
                    "skipping unparseable netlink reply"
                );
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;
    use crate::log_capture;
    use crate::netlink::fixtures::{self, frame};

    #[test]
    fn test_collects_until_done() {
        let mut data = frame(NlMsgType::RTM_NEWQDISC, 5, &fixtures::qdisc_fq_codel());
        data.extend(frame(NlMsgType::RTM_NEWQDISC, 5, &fixtures::qdisc_legacy_stats()));

        let mut responses = Vec::new();
        assert!(!collect_dump_replies(&data, 5, &mut responses).unwrap());
        assert_eq!(responses.len(), 2);

        let done = frame(NlMsgType::DONE, 5, &0i32.to_ne_bytes());
        assert!(collect_dump_replies(&done, 5, &mut responses).unwrap());
        assert_eq!(responses.len(), 2);

        let qdiscs: Vec<TcMessage> = parse_replies(&responses);
        assert_eq!(qdiscs.len(), 2);
        assert_eq!(qdiscs[0].kind(), Some("fq_codel"));
        assert_eq!(qdiscs[1].ifindex(), 3);
    }

    #[test]
    fn test_ignores_other_sequence_numbers() {
        let data = frame(NlMsgType::RTM_NEWLINK, 9, &fixtures::link_loopback());
        let mut responses = Vec::new();
        assert!(!collect_dump_replies(&data, 10, &mut responses).unwrap());
        assert!(responses.is_empty());
    }

    #[test]
    fn test_kernel_error() {
        let mut payload = (-19i32).to_ne_bytes().to_vec();
        payload.extend_from_slice(&[0u8; 16]);
        let data = frame(NlMsgType::ERROR, 3, &payload);

        let mut responses = Vec::new();
        let err = collect_dump_replies(&data, 3, &mut responses).unwrap_err();
        assert_eq!(err.errno(), Some(19));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unparseable_replies_are_skipped_and_logged() {
        let (logged, _guard) = log_capture::capture();

        let responses = vec![
            frame(NlMsgType::RTM_NEWQDISC, 1, &fixtures::qdisc_fq_codel()),
            frame(NlMsgType::RTM_NEWQDISC, 1, &[0u8; 4]),
        ];
        let qdiscs: Vec<TcMessage> = parse_replies(&responses);
        assert_eq!(qdiscs.len(), 1);
        assert_eq!(qdiscs[0].kind(), Some("fq_codel"));

        let skipped = logged.with_message(Level::WARN, "skipping unparseable netlink reply");
        assert_eq!(skipped.len(), 1);
        assert_eq!(
            skipped[0].field("msg_type"),
            Some(NlMsgType::RTM_NEWQDISC.to_string().as_str())
        );
        assert!(skipped[0].field("err").is_some());
    }
}

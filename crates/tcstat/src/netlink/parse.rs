//! Parser combinators and the `FromNetlink` trait for typed message parsing.

use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take;

use crate::error::{Error, Result};

/// Result type for winnow parsers.
pub type PResult<T> = core::result::Result<T, winnow::error::ErrMode<ContextError>>;

/// Attribute type bits that are flags rather than part of the type.
pub const NLA_TYPE_MASK: u16 = 0x3FFF;

/// Trait for types that can be parsed from a netlink payload.
pub trait FromNetlink: Sized {
    /// Parse from a mutable byte slice reference.
    /// The slice is advanced past the consumed bytes.
    fn parse(input: &mut &[u8]) -> PResult<Self>;

    /// Parse from a complete byte slice.
    fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse
            .parse(data)
            .map_err(|e| Error::Parse(format!("{}", e)))
    }

    /// Write the fixed header that must follow the nlmsghdr of a dump request.
    fn write_dump_header(_buf: &mut Vec<u8>) {}
}

/// Build a hard parse failure.
pub(crate) fn cut<T>() -> PResult<T> {
    Err(winnow::error::ErrMode::Cut(ContextError::new()))
}

/// Parse a native-endian u16.
pub fn ne_u16(input: &mut &[u8]) -> PResult<u16> {
    let bytes: &[u8] = take(2usize).parse_next(input)?;
    Ok(u16::from_ne_bytes([bytes[0], bytes[1]]))
}

/// Parse one attribute header and return `(type, payload)`.
///
/// The type has the `NLA_F_NESTED`/`NLA_F_NET_BYTEORDER` flag bits masked off,
/// and trailing alignment padding is consumed when present.
pub fn parse_attr<'a>(input: &mut &'a [u8]) -> PResult<(u16, &'a [u8])> {
    let len = ne_u16(input)? as usize;
    let attr_type = ne_u16(input)?;

    if len < 4 {
        return cut();
    }

    let payload: &[u8] = take(len - 4).parse_next(input)?;

    let aligned = (len + 3) & !3;
    let padding = aligned - len;
    if input.len() >= padding {
        let _: &[u8] = take(padding).parse_next(input)?;
    } else {
        *input = &[];
    }

    Ok((attr_type & NLA_TYPE_MASK, payload))
}

/// Iterate the attributes of a payload, stopping quietly at the first malformed one.
pub fn attrs(data: &[u8]) -> impl Iterator<Item = (u16, &[u8])> {
    let mut input = data;
    std::iter::from_fn(move || {
        if input.len() < 4 {
            return None;
        }
        parse_attr(&mut input).ok()
    })
}

/// Parse a string from a fixed-size buffer (null-terminated).
pub fn parse_string_from_bytes(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    String::from_utf8_lossy(&data[..end]).into_owned()
}

/// Read a native-endian u32 at `offset`, if the payload is long enough.
pub fn u32_at(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset + 4)?;
    Some(u32::from_ne_bytes(bytes.try_into().ok()?))
}

/// Read a native-endian u64 at `offset`, if the payload is long enough.
pub fn u64_at(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset + 8)?;
    Some(u64::from_ne_bytes(bytes.try_into().ok()?))
}

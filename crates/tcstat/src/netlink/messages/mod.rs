//! Typed rtnetlink messages.

mod link;
mod tc;

pub use link::*;
pub use tc::*;

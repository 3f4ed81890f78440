//! Logical/engine channel id mapping.
//!
//! Consumers address channels with zero-based ids; the protocol engine keeps
//! channel 0 for its own control traffic, so everything user-facing shifts up
//! by one on the wire.

/// Engine channel reserved for internal control traffic.
pub const RESERVED_ENGINE_CHANNEL: u8 = 0;

/// Map a zero-based logical channel to its one-based engine channel.
#[inline]
pub fn to_engine(logical: u8) -> u8 {
    logical + 1
}

/// Map a one-based engine channel back to its zero-based logical channel.
#[inline]
pub fn to_logical(engine: u8) -> u8 {
    engine - 1
}

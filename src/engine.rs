//! Capability seam for the external protocol engine.
//!
//! The engine owns congestion control, retransmission and framing; this crate
//! only drives it. [`ServerEngine`] and [`ClientEngine`] mirror the engine's
//! poll contract: the tick methods pump its socket reads and writes and are
//! the only place its queued data callbacks dispatch. Connect and disconnect
//! callbacks are the exception and may arrive from the engine's own thread,
//! which is why every callback bundle is `Send`.
//!
//! Callbacks are registered at construction through [`EngineFactory`], so no
//! callback can ever fire before registration.

use crate::config::ConnectionConfig;
use crate::error::Result;
use bytes::Bytes;
use std::fmt;
use std::net::SocketAddr;

/// Identifier the engine assigns to a remote connection
pub type ConnectionId = u32;

/// Error classes reported by the protocol engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Failed to resolve a host name
    DnsResolve,
    /// Connection timed out
    Timeout,
    /// The send queue is congested
    Congestion,
    /// Received an invalid packet
    InvalidReceive,
    /// Attempted an invalid send
    InvalidSend,
    /// Connection closed by the remote end
    ConnectionClosed,
    /// Unexpected engine failure
    Unexpected,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::DnsResolve => write!(f, "dns resolve failed"),
            ErrorCode::Timeout => write!(f, "timed out"),
            ErrorCode::Congestion => write!(f, "congestion"),
            ErrorCode::InvalidReceive => write!(f, "invalid receive"),
            ErrorCode::InvalidSend => write!(f, "invalid send"),
            ErrorCode::ConnectionClosed => write!(f, "connection closed"),
            ErrorCode::Unexpected => write!(f, "unexpected"),
        }
    }
}

/// Callbacks a server engine dispatches.
///
/// `on_data` fires only inside `tick_incoming`; `on_connected` and
/// `on_disconnected` may fire from the engine's own thread. The channel
/// argument of `on_data` is the engine's one-based channel id.
pub struct ServerCallbacks {
    pub on_connected: Box<dyn FnMut(ConnectionId) + Send>,
    pub on_data: Box<dyn FnMut(ConnectionId, Bytes, u8) + Send>,
    pub on_disconnected: Box<dyn FnMut(ConnectionId) + Send>,
    pub on_error: Box<dyn FnMut(ConnectionId, ErrorCode, String) + Send>,
}

/// Callbacks a client engine dispatches.
pub struct ClientCallbacks {
    pub on_connected: Box<dyn FnMut() + Send>,
    pub on_data: Box<dyn FnMut(Bytes, u8) + Send>,
    pub on_disconnected: Box<dyn FnMut() + Send>,
    pub on_error: Box<dyn FnMut(ErrorCode, String) + Send>,
}

/// Server side of the protocol engine.
pub trait ServerEngine: Send {
    /// Bind and start listening on `port`.
    fn start(&mut self, port: u16) -> Result<()>;

    /// Stop listening and drop every connection.
    fn stop(&mut self);

    /// Send `payload` to `connection` on the given engine channel.
    fn send(&mut self, connection: ConnectionId, channel: u8, payload: Bytes) -> Result<()>;

    /// Disconnect one remote connection.
    fn disconnect(&mut self, connection: ConnectionId);

    /// Pump socket reads and dispatch queued callbacks.
    fn tick_incoming(&mut self);

    /// Pump socket writes.
    fn tick_outgoing(&mut self);

    /// Remote address of `connection`, if the engine knows it.
    fn connection_address(&self, connection: ConnectionId) -> Option<SocketAddr>;
}

/// Client side of the protocol engine.
pub trait ClientEngine: Send {
    /// Initiate a connection to `address:port`. Completion is signaled later
    /// through the connected callback, never synchronously.
    fn connect(&mut self, address: &str, port: u16) -> Result<()>;

    /// Disconnect from the server.
    fn disconnect(&mut self);

    /// Send `payload` on the given engine channel.
    fn send(&mut self, channel: u8, payload: Bytes) -> Result<()>;

    /// Pump socket reads and dispatch queued callbacks.
    fn tick_incoming(&mut self);

    /// Pump socket writes.
    fn tick_outgoing(&mut self);
}

/// Constructs engine instances from a configuration snapshot with their
/// callbacks registered.
pub trait EngineFactory: Send {
    fn server(
        &self,
        config: &ConnectionConfig,
        callbacks: ServerCallbacks,
    ) -> Result<Box<dyn ServerEngine>>;

    fn client(
        &self,
        config: &ConnectionConfig,
        callbacks: ClientCallbacks,
    ) -> Result<Box<dyn ClientEngine>>;
}

//! # kcp-transport
//!
//! A poll-driven, engine-agnostic transport adapter over a reliable-UDP
//! (KCP-style) protocol engine.
//!
//! The consuming framework expects a polling model: it calls
//! [`iterate_incoming`](adapter::TransportAdapter::iterate_incoming) and
//! [`iterate_outgoing`](adapter::TransportAdapter::iterate_outgoing) once per
//! application tick and receives data and state changes as synchronous
//! callbacks. The protocol engine underneath is callback-driven and may run
//! its socket I/O on its own threads. This crate translates between the two
//! models while keeping one guarantee intact: a remote connect or disconnect
//! is always observed strictly before the data that follows it.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │    Consumer (1 thread)   │  start/stop, iterate ticks, send
//! ├──────────────────────────┤
//! │     TransportAdapter     │  state machines, channel mapping
//! ├────────────┬─────────────┤
//! │ RemoteEvent│  live conn  │  cross-thread FIFO, drain-on-data
//! │   queue    │    table    │
//! ├────────────┴─────────────┤
//! │  ServerEngine / Client   │  external collaborator (capability
//! │  Engine (via factory)    │  traits; retransmission, framing)
//! └──────────────────────────┘
//! ```
//!
//! The engine itself (congestion control, retransmission, framing) is not
//! part of this crate: implement [`engine::ServerEngine`],
//! [`engine::ClientEngine`] and [`engine::EngineFactory`] for the engine you
//! bind to. Engine callbacks must dispatch their data path from within the
//! tick calls; connect and disconnect notifications may arrive from any
//! thread and are re-ordered by the adapter's event queue.
//!
//! Everything on the adapter's public surface must be driven from a single
//! consumer thread. There is no async runtime and there are no internal
//! timers: time only advances when the consumer ticks.

pub mod adapter;
pub mod channel;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod state;

pub use adapter::{TransportAdapter, TransportHandlers};
pub use config::{ConnectionConfig, TransportConfig, MTU_MAX, MTU_MIN};
pub use engine::{
    ClientCallbacks, ClientEngine, ConnectionId, EngineFactory, ErrorCode, ServerCallbacks,
    ServerEngine,
};
pub use error::{Result, TransportError};
pub use events::{RemoteEvent, RemoteEventQueue};
pub use state::{
    ConnectionStateMachine, LocalConnectionState, LocalStateChange, RemoteConnectionState, Role,
};

//! Scripted mock of the protocol engine collaborator.
//!
//! The mock records every call the adapter makes into it and replays scripted
//! events as callbacks inside `tick_incoming`, the way the real engine
//! dispatches its queued callbacks from the tick.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use kcp_transport::{
    ClientCallbacks, ClientEngine, ConnectionConfig, ConnectionId, EngineFactory, ErrorCode,
    LocalConnectionState, RemoteConnectionState, Result, ServerCallbacks, ServerEngine,
    TransportAdapter, TransportError, TransportHandlers,
};
use parking_lot::Mutex;

/// One scripted server-side event, dispatched on the next `tick_incoming`.
pub enum ServerEvent {
    Connected(ConnectionId),
    Data(ConnectionId, Bytes, u8),
    Disconnected(ConnectionId),
    Error(ConnectionId, ErrorCode, String),
}

/// One scripted client-side event, dispatched on the next `tick_incoming`.
pub enum ClientEvent {
    Connected,
    Data(Bytes, u8),
    Disconnected,
    Error(ErrorCode, String),
}

/// Call the adapter made into the engine, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    ServerStart(u16),
    ServerSend(ConnectionId, u8, Vec<u8>),
    ServerDisconnect(ConnectionId),
    ServerStop,
    ClientConnect(String, u16),
    ClientSend(u8, Vec<u8>),
    ClientDisconnect,
}

/// Shared handle the tests use to script the engine and inspect it.
#[derive(Default)]
pub struct MockEngine {
    pub calls: Mutex<Vec<EngineCall>>,
    pub server_script: Mutex<VecDeque<ServerEvent>>,
    pub client_script: Mutex<VecDeque<ClientEvent>>,
    pub addresses: Mutex<HashMap<ConnectionId, SocketAddr>>,
    /// Config snapshot observed at each engine construction.
    pub configs: Mutex<Vec<ConnectionConfig>>,
    pub fail_server_start: AtomicBool,
    pub fail_client_connect: AtomicBool,
}

impl MockEngine {
    pub fn push_server(&self, event: ServerEvent) {
        self.server_script.lock().push_back(event);
    }

    pub fn push_client(&self, event: ClientEvent) {
        self.client_script.lock().push_back(event);
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    pub fn set_address(&self, connection: ConnectionId, address: &str) {
        self.addresses
            .lock()
            .insert(connection, address.parse().unwrap());
    }
}

pub struct MockFactory {
    pub engine: Arc<MockEngine>,
}

impl EngineFactory for MockFactory {
    fn server(
        &self,
        config: &ConnectionConfig,
        callbacks: ServerCallbacks,
    ) -> Result<Box<dyn ServerEngine>> {
        self.engine.configs.lock().push(config.clone());
        Ok(Box::new(MockServer {
            engine: Arc::clone(&self.engine),
            callbacks,
        }))
    }

    fn client(
        &self,
        config: &ConnectionConfig,
        callbacks: ClientCallbacks,
    ) -> Result<Box<dyn ClientEngine>> {
        self.engine.configs.lock().push(config.clone());
        Ok(Box::new(MockClient {
            engine: Arc::clone(&self.engine),
            callbacks,
        }))
    }
}

struct MockServer {
    engine: Arc<MockEngine>,
    callbacks: ServerCallbacks,
}

impl ServerEngine for MockServer {
    fn start(&mut self, port: u16) -> Result<()> {
        self.engine.calls.lock().push(EngineCall::ServerStart(port));
        if self.engine.fail_server_start.load(Ordering::SeqCst) {
            return Err(TransportError::engine(
                ErrorCode::Unexpected,
                "scripted start failure",
            ));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.engine.calls.lock().push(EngineCall::ServerStop);
    }

    fn send(&mut self, connection: ConnectionId, channel: u8, payload: Bytes) -> Result<()> {
        self.engine
            .calls
            .lock()
            .push(EngineCall::ServerSend(connection, channel, payload.to_vec()));
        Ok(())
    }

    fn disconnect(&mut self, connection: ConnectionId) {
        self.engine
            .calls
            .lock()
            .push(EngineCall::ServerDisconnect(connection));
    }

    fn tick_incoming(&mut self) {
        loop {
            // Pop outside the dispatch so callbacks may script further events.
            let event = self.engine.server_script.lock().pop_front();
            let Some(event) = event else { break };
            match event {
                ServerEvent::Connected(id) => (self.callbacks.on_connected)(id),
                ServerEvent::Data(id, payload, channel) => {
                    (self.callbacks.on_data)(id, payload, channel)
                }
                ServerEvent::Disconnected(id) => (self.callbacks.on_disconnected)(id),
                ServerEvent::Error(id, code, reason) => {
                    (self.callbacks.on_error)(id, code, reason)
                }
            }
        }
    }

    fn tick_outgoing(&mut self) {}

    fn connection_address(&self, connection: ConnectionId) -> Option<SocketAddr> {
        self.engine.addresses.lock().get(&connection).copied()
    }
}

struct MockClient {
    engine: Arc<MockEngine>,
    callbacks: ClientCallbacks,
}

impl ClientEngine for MockClient {
    fn connect(&mut self, address: &str, port: u16) -> Result<()> {
        self.engine
            .calls
            .lock()
            .push(EngineCall::ClientConnect(address.to_string(), port));
        if self.engine.fail_client_connect.load(Ordering::SeqCst) {
            return Err(TransportError::engine(
                ErrorCode::DnsResolve,
                "scripted connect failure",
            ));
        }
        Ok(())
    }

    fn disconnect(&mut self) {
        self.engine.calls.lock().push(EngineCall::ClientDisconnect);
    }

    fn send(&mut self, channel: u8, payload: Bytes) -> Result<()> {
        self.engine
            .calls
            .lock()
            .push(EngineCall::ClientSend(channel, payload.to_vec()));
        Ok(())
    }

    fn tick_incoming(&mut self) {
        loop {
            let event = self.engine.client_script.lock().pop_front();
            let Some(event) = event else { break };
            match event {
                ClientEvent::Connected => (self.callbacks.on_connected)(),
                ClientEvent::Data(payload, channel) => {
                    (self.callbacks.on_data)(payload, channel)
                }
                ClientEvent::Disconnected => (self.callbacks.on_disconnected)(),
                ClientEvent::Error(code, reason) => (self.callbacks.on_error)(code, reason),
            }
        }
    }

    fn tick_outgoing(&mut self) {}
}

// ---------------------------------------------------------------------------
// Consumer-side harness
// ---------------------------------------------------------------------------

/// Consumer-side notification, recorded in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    ServerState(LocalConnectionState),
    ClientState(LocalConnectionState),
    RemoteState(ConnectionId, RemoteConnectionState),
    ServerData(ConnectionId, Vec<u8>, u8),
    ClientData(Vec<u8>, u8),
}

pub struct Harness {
    pub adapter: TransportAdapter,
    pub engine: Arc<MockEngine>,
    pub notifications: Arc<Mutex<Vec<Notification>>>,
}

impl Harness {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    pub fn clear_notifications(&self) {
        self.notifications.lock().clear();
    }
}

/// Adapter wired to a fresh mock engine, with every notification recorded.
pub fn harness() -> Harness {
    let engine = Arc::new(MockEngine::default());
    let notifications = Arc::new(Mutex::new(Vec::new()));

    let server_state = Arc::clone(&notifications);
    let client_state = Arc::clone(&notifications);
    let remote_state = Arc::clone(&notifications);
    let server_data = Arc::clone(&notifications);
    let client_data = Arc::clone(&notifications);

    let handlers = TransportHandlers {
        on_server_state: Box::new(move |change| {
            server_state
                .lock()
                .push(Notification::ServerState(change.state));
        }),
        on_client_state: Box::new(move |change| {
            client_state
                .lock()
                .push(Notification::ClientState(change.state));
        }),
        on_remote_state: Box::new(move |id, state| {
            remote_state.lock().push(Notification::RemoteState(id, state));
        }),
        on_server_data: Box::new(move |id, payload, channel| {
            server_data
                .lock()
                .push(Notification::ServerData(id, payload.to_vec(), channel));
        }),
        on_client_data: Box::new(move |payload, channel| {
            client_data
                .lock()
                .push(Notification::ClientData(payload.to_vec(), channel));
        }),
    };

    let adapter = TransportAdapter::new(
        Box::new(MockFactory {
            engine: Arc::clone(&engine),
        }),
        handlers,
    );

    Harness {
        adapter,
        engine,
        notifications,
    }
}

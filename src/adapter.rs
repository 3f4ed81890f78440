//! Transport adapter facade.
//!
//! [`TransportAdapter`] owns zero-or-one server engine and zero-or-one client
//! engine, wires the engine's callbacks to the event queue, the live
//! connection table and the state machines, and exposes the uniform
//! polling/send/receive contract the consumer drives from a single thread.

use std::sync::Arc;

use bytes::Bytes;
use dashmap::DashSet;
use parking_lot::Mutex;
use tracing::{debug, error, info, trace, warn};

use crate::channel;
use crate::config::{ConnectionConfig, TransportConfig};
use crate::engine::{
    ClientCallbacks, ClientEngine, ConnectionId, EngineFactory, ServerCallbacks, ServerEngine,
};
use crate::error::{Result, TransportError};
use crate::events::{RemoteEvent, RemoteEventQueue};
use crate::state::{
    ConnectionStateMachine, LocalConnectionState, LocalStateChange, RemoteConnectionState, Role,
};

type RemoteStateFn = Box<dyn FnMut(ConnectionId, RemoteConnectionState) + Send>;
type ServerDataFn = Box<dyn FnMut(ConnectionId, Bytes, u8) + Send>;
type ClientDataFn = Box<dyn FnMut(Bytes, u8) + Send>;

/// Consumer-facing notification callbacks, registered once at construction.
///
/// Every callback is invoked synchronously: the state callbacks from within
/// `start_connection`/`stop_connection` (and, for the client, from the
/// engine's connected/error dispatch), the data and remote-state callbacks
/// from within `iterate_incoming`. Data callbacks receive zero-based logical
/// channel ids.
pub struct TransportHandlers {
    pub on_server_state: Box<dyn FnMut(LocalStateChange) + Send>,
    pub on_client_state: Box<dyn FnMut(LocalStateChange) + Send>,
    pub on_remote_state: RemoteStateFn,
    pub on_server_data: ServerDataFn,
    pub on_client_data: ClientDataFn,
}

// ---------------------------------------------------------------------------
// Server-side shared plumbing
// ---------------------------------------------------------------------------

/// State shared between the facade and the server engine's callbacks.
///
/// Outlives any single engine instance so the consumer's handlers survive a
/// server restart.
struct ServerShared {
    events: RemoteEventQueue,
    /// Remote ids considered connected. Mutated only inside `drain_events`,
    /// so reads stay consistent with the notification order.
    live: DashSet<ConnectionId>,
    on_remote_state: Mutex<RemoteStateFn>,
    on_data: Mutex<ServerDataFn>,
}

impl ServerShared {
    /// Convert every queued remote event into a state notification, in
    /// enqueue order. Runs once per data-received callback, before the data
    /// notification itself.
    fn drain_events(&self) {
        for event in self.events.drain() {
            let state = match event {
                RemoteEvent::Connected(id) => {
                    self.live.insert(id);
                    RemoteConnectionState::Started
                }
                RemoteEvent::Disconnected(id) => {
                    self.live.remove(&id);
                    RemoteConnectionState::Stopped
                }
            };
            trace!(connection = event.connection_id(), state = ?state, "remote state change");
            (&mut *self.on_remote_state.lock())(event.connection_id(), state);
        }
    }

    fn notify_data(&self, connection: ConnectionId, payload: Bytes, logical_channel: u8) {
        (&mut *self.on_data.lock())(connection, payload, logical_channel);
    }
}

// ---------------------------------------------------------------------------
// Facade
// ---------------------------------------------------------------------------

/// Poll-driven facade over a callback-driven protocol engine.
///
/// All public methods must be called from one consumer thread; the only
/// cross-thread traffic is the engine pushing connect/disconnect events into
/// the internal queue.
pub struct TransportAdapter {
    factory: Box<dyn EngineFactory>,
    port: u16,
    client_address: String,
    config: Arc<ConnectionConfig>,

    server: Option<Box<dyn ServerEngine>>,
    client: Option<Box<dyn ClientEngine>>,

    server_state: ConnectionStateMachine,
    client_state: ConnectionStateMachine,

    server_shared: Arc<ServerShared>,
    client_data: Arc<Mutex<ClientDataFn>>,
}

impl TransportAdapter {
    /// Create an adapter with default configuration. Call
    /// [`initialize`](Self::initialize) to apply real options before starting
    /// either role.
    pub fn new(factory: Box<dyn EngineFactory>, handlers: TransportHandlers) -> Self {
        let TransportHandlers {
            on_server_state,
            on_client_state,
            on_remote_state,
            on_server_data,
            on_client_data,
        } = handlers;

        let defaults = TransportConfig::default();
        Self {
            factory,
            port: defaults.port,
            client_address: defaults.client_address,
            config: Arc::new(ConnectionConfig::default()),
            server: None,
            client: None,
            server_state: ConnectionStateMachine::new(Role::Server, on_server_state),
            client_state: ConnectionStateMachine::new(Role::Client, on_client_state),
            server_shared: Arc::new(ServerShared {
                events: RemoteEventQueue::new(),
                live: DashSet::new(),
                on_remote_state: Mutex::new(on_remote_state),
                on_data: Mutex::new(on_server_data),
            }),
            client_data: Arc::new(Mutex::new(on_client_data)),
        }
    }

    /// Build (or rebuild) the engine configuration snapshot.
    ///
    /// Engines already running keep the snapshot they were started with; a
    /// rebuilt snapshot applies from the next `start_connection`.
    pub fn initialize(&mut self, options: &TransportConfig) -> Result<()> {
        let config = ConnectionConfig::build(options)?;
        self.port = options.port;
        self.client_address = options.client_address.clone();
        self.config = Arc::new(config);
        debug!(
            port = self.port,
            address = %self.client_address,
            mtu = self.config.mtu,
            "transport configured"
        );
        Ok(())
    }

    // -- lifecycle ----------------------------------------------------------

    /// Start the server or the client role.
    ///
    /// The server start is synchronous: on return the state is `Started` (or
    /// `StoppedError`). The client start only initiates the connect; `Started`
    /// arrives later through the connected callback.
    pub fn start_connection(&mut self, as_server: bool) -> bool {
        if as_server {
            self.start_server()
        } else {
            self.start_client()
        }
    }

    /// Stop the server or the client role, releasing its engine.
    ///
    /// Returns true iff an engine was torn down.
    pub fn stop_connection(&mut self, as_server: bool) -> bool {
        if as_server {
            self.stop_server()
        } else {
            self.stop_client()
        }
    }

    /// Disconnect one remote connection on the server engine.
    ///
    /// Returns false, without mutating anything, when no server engine is
    /// active. The engine's disconnect is already immediate, so the
    /// `immediately` flag only exists for interface parity.
    pub fn stop_remote_connection(&mut self, connection: ConnectionId, immediately: bool) -> bool {
        match self.server.as_mut() {
            Some(engine) => {
                debug!(connection, immediately, "disconnecting remote");
                engine.disconnect(connection);
                true
            }
            None => false,
        }
    }

    /// Tear down both roles. Idempotent; a role with no engine is a no-op.
    pub fn shutdown(&mut self) {
        self.stop_connection(true);
        self.stop_connection(false);
    }

    // -- ticking ------------------------------------------------------------

    /// Pump the role's receive tick. This is where the engine dispatches its
    /// queued data callbacks; a role without an active engine is a no-op.
    pub fn iterate_incoming(&mut self, as_server: bool) {
        if as_server {
            if let Some(engine) = self.server.as_mut() {
                engine.tick_incoming();
            }
        } else if let Some(engine) = self.client.as_mut() {
            engine.tick_incoming();
        }
    }

    /// Pump the role's send tick; a role without an active engine is a no-op.
    pub fn iterate_outgoing(&mut self, as_server: bool) {
        if as_server {
            if let Some(engine) = self.server.as_mut() {
                engine.tick_outgoing();
            }
        } else if let Some(engine) = self.client.as_mut() {
            engine.tick_outgoing();
        }
    }

    // -- data path ----------------------------------------------------------

    /// Send to one remote connection through the server engine.
    pub fn send_to_client(
        &mut self,
        logical_channel: u8,
        payload: Bytes,
        connection: ConnectionId,
    ) -> Result<()> {
        let engine = self
            .server
            .as_mut()
            .ok_or_else(|| TransportError::not_active(Role::Server))?;
        engine.send(connection, channel::to_engine(logical_channel), payload)
    }

    /// Send to the server through the client engine.
    pub fn send_to_server(&mut self, logical_channel: u8, payload: Bytes) -> Result<()> {
        let engine = self
            .client
            .as_mut()
            .ok_or_else(|| TransportError::not_active(Role::Client))?;
        engine.send(channel::to_engine(logical_channel), payload)
    }

    // -- queries ------------------------------------------------------------

    /// Lifecycle state of the local endpoint for the given role
    pub fn get_connection_state(&self, as_server: bool) -> LocalConnectionState {
        if as_server {
            self.server_state.get()
        } else {
            self.client_state.get()
        }
    }

    /// Observed state of one remote connection.
    ///
    /// A remote reads `Started` only once its connect event has been drained,
    /// which happens on the next server data-received callback.
    pub fn remote_connection_state(&self, connection: ConnectionId) -> RemoteConnectionState {
        if self.server_shared.live.contains(&connection) {
            RemoteConnectionState::Started
        } else {
            RemoteConnectionState::Stopped
        }
    }

    /// Textual remote address of `connection`, or an empty string when the id
    /// is unknown or no server is active.
    pub fn connection_address(&self, connection: ConnectionId) -> String {
        self.server
            .as_ref()
            .and_then(|engine| engine.connection_address(connection))
            .map(|address| address.to_string())
            .unwrap_or_default()
    }

    /// Configured MTU. Uniform across channels.
    pub fn mtu(&self, _channel: u8) -> u32 {
        self.config.mtu
    }

    // -- internals ----------------------------------------------------------

    fn start_server(&mut self) -> bool {
        if self.server.is_some() {
            warn!("server already started");
            return false;
        }

        self.server_state.set(LocalConnectionState::Starting);

        let callbacks = self.server_callbacks();
        let mut engine = match self.factory.server(&self.config, callbacks) {
            Ok(engine) => engine,
            Err(err) => {
                error!(error = %err, "failed to construct server engine");
                self.server_state.set(LocalConnectionState::StoppedError);
                return false;
            }
        };

        if let Err(err) = engine.start(self.port) {
            error!(port = self.port, error = %err, "server failed to start");
            self.server_state.set(LocalConnectionState::StoppedError);
            return false;
        }

        info!(port = self.port, "server started");
        self.server = Some(engine);
        self.server_state.set(LocalConnectionState::Started);
        true
    }

    fn start_client(&mut self) -> bool {
        if self.client.is_some() {
            warn!("client already started");
            return false;
        }

        self.client_state.set(LocalConnectionState::Starting);

        let callbacks = self.client_callbacks();
        let mut engine = match self.factory.client(&self.config, callbacks) {
            Ok(engine) => engine,
            Err(err) => {
                error!(error = %err, "failed to construct client engine");
                self.client_state.set(LocalConnectionState::StoppedError);
                return false;
            }
        };

        if let Err(err) = engine.connect(&self.client_address, self.port) {
            error!(
                address = %self.client_address,
                port = self.port,
                error = %err,
                "client failed to connect"
            );
            self.client_state.set(LocalConnectionState::StoppedError);
            return false;
        }

        debug!(address = %self.client_address, port = self.port, "client connecting");
        self.client = Some(engine);
        true
    }

    fn stop_server(&mut self) -> bool {
        let Some(mut engine) = self.server.take() else {
            return false;
        };

        self.server_state.set(LocalConnectionState::Stopping);
        engine.stop();
        // Undelivered remote events are discarded, never notified.
        self.server_shared.events.clear();
        self.server_shared.live.clear();
        self.server_state.set(LocalConnectionState::Stopped);
        info!("server stopped");
        true
    }

    fn stop_client(&mut self) -> bool {
        let Some(mut engine) = self.client.take() else {
            return false;
        };

        self.client_state.set(LocalConnectionState::Stopping);
        engine.disconnect();
        info!("client stopped");
        // The machine stays at Stopping: a clean client shutdown has no
        // terminal Stopped transition.
        true
    }

    fn server_callbacks(&self) -> ServerCallbacks {
        let connected = Arc::clone(&self.server_shared);
        let disconnected = Arc::clone(&self.server_shared);
        let data = Arc::clone(&self.server_shared);

        ServerCallbacks {
            on_connected: Box::new(move |id| {
                trace!(connection = id, "remote connected");
                connected.events.push(RemoteEvent::Connected(id));
            }),
            on_data: Box::new(move |id, payload, engine_channel| {
                // Queued lifecycle events go out first so a connect is always
                // observed before the first data of that connection.
                data.drain_events();
                data.notify_data(id, payload, channel::to_logical(engine_channel));
            }),
            on_disconnected: Box::new(move |id| {
                trace!(connection = id, "remote disconnected");
                disconnected.events.push(RemoteEvent::Disconnected(id));
            }),
            on_error: Box::new(move |id, code, reason| {
                // Per-connection faults never touch the server's own
                // lifecycle state.
                warn!(connection = id, code = %code, reason = %reason, "server engine error");
            }),
        }
    }

    fn client_callbacks(&self) -> ClientCallbacks {
        let connected_state = self.client_state.clone();
        let error_state = self.client_state.clone();
        let data = Arc::clone(&self.client_data);

        ClientCallbacks {
            on_connected: Box::new(move || {
                info!("client connected");
                connected_state.set(LocalConnectionState::Started);
            }),
            on_data: Box::new(move |payload, engine_channel| {
                (&mut *data.lock())(payload, channel::to_logical(engine_channel));
            }),
            on_disconnected: Box::new(move || {
                // A clean disconnect is reported through stop_connection,
                // which leaves the machine at Stopping; nothing happens here.
                debug!("client disconnected");
            }),
            on_error: Box::new(move |code, reason| {
                error!(code = %code, reason = %reason, "client engine error");
                error_state.set(LocalConnectionState::StoppedError);
            }),
        }
    }
}

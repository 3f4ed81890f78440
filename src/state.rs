//! Connection lifecycle states and the per-role state machine.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Logical endpoint type operated by the adapter.
///
/// A single adapter may run both roles at once, each with its own engine
/// instance and its own state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Server,
    Client,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Server => write!(f, "server"),
            Role::Client => write!(f, "client"),
        }
    }
}

/// Lifecycle state of the local endpoint for one role.
///
/// Within one lifecycle the transitions run Stopped -> Starting -> Started ->
/// Stopping -> Stopped; `StoppedError` short-circuits from Starting or
/// Started when the engine reports a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalConnectionState {
    Stopped,
    Starting,
    Started,
    Stopping,
    StoppedError,
}

/// Observed state of one remote connection on the server side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteConnectionState {
    Started,
    Stopped,
}

/// Payload of a local state-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalStateChange {
    pub role: Role,
    pub state: LocalConnectionState,
    /// Index of the local endpoint raising the notification; a
    /// single-endpoint adapter always reports 0.
    pub client_index: u32,
}

/// State-changed notification callback for one role.
pub type StateChangedFn = Box<dyn FnMut(LocalStateChange) + Send>;

/// Tracks one role's lifecycle state and raises a notification on every
/// transition.
///
/// Clones share the same underlying state, so engine callbacks can drive the
/// machine from the engine's dispatch context while the facade reads it from
/// the polling thread. Transitions are not validated: the adapter is a
/// pass-through notifier, and callers keep the ordering monotonic.
#[derive(Clone)]
pub struct ConnectionStateMachine {
    inner: Arc<Inner>,
}

struct Inner {
    role: Role,
    state: Mutex<LocalConnectionState>,
    notify: Mutex<StateChangedFn>,
}

impl ConnectionStateMachine {
    /// Create a machine for `role`, starting at `Stopped`.
    pub fn new(role: Role, notify: StateChangedFn) -> Self {
        Self {
            inner: Arc::new(Inner {
                role,
                state: Mutex::new(LocalConnectionState::Stopped),
                notify: Mutex::new(notify),
            }),
        }
    }

    /// Current state
    pub fn get(&self) -> LocalConnectionState {
        *self.inner.state.lock()
    }

    /// Record `next` and synchronously raise the state-changed notification.
    ///
    /// The new state is visible to `get` before the notification fires.
    pub fn set(&self, next: LocalConnectionState) {
        let previous = {
            let mut state = self.inner.state.lock();
            std::mem::replace(&mut *state, next)
        };
        debug!(role = %self.inner.role, from = ?previous, to = ?next, "connection state changed");

        let change = LocalStateChange {
            role: self.inner.role,
            state: next,
            client_index: 0,
        };
        (&mut *self.inner.notify.lock())(change);
    }
}

impl fmt::Debug for ConnectionStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionStateMachine")
            .field("role", &self.inner.role)
            .field("state", &self.get())
            .finish()
    }
}

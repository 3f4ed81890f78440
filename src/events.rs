//! Remote connection events and the cross-thread handoff queue.
//!
//! The engine's connect/disconnect callbacks may run on its own thread; the
//! consumer observes them from its polling thread. [`RemoteEventQueue`] is the
//! only handoff between the two: lock-free pushes on the engine side, a FIFO
//! drain on the consumer side, and nothing touching the hot data path.
//!
//! Queued events are converted into notifications lazily, on the next server
//! data-received callback. Until a data packet arrives (or a shutdown discards
//! the queue), a queued connect or disconnect stays unobserved.

use crate::engine::ConnectionId;
use crossbeam_queue::SegQueue;

/// A pending remote connect or disconnect, keyed by connection id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteEvent {
    Connected(ConnectionId),
    Disconnected(ConnectionId),
}

impl RemoteEvent {
    /// Connection id this event refers to
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            RemoteEvent::Connected(id) | RemoteEvent::Disconnected(id) => *id,
        }
    }
}

/// Thread-safe FIFO of pending remote events.
#[derive(Default)]
pub struct RemoteEventQueue {
    queue: SegQueue<RemoteEvent>,
}

impl RemoteEventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    /// Enqueue an event. Callable from any thread, never blocks.
    pub fn push(&self, event: RemoteEvent) {
        self.queue.push(event);
    }

    /// Drain every queued event in enqueue order.
    pub fn drain(&self) -> impl Iterator<Item = RemoteEvent> + '_ {
        std::iter::from_fn(|| self.queue.pop())
    }

    /// Discard every queued event without observing it.
    pub fn clear(&self) {
        while self.queue.pop().is_some() {}
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

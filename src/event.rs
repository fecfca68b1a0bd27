//! Received-frame events and the publish/subscribe bus that fans them out.
//!
//! Each subscriber owns a bounded queue. A subscriber whose queue is full
//! misses the event (it is dropped for that subscriber only and logged);
//! publishing never blocks the receive loop.
//!
//! `tokio::sync::broadcast` is not used: its lag handling drops the oldest
//! events for every receiver alike, and it cannot remove one receiver by handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::SystemTime;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{DecodeError, Error, Result};

/// Default per-subscriber queue depth.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// A frame received in monitor mode.
#[derive(Debug)]
pub struct ReceivedEvent<M> {
    /// When the frame was decoded.
    pub timestamp: SystemTime,
    /// Decoded message, possibly partial when `failure` is set.
    pub message: Option<M>,
    /// Decoder diagnostic for a malformed frame.
    pub failure: Option<DecodeError>,
    /// Name of the driver that received the frame.
    pub source: String,
}

impl<M> ReceivedEvent<M> {
    pub fn new(message: Option<M>, failure: Option<DecodeError>, source: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            message,
            failure,
            source: source.to_string(),
        }
    }

    /// Whether the decoder reported a failure for this frame.
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }
}

/// Identifies one subscription on an [`EventBus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// Receiving end of a subscription.
///
/// `recv()` returns `None` once the subscriber is removed or the bus is shut
/// down and the queue has drained.
#[derive(Debug)]
pub struct Subscription<M> {
    id: SubscriberId,
    rx: mpsc::Receiver<Arc<ReceivedEvent<M>>>,
}

impl<M> Subscription<M> {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<Arc<ReceivedEvent<M>>> {
        self.rx.recv().await
    }

    /// Take the next queued event without waiting.
    pub fn try_recv(&mut self) -> Option<Arc<ReceivedEvent<M>>> {
        self.rx.try_recv().ok()
    }
}

struct BusState<M> {
    subscribers: HashMap<SubscriberId, mpsc::Sender<Arc<ReceivedEvent<M>>>>,
    next_id: u64,
    closed: bool,
}

/// Fan-out of [`ReceivedEvent`]s to any number of subscribers.
///
/// Cheap to clone; clones share the same subscriber set. Safe to use from
/// several tasks at once.
pub struct EventBus<M> {
    state: Arc<Mutex<BusState<M>>>,
    capacity: usize,
}

impl<M> Clone for EventBus<M> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            capacity: self.capacity,
        }
    }
}

impl<M> Default for EventBus<M> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl<M> EventBus<M> {
    /// Create a bus whose subscribers each queue up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(BusState {
                subscribers: HashMap::new(),
                next_id: 0,
                closed: false,
            })),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BusState<M>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new subscriber.
    ///
    /// Subscribing to a shut-down bus yields a subscription that is already
    /// closed.
    pub fn subscribe(&self) -> Subscription<M> {
        let (tx, rx) = mpsc::channel(self.capacity);
        let mut state = self.lock();
        let id = SubscriberId(state.next_id);
        state.next_id += 1;
        if !state.closed {
            state.subscribers.insert(id, tx);
            debug!(subscriber = id.0, "subscribed");
        }
        Subscription { id, rx }
    }

    /// Remove a subscriber. Its subscription ends after draining queued events.
    ///
    /// Returns `false` if `id` was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.lock().subscribers.remove(&id).is_some();
        if removed {
            debug!(subscriber = id.0, "unsubscribed");
        }
        removed
    }

    /// Deliver `event` to every current subscriber.
    ///
    /// Returns how many subscribers accepted it. Fails with
    /// [`Error::BusClosed`] after [`shutdown`](Self::shutdown).
    pub fn publish(&self, event: ReceivedEvent<M>) -> Result<usize> {
        let event = Arc::new(event);
        let mut state = self.lock();
        if state.closed {
            return Err(Error::BusClosed);
        }

        let mut delivered = 0;
        state
            .subscribers
            .retain(|id, tx| match tx.try_send(Arc::clone(&event)) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(subscriber = id.0, "subscriber queue full, event dropped");
                    true
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(subscriber = id.0, "subscriber gone, removing");
                    false
                }
            });
        Ok(delivered)
    }

    /// Close every subscription. Further publishes fail.
    pub fn shutdown(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.subscribers.clear();
        debug!("event bus shut down");
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }
}

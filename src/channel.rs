//! Replicated property store abstraction.
//!
//! The store is a last-write-wins key/value map. Writers publish whole JSON
//! snapshots; every subscriber of the key, including the writer, eventually
//! receives the value as a [`Change`]. There is no acknowledgement, ordering
//! guarantee or compare-and-swap.

use crate::error::ChannelError;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};
use tracing::{debug, instrument, warn};

/// A value delivered for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Property key that changed.
    pub key: String,
    /// New serialized value.
    pub value: String,
}

type Inbox = Rc<RefCell<VecDeque<Change>>>;

/// Receiving end of a subscription.
///
/// Changes queue up in delivery order until drained. Dropping the
/// subscription detaches it from the channel.
#[derive(Debug)]
pub struct Subscription {
    key: String,
    inbox: Inbox,
}

impl Subscription {
    /// Creates a detached subscription for `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Key this subscription listens to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Handle a channel uses to deliver into this subscription.
    pub fn sender(&self) -> SubscriptionSender {
        SubscriptionSender {
            inbox: Rc::downgrade(&self.inbox),
        }
    }

    /// Takes the oldest undelivered change.
    pub fn next_change(&self) -> Option<Change> {
        self.inbox.borrow_mut().pop_front()
    }

    /// Number of queued changes.
    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }
}

/// Delivery handle for a [`Subscription`].
#[derive(Debug, Clone)]
pub struct SubscriptionSender {
    inbox: Weak<RefCell<VecDeque<Change>>>,
}

impl SubscriptionSender {
    /// Queues a change. Returns false once the subscription is gone.
    pub fn deliver(&self, change: Change) -> bool {
        match self.inbox.upgrade() {
            Some(inbox) => {
                inbox.borrow_mut().push_back(change);
                true
            }
            None => false,
        }
    }
}

/// Publish/subscribe access to the replicated property store.
pub trait ReplicationChannel {
    /// Writes `json` under `key`. Fire-and-forget.
    fn publish(&self, key: &str, json: &str) -> Result<(), ChannelError>;

    /// Starts receiving changes to `key`.
    fn subscribe(&self, key: &str) -> Result<Subscription, ChannelError>;

    /// Reads the value currently stored under `key`.
    fn read_current(&self, key: &str) -> Result<Option<String>, ChannelError>;
}

#[derive(Debug)]
struct ChannelState {
    values: HashMap<String, String>,
    subscribers: HashMap<String, Vec<SubscriptionSender>>,
    available: bool,
}

impl Default for ChannelState {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            subscribers: HashMap::new(),
            available: true,
        }
    }
}

/// Property store shared by every client in one process.
///
/// Clones share the same store. A publish overwrites the stored value and
/// immediately queues it to every live subscriber of the key, so deliveries
/// arrive in publish order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryChannel {
    inner: Rc<RefCell<ChannelState>>,
}

impl InMemoryChannel {
    /// Creates an empty, available store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the store going offline or coming back.
    #[instrument(skip(self))]
    pub fn set_available(&self, available: bool) {
        self.inner.borrow_mut().available = available;
        if !available {
            warn!("In-memory channel marked unavailable");
        }
    }

    /// Returns true while the store accepts requests.
    pub fn is_available(&self) -> bool {
        self.inner.borrow().available
    }

    /// Live subscribers for `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.inner
            .borrow()
            .subscribers
            .get(key)
            .map(|senders| {
                senders
                    .iter()
                    .filter(|sender| sender.inbox.strong_count() > 0)
                    .count()
            })
            .unwrap_or(0)
    }

    fn ensure_available(&self, operation: &str, key: &str) -> Result<(), ChannelError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(ChannelError::new(format!(
                "Store unavailable, cannot {} '{}'",
                operation, key
            )))
        }
    }
}

impl ReplicationChannel for InMemoryChannel {
    #[instrument(skip(self, json), fields(len = json.len()))]
    fn publish(&self, key: &str, json: &str) -> Result<(), ChannelError> {
        self.ensure_available("publish", key)?;

        let mut inner = self.inner.borrow_mut();
        inner.values.insert(key.to_string(), json.to_string());

        let change = Change {
            key: key.to_string(),
            value: json.to_string(),
        };
        let delivered = match inner.subscribers.get_mut(key) {
            Some(senders) => {
                senders.retain(|sender| sender.deliver(change.clone()));
                senders.len()
            }
            None => 0,
        };
        debug!(delivered, "Published value");
        Ok(())
    }

    #[instrument(skip(self))]
    fn subscribe(&self, key: &str) -> Result<Subscription, ChannelError> {
        self.ensure_available("subscribe to", key)?;

        let subscription = Subscription::new(key);
        self.inner
            .borrow_mut()
            .subscribers
            .entry(key.to_string())
            .or_default()
            .push(subscription.sender());
        debug!("Subscribed");
        Ok(subscription)
    }

    #[instrument(skip(self))]
    fn read_current(&self, key: &str) -> Result<Option<String>, ChannelError> {
        self.ensure_available("read", key)?;
        Ok(self.inner.borrow().values.get(key).cloned())
    }
}

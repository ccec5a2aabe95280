//! Fan-out of segmenter events to interested consumers.
//!
//! A [`Subscriber`] is notified synchronously, on the thread driving the
//! segmenter, each time a block completes or the input ends inside an explicit
//! block. Subscribers that do slow work (disk, network) should hand the block
//! off to a [`WorkerPool`](crate::WorkerPool) and return immediately.

use crate::Block;
use std::sync::Arc;

/// Receives blocks produced by a [`Segmenter`](crate::Segmenter).
pub trait Subscriber: Send + Sync {
    /// A block was closed normally (fixed size reached, explicit block closed,
    /// or input ended outside an explicit block).
    fn on_block(&self, block: &Block);

    /// The input ended while an explicit block was still open. `block` holds
    /// whatever statements had accumulated.
    fn on_unexpected_eof(&self, block: &Block);
}

/// Ordered set of subscribers, compared by identity.
#[derive(Default, Clone)]
pub struct Registry {
    subscribers: Vec<Arc<dyn Subscriber>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `subscriber` unless this exact instance is already registered.
    ///
    /// Returns `true` if it was added.
    pub fn subscribe(&mut self, subscriber: Arc<dyn Subscriber>) -> bool {
        if self
            .subscribers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &subscriber))
        {
            return false;
        }
        self.subscribers.push(subscriber);
        true
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub fn notify_block(&self, block: &Block) {
        for subscriber in &self.subscribers {
            subscriber.on_block(block);
        }
    }

    pub fn notify_unexpected_eof(&self, block: &Block) {
        for subscriber in &self.subscribers {
            subscriber.on_unexpected_eof(block);
        }
    }
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

//! Host signal ports. The engine never talks to observer APIs directly; a
//! host bridges them into channels through [`SignalSource`], and tests drive
//! the same port with [`ManualSignal`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc::Sender;
use tracing::debug;

/// A source of host events (proximity sentinel, viewport resize, pointer
/// movement, keys). Subscribing routes events into `sink` until the returned
/// [`Subscription`] is dropped.
pub trait SignalSource<T: Send + 'static> {
    fn subscribe(&self, sink: Sender<T>) -> Subscription;
}

/// Keeps a subscription alive; dropping it unsubscribes the sink.
#[must_use = "dropping the subscription disconnects the sink"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    fn new(detach: impl FnOnce() + Send + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

type Sinks<T> = Mutex<Vec<(u64, Sender<T>)>>;

/// A [`SignalSource`] fed by explicit [`ManualSignal::emit`] calls. The demo
/// binary and the test suite both play the host through this.
pub struct ManualSignal<T> {
    sinks: Arc<Sinks<T>>,
    next_id: Arc<AtomicU64>,
}

impl<T> Default for ManualSignal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ManualSignal<T> {
    fn clone(&self) -> Self {
        Self {
            sinks: Arc::clone(&self.sinks),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T> ManualSignal<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sinks: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Deliver `value` to every live subscriber. A full sink drops this
    /// event; a closed sink is pruned.
    pub fn emit(&self, value: T)
    where
        T: Clone,
    {
        let mut sinks = self.sinks.lock().expect("signal sink lock poisoned");
        sinks.retain(|(id, sink)| match sink.try_send(value.clone()) {
            Ok(()) => true,
            Err(tokio::sync::mpsc::error::TrySendError::Full(_)) => {
                debug!(subscriber = id, "signal sink full; dropping event");
                true
            }
            Err(tokio::sync::mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sinks.lock().expect("signal sink lock poisoned").len()
    }
}

impl<T: Send + 'static> SignalSource<T> for ManualSignal<T> {
    fn subscribe(&self, sink: Sender<T>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sinks
            .lock()
            .expect("signal sink lock poisoned")
            .push((id, sink));
        let weak: Weak<Sinks<T>> = Arc::downgrade(&self.sinks);
        Subscription::new(move || {
            if let Some(sinks) = weak.upgrade() {
                sinks
                    .lock()
                    .expect("signal sink lock poisoned")
                    .retain(|(sink_id, _)| *sink_id != id);
            }
        })
    }
}

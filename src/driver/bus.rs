//! In-process publish/subscribe bus carrying JSON payloads by topic.
//! Stands in for the network layer: transports publish inbound messages and
//! consume outbound ones here.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub type SubscriptionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: String,
}

type Listener = Arc<dyn Fn(&BusMessage) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: SubscriptionId,
    listeners: HashMap<String, Vec<(SubscriptionId, Listener)>>,
}

#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<Mutex<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BusInner> {
        // A panicking listener runs outside the lock, so poisoning leaves consistent data.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe<F>(&self, topic: &str, listener: F) -> SubscriptionId
    where
        F: Fn(&BusMessage) + Send + Sync + 'static,
    {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        inner
            .listeners
            .entry(topic.to_string())
            .or_default()
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.lock();
        let mut removed = false;
        for listeners in inner.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(sid, _)| *sid != id);
            removed |= listeners.len() != before;
        }
        inner.listeners.retain(|_, l| !l.is_empty());
        removed
    }

    /// Deliver to every listener of `topic`. Returns how many received it.
    pub fn publish(&self, topic: &str, payload: impl Into<String>) -> usize {
        let listeners: Vec<Listener> = self
            .lock()
            .listeners
            .get(topic)
            .map(|l| l.iter().map(|(_, f)| f.clone()).collect())
            .unwrap_or_default();
        let message = BusMessage {
            topic: topic.to_string(),
            payload: payload.into(),
        };
        for listener in &listeners {
            listener(&message);
        }
        listeners.len()
    }

    pub fn listener_count(&self, topic: &str) -> usize {
        self.lock().listeners.get(topic).map(Vec::len).unwrap_or(0)
    }
}

/// One subscription per topic for a single owner. Subscribing to a topic again
/// drops the previous subscription first.
pub struct Subscriptions {
    bus: EventBus,
    active: HashMap<String, SubscriptionId>,
}

impl Subscriptions {
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            active: HashMap::new(),
        }
    }

    pub fn subscribe<F>(&mut self, topic: &str, listener: F)
    where
        F: Fn(&BusMessage) + Send + Sync + 'static,
    {
        if let Some(previous) = self.active.remove(topic) {
            self.bus.unsubscribe(previous);
        }
        let id = self.bus.subscribe(topic, listener);
        self.active.insert(topic.to_string(), id);
    }

    pub fn clear(&mut self) {
        for (_, id) in self.active.drain() {
            self.bus.unsubscribe(id);
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_topic_listeners_only() {
        let bus = EventBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        bus.subscribe("remote-ban-decision", move |m| {
            assert_eq!(m.payload, "{}");
            h.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(bus.publish("remote-ban-decision", "{}"), 1);
        assert_eq!(bus.publish("remote-pick-decision", "{}"), 0);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resubscribe_replaces_previous() {
        let bus = EventBus::new();
        let mut subs = Subscriptions::new(bus.clone());
        subs.subscribe("match-starting", |_| {});
        subs.subscribe("match-starting", |_| {});
        assert_eq!(bus.listener_count("match-starting"), 1);
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let bus = EventBus::new();
        {
            let mut subs = Subscriptions::new(bus.clone());
            subs.subscribe("remote-disconnected", |_| {});
            assert_eq!(bus.listener_count("remote-disconnected"), 1);
        }
        assert_eq!(bus.listener_count("remote-disconnected"), 0);
    }

    #[test]
    fn test_unsubscribe_twice() {
        let bus = EventBus::new();
        let id = bus.subscribe("t", |_| {});
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
    }
}

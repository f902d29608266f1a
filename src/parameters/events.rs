//! Change notification bus
//!
//! Every parameter holder owns one bus. Delivery is synchronous and happens
//! in registration order; events never propagate to parent holders.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// What kind of change happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// A parameter value was written
    ValueChanged,
    /// Parameters were added, removed or reshaped
    StructureChanged,
}

/// A change posted on a holder's bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Display name of the holder that changed
    pub source: String,
    /// Affected parameter or slot, if the change concerns a single one
    pub key: Option<String>,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn value_changed(source: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            key: Some(key.into()),
            kind: ChangeKind::ValueChanged,
        }
    }

    pub fn structure_changed(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            key: None,
            kind: ChangeKind::StructureChanged,
        }
    }

    /// Structure change attributed to one key (e.g. a data slot being bound)
    pub fn structure_changed_at(source: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            key: Some(key.into()),
            kind: ChangeKind::StructureChanged,
        }
    }
}

/// Handle returned by [`ParameterEvents::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&ChangeEvent)>;

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

/// Per-holder publish/subscribe channel.
///
/// Cloning a bus yields a fresh, empty bus: subscriptions belong to one holder
/// instance and never follow a copy. Use [`ParameterEvents::share`] to obtain
/// a second handle to the same channel.
pub struct ParameterEvents {
    inner: Rc<RefCell<Subscribers>>,
}

impl ParameterEvents {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Subscribers::default())),
        }
    }

    /// Another handle to this very channel
    pub fn share(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }

    /// Register a subscriber. It is called for every later post, in
    /// registration order relative to the other subscribers.
    pub fn subscribe(&self, subscriber: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        let mut inner = self.inner.borrow_mut();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.entries.push((id, Rc::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut inner = self.inner.borrow_mut();
        let before = inner.entries.len();
        inner.entries.retain(|(entry_id, _)| *entry_id != id);
        inner.entries.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Deliver `event` to every subscriber registered at the time of the call.
    ///
    /// Subscribers may (un)subscribe while being called; that only affects
    /// later posts.
    pub fn post(&self, event: ChangeEvent) {
        let snapshot: Vec<Subscriber> = self
            .inner
            .borrow()
            .entries
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect();

        for subscriber in snapshot {
            subscriber(&event);
        }
    }

    /// Identity of the channel, shared by all handles to it
    pub fn channel_id(&self) -> usize {
        Rc::as_ptr(&self.inner) as *const () as usize
    }
}

impl Default for ParameterEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ParameterEvents {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for ParameterEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterEvents")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_delivery_in_registration_order() {
        let bus = ParameterEvents::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            bus.subscribe(move |_| log.borrow_mut().push(name));
        }

        bus.post(ChangeEvent::structure_changed("holder"));
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = ParameterEvents::new();
        let count = Rc::new(Cell::new(0));
        let counter = Rc::clone(&count);
        let id = bus.subscribe(move |_| counter.set(counter.get() + 1));

        bus.post(ChangeEvent::value_changed("holder", "k"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.post(ChangeEvent::value_changed("holder", "k"));

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscribe_during_delivery_affects_only_later_posts() {
        let bus = ParameterEvents::new();
        let late_calls = Rc::new(Cell::new(0));

        let handle = bus.share();
        let late = Rc::clone(&late_calls);
        bus.subscribe(move |_| {
            let late = Rc::clone(&late);
            handle.subscribe(move |_| late.set(late.get() + 1));
        });

        bus.post(ChangeEvent::structure_changed("holder"));
        assert_eq!(late_calls.get(), 0);
        assert_eq!(bus.subscriber_count(), 2);

        bus.post(ChangeEvent::structure_changed("holder"));
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_unsubscribe_during_delivery_keeps_snapshot() {
        let bus = ParameterEvents::new();
        let second_calls = Rc::new(Cell::new(0));

        let handle = bus.share();
        let second_id = Rc::new(Cell::new(None));
        let to_remove = Rc::clone(&second_id);
        bus.subscribe(move |_| {
            if let Some(id) = to_remove.get() {
                handle.unsubscribe(id);
            }
        });
        let calls = Rc::clone(&second_calls);
        second_id.set(Some(bus.subscribe(move |_| calls.set(calls.get() + 1))));

        bus.post(ChangeEvent::structure_changed("holder"));
        bus.post(ChangeEvent::structure_changed("holder"));
        assert_eq!(second_calls.get(), 1);
    }

    #[test]
    fn test_clone_is_a_fresh_channel() {
        let bus = ParameterEvents::new();
        bus.subscribe(|_| {});
        let copy = bus.clone();
        let shared = bus.share();

        assert_eq!(copy.subscriber_count(), 0);
        assert_ne!(copy.channel_id(), bus.channel_id());
        assert_eq!(shared.channel_id(), bus.channel_id());
    }
}

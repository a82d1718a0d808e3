//! Explicit publish/subscribe for layout decisions.
//!
//! Subscribers are plain `FnMut(&T)` callbacks run synchronously, in
//! subscription order, on the thread that publishes. Each subscription gets a
//! unique [`SubscriptionId`]; ids are never reused within one [`Observers`].

use std::fmt;

/// Handle returned by [`Observers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Callback<T> = Box<dyn FnMut(&T)>;

/// A list of subscribers to values of type `T`.
pub struct Observers<T> {
    next_id: u64,
    subscribers: Vec<(SubscriptionId, Callback<T>)>,
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("subscribers", &self.subscribers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            subscribers: Vec::new(),
        }
    }
}

impl<T> Observers<T> {
    /// Empty subscriber list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback.
    pub fn subscribe(&mut self, callback: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(existing, _)| *existing != id);
        self.subscribers.len() != before
    }

    /// Deliver `value` to every subscriber.
    pub fn publish(&mut self, value: &T) {
        for (_, callback) in &mut self.subscribers {
            callback(value);
        }
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// No subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn publish_reaches_subscribers_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::new();
        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            observers.subscribe(move |value: &u32| log.borrow_mut().push(format!("{tag}{value}")));
        }
        observers.publish(&7);
        assert_eq!(*log.borrow(), vec!["a7".to_string(), "b7".to_string()]);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hits = Rc::new(RefCell::new(0));
        let mut observers = Observers::new();
        let id = {
            let hits = Rc::clone(&hits);
            observers.subscribe(move |_: &()| *hits.borrow_mut() += 1)
        };
        observers.publish(&());
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.publish(&());
        assert_eq!(*hits.borrow(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut observers: Observers<()> = Observers::new();
        let first = observers.subscribe(|_| {});
        observers.unsubscribe(first);
        let second = observers.subscribe(|_| {});
        assert_ne!(first, second);
        assert!(second.get() > first.get());
        assert_eq!(observers.len(), 1);
    }
}

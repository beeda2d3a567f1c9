//! Explicit, synchronous change notification.
//!
//! There is no event bus. A mutating owner (the annotation store) keeps a
//! [`Subscribers`] list and calls [`Subscribers::notify`] itself, after the
//! mutation has fully applied. Listeners run on the caller's thread, in
//! subscription order, before `notify` returns.

/// Handle returned by [`Subscribers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Change listener. Receives a view of the new state.
pub type Listener<T: ?Sized> = Box<dyn FnMut(&T)>;

/// Ordered list of change listeners.
pub struct Subscribers<T: ?Sized> {
    next_id: u64,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
}

impl<T: ?Sized> Subscribers<T> {
    /// Create an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener.
    pub fn subscribe(&mut self, listener: impl FnMut(&T) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Call every listener with `value`.
    pub fn notify(&mut self, value: &T) {
        for (_, listener) in &mut self.listeners {
            listener(value);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// True when nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T: ?Sized> Default for Subscribers<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> std::fmt::Debug for Subscribers<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscribers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_notify_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut subs: Subscribers<[u32]> = Subscribers::new();
        let a = Rc::clone(&log);
        subs.subscribe(move |v: &[u32]| a.borrow_mut().push(("a", v.len())));
        let b = Rc::clone(&log);
        subs.subscribe(move |v: &[u32]| b.borrow_mut().push(("b", v.len())));

        subs.notify(&[1, 2, 3]);
        assert_eq!(*log.borrow(), vec![("a", 3), ("b", 3)]);
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut subs: Subscribers<str> = Subscribers::new();
        let c = Rc::clone(&count);
        let id = subs.subscribe(move |_| *c.borrow_mut() += 1);

        subs.notify("x");
        assert!(subs.unsubscribe(id));
        assert!(!subs.unsubscribe(id));
        subs.notify("x");
        assert_eq!(*count.borrow(), 1);
        assert!(subs.is_empty());
    }
}

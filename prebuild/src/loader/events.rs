//! Named event subscription for native addon handles.

use std::collections::HashMap;

/// Identifies one subscription so it can be removed later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// Callback invoked with an event payload.
pub type Handler<E> = Box<dyn FnMut(&E)>;

/// Capability to subscribe to, unsubscribe from, and emit named events.
pub trait EventEmitter<E> {
    /// Register `handler` for `event` and return its subscription id.
    fn subscribe(&mut self, event: &str, handler: Handler<E>) -> SubscriptionId;

    /// Remove a subscription. Returns `false` if it was not registered for
    /// `event`.
    fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool;

    /// Call every handler registered for `event`, in subscription order, and
    /// return how many ran.
    fn emit(&mut self, event: &str, payload: &E) -> usize;
}

/// In-memory [`EventEmitter`] keyed by event name.
///
/// # Examples
///
/// ```
/// use noble_prebuild::loader::events::{EventEmitter, EventHub};
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(Cell::new(0));
/// let counter = Rc::clone(&seen);
/// let mut hub = EventHub::<u8>::default();
/// hub.subscribe("stateChange", Box::new(move |_: &u8| counter.set(counter.get() + 1)));
/// assert_eq!(hub.emit("stateChange", &1), 1);
/// assert_eq!(seen.get(), 1);
/// ```
pub struct EventHub<E> {
    next_id: u64,
    handlers: HashMap<String, Vec<(SubscriptionId, Handler<E>)>>,
}

impl<E> EventHub<E> {
    /// Number of handlers registered for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, Vec::len)
    }
}

impl<E> Default for EventHub<E> {
    fn default() -> Self {
        Self {
            next_id: 0,
            handlers: HashMap::new(),
        }
    }
}

impl<E> std::fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut events: Vec<(&str, usize)> = self
            .handlers
            .iter()
            .map(|(name, list)| (name.as_str(), list.len()))
            .collect();
        events.sort_unstable();
        f.debug_struct("EventHub").field("events", &events).finish()
    }
}

impl<E> EventEmitter<E> for EventHub<E> {
    fn subscribe(&mut self, event: &str, handler: Handler<E>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers
            .entry(event.to_owned())
            .or_default()
            .push((id, handler));
        id
    }

    fn unsubscribe(&mut self, event: &str, id: SubscriptionId) -> bool {
        let Some(list) = self.handlers.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|(existing, _)| *existing != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.handlers.remove(event);
        }
        removed
    }

    fn emit(&mut self, event: &str, payload: &E) -> usize {
        self.handlers.get_mut(event).map_or(0, |list| {
            for (_, handler) in list.iter_mut() {
                handler(payload);
            }
            list.len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> Handler<String> {
        let log = Rc::clone(log);
        Box::new(move |payload: &String| log.borrow_mut().push(format!("{tag}:{payload}")))
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hub = EventHub::default();
        hub.subscribe("discover", recorder(&log, "first"));
        hub.subscribe("discover", recorder(&log, "second"));

        let ran = hub.emit("discover", &"aa:bb".to_owned());

        assert_eq!(ran, 2);
        assert_eq!(*log.borrow(), ["first:aa:bb", "second:aa:bb"]);
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut hub = EventHub::default();
        let first = hub.subscribe("scanStart", recorder(&log, "first"));
        hub.subscribe("scanStart", recorder(&log, "second"));

        assert!(hub.unsubscribe("scanStart", first));
        hub.emit("scanStart", &String::new());

        assert_eq!(*log.borrow(), ["second:"]);
        assert_eq!(hub.listener_count("scanStart"), 1);
    }

    #[test]
    fn unsubscribe_is_scoped_to_the_event_name() {
        let mut hub = EventHub::<String>::default();
        let id = hub.subscribe("connect", Box::new(|_: &String| {}));

        assert!(!hub.unsubscribe("disconnect", id));
        assert!(hub.unsubscribe("connect", id));
        assert!(!hub.unsubscribe("connect", id));
        assert_eq!(hub.listener_count("connect"), 0);
    }

    #[test]
    fn emitting_without_listeners_is_a_no_op() {
        let mut hub = EventHub::<String>::default();
        assert_eq!(hub.emit("warning", &"ignored".to_owned()), 0);
    }

    #[test]
    fn subscription_ids_are_unique_across_events() {
        let mut hub = EventHub::<String>::default();
        let a = hub.subscribe("a", Box::new(|_: &String| {}));
        let b = hub.subscribe("b", Box::new(|_: &String| {}));
        assert_ne!(a, b);
    }
}

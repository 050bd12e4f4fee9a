//! Named-event broadcast bus with RAII subscriptions.
//!
//! [`Dispatch`] is the cross-instance coordination channel: when one view
//! renders, it broadcasts a [`RenderNotice`] so every other view sharing the
//! document can invalidate its first-render cache. The bus is generic over
//! its payload and single-threaded (`Rc` inside; `Clone` shares state).
//!
//! # Invariants
//!
//! 1. Listeners for an event fire in registration order.
//! 2. Dropping a [`Subscription`] removes the listener before the next
//!    broadcast.
//! 3. `broadcast` snapshots the listener list before invoking anything, so
//!    a listener may register or drop subscriptions without corrupting the
//!    in-flight broadcast.
//! 4. Broadcasting an event nobody listens to is a no-op.
//!
//! # Failure Modes
//!
//! - Listener panic: propagates to the caller of `broadcast`.
//! - Bus dropped while a `Subscription` lives: the guard's drop becomes a
//!   no-op (weak back-reference).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use ahash::AHashMap;

use crate::id::ViewId;

/// Event name used for cross-instance render notifications.
pub const RENDER_EVENT: &str = "renderMVC";

/// Payload broadcast on every render pass. Ephemeral; never stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RenderNotice {
    /// Id of the view that performed the render.
    pub source: ViewId,
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct Entry<T> {
    id: u64,
    listener: Listener<T>,
}

struct BusInner<T> {
    listeners: AHashMap<String, Vec<Entry<T>>>,
    next_id: u64,
}

/// Broadcast bus carrying payloads of type `T` under string event names.
pub struct Dispatch<T> {
    inner: Rc<RefCell<BusInner<T>>>,
}

impl<T> Clone for Dispatch<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Default for Dispatch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dispatch<T> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(BusInner {
                listeners: AHashMap::new(),
                next_id: 0,
            })),
        }
    }

    /// Register a listener for `event`. The listener stays active until the
    /// returned [`Subscription`] is dropped.
    pub fn listen(&self, event: &str, listener: impl Fn(&T) + 'static) -> Subscription
    where
        T: 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.listeners.entry(event.to_owned()).or_default().push(Entry {
                id,
                listener: Rc::new(listener),
            });
            id
        };

        let weak = Rc::downgrade(&self.inner);
        let event = event.to_owned();
        Subscription {
            detach: Some(Box::new(move || {
                detach_listener(&weak, &event, id);
            })),
        }
    }

    /// Invoke every listener registered for `event`, in registration order.
    ///
    /// Fire-and-forget: no return value, synchronous.
    pub fn broadcast(&self, event: &str, payload: &T) {
        let snapshot: Vec<Listener<T>> = {
            let inner = self.inner.borrow();
            match inner.listeners.get(event) {
                Some(entries) => entries.iter().map(|e| Rc::clone(&e.listener)).collect(),
                None => return,
            }
        };
        for listener in snapshot {
            listener(payload);
        }
    }

    /// Number of live listeners for `event`.
    #[must_use]
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(event)
            .map_or(0, Vec::len)
    }
}

fn detach_listener<T>(weak: &Weak<RefCell<BusInner<T>>>, event: &str, id: u64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let mut inner = inner.borrow_mut();
    if let Some(entries) = inner.listeners.get_mut(event) {
        entries.retain(|e| e.id != id);
    }
}

/// RAII guard for a bus listener; dropping it unsubscribes.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn broadcast_reaches_listener() {
        let bus: Dispatch<u32> = Dispatch::new();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let _sub = bus.listen("ev", move |v| s.set(*v));

        bus.broadcast("ev", &42);
        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let bus: Dispatch<()> = Dispatch::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        let o1 = Rc::clone(&order);
        let _a = bus.listen("ev", move |()| o1.borrow_mut().push('a'));
        let o2 = Rc::clone(&order);
        let _b = bus.listen("ev", move |()| o2.borrow_mut().push('b'));

        bus.broadcast("ev", &());
        assert_eq!(*order.borrow(), vec!['a', 'b']);
    }

    #[test]
    fn drop_unsubscribes() {
        let bus: Dispatch<()> = Dispatch::new();
        let count = Rc::new(Cell::new(0));

        let c = Rc::clone(&count);
        let sub = bus.listen("ev", move |()| c.set(c.get() + 1));
        bus.broadcast("ev", &());
        assert_eq!(count.get(), 1);

        drop(sub);
        bus.broadcast("ev", &());
        assert_eq!(count.get(), 1, "listener should be gone after drop");
    }

    #[test]
    fn unknown_event_is_noop() {
        let bus: Dispatch<u32> = Dispatch::new();
        bus.broadcast("nobody", &1);
    }

    #[test]
    fn events_are_independent() {
        let bus: Dispatch<()> = Dispatch::new();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = bus.listen("a", move |()| h.set(h.get() + 1));

        bus.broadcast("b", &());
        assert_eq!(hits.get(), 0);
        bus.broadcast("a", &());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn listener_may_drop_subscription_mid_broadcast() {
        let bus: Dispatch<()> = Dispatch::new();
        let held: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let hits = Rc::new(Cell::new(0));

        let held2 = Rc::clone(&held);
        let h = Rc::clone(&hits);
        let sub = bus.listen("ev", move |()| {
            h.set(h.get() + 1);
            // Drop our own subscription while the broadcast is in flight.
            held2.borrow_mut().take();
        });
        *held.borrow_mut() = Some(sub);

        bus.broadcast("ev", &());
        assert_eq!(hits.get(), 1);
        bus.broadcast("ev", &());
        assert_eq!(hits.get(), 1, "self-removed listener must not fire again");
    }

    #[test]
    fn clone_shares_listeners() {
        let bus: Dispatch<()> = Dispatch::new();
        let other = bus.clone();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let _sub = bus.listen("ev", move |()| h.set(h.get() + 1));

        other.broadcast("ev", &());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn subscription_outliving_bus_is_harmless() {
        let bus: Dispatch<()> = Dispatch::new();
        let sub = bus.listen("ev", |()| {});
        drop(bus);
        drop(sub);
    }

    #[test]
    fn listener_count_tracks_subscriptions() {
        let bus: Dispatch<()> = Dispatch::new();
        assert_eq!(bus.listener_count("ev"), 0);
        let a = bus.listen("ev", |()| {});
        let b = bus.listen("ev", |()| {});
        assert_eq!(bus.listener_count("ev"), 2);
        drop(a);
        assert_eq!(bus.listener_count("ev"), 1);
        drop(b);
        assert_eq!(bus.listener_count("ev"), 0);
    }
}

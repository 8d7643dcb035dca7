use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Handle returned by `connect`, used to disconnect an observer later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

type ObserverFn<T> = Rc<dyn Fn(&T)>;

/// Ordered list of change observers for one widget property.
///
/// Observers run in connection order. `notify` iterates a snapshot, so an
/// observer may connect or disconnect others (or itself) while running.
pub struct Observers<T> {
    entries: RefCell<Vec<(ConnectionId, ObserverFn<T>)>>,
    next_id: Cell<u64>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }
}

impl<T> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}

impl<T> Observers<T> {
    pub fn connect(&self, observer: impl Fn(&T) + 'static) -> ConnectionId {
        let id = ConnectionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, Rc::new(observer)));
        id
    }

    /// Removes an observer. Returns `true` when it was connected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        if let Some(position) = entries.iter().position(|(entry, _)| *entry == id) {
            entries.remove(position);
            return true;
        }
        false
    }

    pub fn notify(&self, value: &T) {
        let snapshot: Vec<ObserverFn<T>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, observer)| Rc::clone(observer))
            .collect();
        for observer in snapshot {
            observer(value);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Widget property that can be observed.
pub trait Observable {
    type Value: Clone + 'static;

    fn current(&self) -> Self::Value;
    fn observe<F: Fn(&Self::Value) + 'static>(&self, observer: F) -> ConnectionId;
    fn unobserve(&self, id: ConnectionId) -> bool;
}

/// Observable property that can also be written, notifying observers on change.
pub trait Settable: Observable {
    fn assign(&self, value: Self::Value);
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::Observers;

    #[test]
    fn observers_run_in_connection_order_and_disconnect() {
        let observers = Observers::<u32>::default();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = Rc::clone(&log);
            observers.connect(move |value| log.borrow_mut().push(("first", *value)))
        };
        {
            let log = Rc::clone(&log);
            observers.connect(move |value| log.borrow_mut().push(("second", *value)));
        }

        observers.notify(&1);
        assert!(observers.disconnect(first));
        assert!(!observers.disconnect(first));
        observers.notify(&2);

        assert_eq!(
            *log.borrow(),
            vec![("first", 1), ("second", 1), ("second", 2)]
        );
    }
}

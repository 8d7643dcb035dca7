//! Declarative links between widget properties.
//!
//! [`dlink`] keeps a label in sync with a source property. [`link`] connects
//! two settable properties in both directions; a re-entrancy guard stops the
//! echo from the far side. Dropping a [`Link`] disconnects every observer it
//! installed.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::{ConnectionId, Label, Observable, Settable};

type Disconnect = Box<dyn FnOnce()>;

#[must_use = "dropping a Link disconnects it"]
pub struct Link {
    disconnects: Vec<Disconnect>,
}

impl Link {
    fn new() -> Self {
        Self {
            disconnects: Vec::new(),
        }
    }

    fn track<S: Observable + 'static>(&mut self, source: &Rc<S>, id: ConnectionId) {
        let source = Rc::downgrade(source);
        self.disconnects.push(Box::new(move || {
            if let Some(source) = source.upgrade() {
                source.unobserve(id);
            }
        }));
    }

    /// Number of observers this link keeps connected.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.disconnects.len()
    }
}

impl Drop for Link {
    fn drop(&mut self) {
        for disconnect in self.disconnects.drain(..) {
            disconnect();
        }
    }
}

impl fmt::Debug for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("connections", &self.disconnects.len())
            .finish()
    }
}

/// One-way link: `label` shows `transform(source)` now and after every change.
pub fn dlink<S, F>(source: &Rc<S>, label: &Rc<Label>, transform: F) -> Link
where
    S: Observable + 'static,
    F: Fn(&S::Value) -> String + 'static,
{
    label.set_text(transform(&source.current()));
    let target = Rc::downgrade(label);
    let id = source.observe(move |value| {
        if let Some(label) = target.upgrade() {
            label.set_text(transform(value));
        }
    });
    let mut link = Link::new();
    link.track(source, id);
    link
}

/// Two-way link. `b` is first aligned to `a`.
pub fn link<A, B, AB, BA>(a: &Rc<A>, b: &Rc<B>, a_to_b: AB, b_to_a: BA) -> Link
where
    A: Settable + 'static,
    B: Settable + 'static,
    AB: Fn(&A::Value) -> B::Value + 'static,
    BA: Fn(&B::Value) -> A::Value + 'static,
{
    let syncing = Rc::new(Cell::new(false));
    b.assign(a_to_b(&a.current()));

    let forward = {
        let syncing = Rc::clone(&syncing);
        let target = Rc::downgrade(b);
        a.observe(move |value| {
            if syncing.get() {
                return;
            }
            if let Some(target) = target.upgrade() {
                syncing.set(true);
                target.assign(a_to_b(value));
                syncing.set(false);
            }
        })
    };
    let backward = {
        let target = Rc::downgrade(a);
        b.observe(move |value| {
            if syncing.get() {
                return;
            }
            if let Some(target) = target.upgrade() {
                syncing.set(true);
                target.assign(b_to_a(value));
                syncing.set(false);
            }
        })
    };

    let mut link = Link::new();
    link.track(a, forward);
    link.track(b, backward);
    link
}

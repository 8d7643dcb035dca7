use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{ConnectionId, Observable, Observers, Settable};

/// Side of the slider a play button sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayButtonPosition {
    Leading,
    #[default]
    Trailing,
}

/// Stepper that walks an integer value from `min` to `max`.
///
/// The host's timer calls [`Play::step_forward`] every `interval_ms` while
/// [`Play::is_playing`] holds.
#[derive(Debug)]
pub struct Play {
    min: usize,
    max: usize,
    step: usize,
    interval_ms: u32,
    value: Cell<usize>,
    playing: Cell<bool>,
    observers: Observers<usize>,
}

impl Play {
    #[must_use]
    pub fn new(min: usize, max: usize, step: usize, interval_ms: u32) -> Rc<Self> {
        Rc::new(Self {
            min,
            max: max.max(min),
            step: step.max(1),
            interval_ms,
            value: Cell::new(min),
            playing: Cell::new(false),
            observers: Observers::default(),
        })
    }

    #[must_use]
    pub fn range(&self) -> (usize, usize, usize) {
        (self.min, self.max, self.step)
    }

    #[must_use]
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    #[must_use]
    pub fn value(&self) -> usize {
        self.value.get()
    }

    pub fn set_value(&self, value: usize) {
        let value = value.clamp(self.min, self.max);
        if value == self.value.get() {
            return;
        }
        self.value.set(value);
        self.observers.notify(&value);
    }

    /// Advances one step. Stops playback and returns `false` at the end.
    pub fn step_forward(&self) -> bool {
        let next = self.value.get() + self.step;
        if next > self.max {
            self.playing.set(false);
            return false;
        }
        self.set_value(next);
        true
    }

    pub fn play(&self) {
        self.playing.set(true);
    }

    pub fn pause(&self) {
        self.playing.set(false);
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing.get()
    }

    pub fn on_change(&self, observer: impl Fn(&usize) + 'static) -> ConnectionId {
        self.observers.connect(observer)
    }

    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.observers.disconnect(id)
    }
}

impl Observable for Play {
    type Value = usize;

    fn current(&self) -> usize {
        self.value()
    }

    fn observe<F: Fn(&usize) + 'static>(&self, observer: F) -> ConnectionId {
        self.on_change(observer)
    }

    fn unobserve(&self, id: ConnectionId) -> bool {
        self.disconnect(id)
    }
}

impl Settable for Play {
    fn assign(&self, value: usize) {
        self.set_value(value);
    }
}

/// Text readout shown next to a slider.
#[derive(Debug, Default)]
pub struct Label {
    text: RefCell<String>,
}

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            text: RefCell::new(text.into()),
        })
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.text.borrow().clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.text.replace(text.into());
    }
}

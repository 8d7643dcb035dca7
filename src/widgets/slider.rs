use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{ConnectionId, Observable, Observers, Settable};

/// `(min, max, step)` of a slider. `step` is `None` for free-moving sliders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderBounds {
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
}

impl SliderBounds {
    #[must_use]
    pub fn new(min: f64, max: f64, step: Option<f64>) -> Self {
        Self { min, max, step }
    }

    /// Clamps `value` into the bounds and snaps it onto the step grid.
    #[must_use]
    pub fn constrain(self, value: f64) -> f64 {
        let (lo, hi) = if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        };
        let snapped = match self.step {
            Some(step) if step > 0.0 => self.min + ((value - self.min) / step).round() * step,
            _ => value,
        };
        snapped.clamp(lo, hi)
    }

    /// Position of `value` on the step grid, counted from `min`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn index_of(self, value: f64) -> usize {
        let step = self.step.filter(|step| *step > 0.0).unwrap_or(1.0);
        ((value - self.min) / step).round().max(0.0) as usize
    }
}

/// Horizontal slider holding one float value.
///
/// Index sliders are sliders over `0..=len - 1` with a step of one.
#[derive(Debug)]
pub struct Slider {
    description: String,
    bounds: SliderBounds,
    value: Cell<f64>,
    observers: Observers<f64>,
}

impl Slider {
    #[must_use]
    pub fn new(description: impl Into<String>, min: f64, max: f64, step: Option<f64>) -> Rc<Self> {
        Rc::new(Self {
            description: description.into(),
            bounds: SliderBounds::new(min, max, step),
            value: Cell::new(min),
            observers: Observers::default(),
        })
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn index_slider(description: impl Into<String>, len: usize) -> Rc<Self> {
        Self::new(description, 0.0, len.saturating_sub(1) as f64, Some(1.0))
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn bounds(&self) -> SliderBounds {
        self.bounds
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value.get()
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.bounds.index_of(self.value.get())
    }

    /// Moves the slider. Observers fire only when the constrained value changes.
    pub fn set_value(&self, value: f64) {
        if value.is_nan() {
            return;
        }
        let value = self.bounds.constrain(value);
        if value == self.value.get() {
            return;
        }
        self.value.set(value);
        self.observers.notify(&value);
    }

    pub fn on_change(&self, observer: impl Fn(&f64) + 'static) -> ConnectionId {
        self.observers.connect(observer)
    }

    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.observers.disconnect(id)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Observable for Slider {
    type Value = f64;

    fn current(&self) -> f64 {
        self.value()
    }

    fn observe<F: Fn(&f64) + 'static>(&self, observer: F) -> ConnectionId {
        self.on_change(observer)
    }

    fn unobserve(&self, id: ConnectionId) -> bool {
        self.disconnect(id)
    }
}

impl Settable for Slider {
    fn assign(&self, value: f64) {
        self.set_value(value);
    }
}

/// Two-handled slider holding a `(low, high)` pair.
#[derive(Debug)]
pub struct RangeSlider {
    description: String,
    bounds: SliderBounds,
    value: Cell<(f64, f64)>,
    observers: Observers<(f64, f64)>,
}

impl RangeSlider {
    /// Starts fully open, spanning `min..=max`.
    #[must_use]
    pub fn new(description: impl Into<String>, min: f64, max: f64, step: Option<f64>) -> Rc<Self> {
        Rc::new(Self {
            description: description.into(),
            bounds: SliderBounds::new(min, max, step),
            value: Cell::new((min, max)),
            observers: Observers::default(),
        })
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn index_slider(description: impl Into<String>, len: usize) -> Rc<Self> {
        Self::new(description, 0.0, len.saturating_sub(1) as f64, Some(1.0))
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn bounds(&self) -> SliderBounds {
        self.bounds
    }

    #[must_use]
    pub fn value(&self) -> (f64, f64) {
        self.value.get()
    }

    #[must_use]
    pub fn indices(&self) -> (usize, usize) {
        let (lo, hi) = self.value.get();
        (self.bounds.index_of(lo), self.bounds.index_of(hi))
    }

    pub fn set_value(&self, (lo, hi): (f64, f64)) {
        if lo.is_nan() || hi.is_nan() {
            return;
        }
        let lo = self.bounds.constrain(lo);
        let hi = self.bounds.constrain(hi);
        let value = if lo <= hi { (lo, hi) } else { (hi, lo) };
        if value == self.value.get() {
            return;
        }
        self.value.set(value);
        self.observers.notify(&value);
    }

    pub fn on_change(&self, observer: impl Fn(&(f64, f64)) + 'static) -> ConnectionId {
        self.observers.connect(observer)
    }

    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.observers.disconnect(id)
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }
}

impl Observable for RangeSlider {
    type Value = (f64, f64);

    fn current(&self) -> (f64, f64) {
        self.value()
    }

    fn observe<F: Fn(&(f64, f64)) + 'static>(&self, observer: F) -> ConnectionId {
        self.on_change(observer)
    }

    fn unobserve(&self, id: ConnectionId) -> bool {
        self.disconnect(id)
    }
}

impl Settable for RangeSlider {
    fn assign(&self, value: (f64, f64)) {
        self.set_value(value);
    }
}

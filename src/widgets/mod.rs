//! Backend-neutral widget models.
//!
//! Both widget backends build their controls out of these types, and callers
//! hand pre-built ones in as external widgets. Every widget is single-threaded
//! (`Rc` + `Cell`) and notifies observers synchronously on change.

mod format;
mod link;
mod observers;
mod play;
mod selector;
mod slider;

use std::rc::Rc;

pub use format::{FormatterFn, SliderFormat, SliderFormats};
pub use link::{Link, dlink, link};
pub use observers::{ConnectionId, Observable, Observers, Settable};
pub use play::{Label, Play, PlayButtonPosition};
pub use selector::{RADIO_OPTION_LIMIT, Selector, SelectorStyle, ValueWidget};
pub use slider::{RangeSlider, Slider, SliderBounds};

use crate::core::{ControlIndex, ParamValue};

/// Any widget that can be bound to a parameter.
///
/// Equality is identity: two handles are equal when they point at the same widget.
#[derive(Debug, Clone)]
pub enum Widget {
    Slider(Rc<Slider>),
    RangeSlider(Rc<RangeSlider>),
    Selector(Rc<Selector>),
    Value(Rc<ValueWidget>),
}

impl Widget {
    #[must_use]
    pub fn value(&self) -> ParamValue {
        match self {
            Self::Slider(slider) => ParamValue::Number(slider.value()),
            Self::RangeSlider(slider) => {
                let (lo, hi) = slider.value();
                ParamValue::pair(lo, hi)
            }
            Self::Selector(selector) => selector.value(),
            Self::Value(widget) => widget.value(),
        }
    }

    #[must_use]
    pub fn index(&self) -> ControlIndex {
        match self {
            Self::Slider(slider) => ControlIndex::Single(slider.index()),
            Self::RangeSlider(slider) => {
                let (lo, hi) = slider.indices();
                ControlIndex::Pair(lo, hi)
            }
            Self::Selector(selector) => ControlIndex::Single(selector.index()),
            Self::Value(_) => ControlIndex::Single(0),
        }
    }

    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Slider(slider) => slider.description(),
            Self::RangeSlider(slider) => slider.description(),
            Self::Selector(selector) => selector.description(),
            Self::Value(widget) => widget.description(),
        }
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Slider(_) => "Slider",
            Self::RangeSlider(_) => "RangeSlider",
            Self::Selector(_) => "Selector",
            Self::Value(_) => "ValueWidget",
        }
    }

    /// Bounds of a single-valued slider; `None` for every other widget.
    #[must_use]
    pub fn bounds(&self) -> Option<SliderBounds> {
        match self {
            Self::Slider(slider) => Some(slider.bounds()),
            _ => None,
        }
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        match self {
            Self::Slider(slider) => slider.observer_count(),
            Self::RangeSlider(slider) => slider.observer_count(),
            Self::Selector(selector) => selector.observer_count(),
            Self::Value(widget) => widget.observer_count(),
        }
    }

    pub(crate) fn disconnect(&self, id: ConnectionId) -> bool {
        match self {
            Self::Slider(slider) => slider.disconnect(id),
            Self::RangeSlider(slider) => slider.disconnect(id),
            Self::Selector(selector) => selector.disconnect(id),
            Self::Value(widget) => widget.disconnect(id),
        }
    }
}

impl PartialEq for Widget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Slider(a), Self::Slider(b)) => Rc::ptr_eq(a, b),
            (Self::RangeSlider(a), Self::RangeSlider(b)) => Rc::ptr_eq(a, b),
            (Self::Selector(a), Self::Selector(b)) => Rc::ptr_eq(a, b),
            (Self::Value(a), Self::Value(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Rc<Slider>> for Widget {
    fn from(slider: Rc<Slider>) -> Self {
        Self::Slider(slider)
    }
}

impl From<Rc<RangeSlider>> for Widget {
    fn from(slider: Rc<RangeSlider>) -> Self {
        Self::RangeSlider(slider)
    }
}

impl From<Rc<Selector>> for Widget {
    fn from(selector: Rc<Selector>) -> Self {
        Self::Selector(selector)
    }
}

impl From<Rc<ValueWidget>> for Widget {
    fn from(widget: Rc<ValueWidget>) -> Self {
        Self::Value(widget)
    }
}

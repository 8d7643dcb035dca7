use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::core::ParamValue;
use crate::error::{ControlsError, ControlsResult};

use super::{ConnectionId, Observable, Observers, Settable};

/// Option count up to which categorical parameters render as radio buttons.
pub const RADIO_OPTION_LIMIT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectorStyle {
    Radio,
    Dropdown,
}

/// Single-choice selector over an ordered list of options.
#[derive(Debug)]
pub struct Selector {
    description: String,
    options: Vec<ParamValue>,
    style: SelectorStyle,
    index: Cell<usize>,
    observers: Observers<usize>,
}

impl Selector {
    pub fn new(
        description: impl Into<String>,
        options: Vec<ParamValue>,
        style: SelectorStyle,
    ) -> ControlsResult<Rc<Self>> {
        let description = description.into();
        if options.is_empty() {
            return Err(ControlsError::invalid(
                &description,
                "selector needs at least one option",
            ));
        }
        Ok(Rc::new(Self {
            description,
            options,
            style,
            index: Cell::new(0),
            observers: Observers::default(),
        }))
    }

    /// Radio buttons for short option lists, a dropdown otherwise.
    pub fn for_options(
        description: impl Into<String>,
        options: Vec<ParamValue>,
    ) -> ControlsResult<Rc<Self>> {
        let style = if options.len() <= RADIO_OPTION_LIMIT {
            SelectorStyle::Radio
        } else {
            SelectorStyle::Dropdown
        };
        Self::new(description, options, style)
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn options(&self) -> &[ParamValue] {
        &self.options
    }

    #[must_use]
    pub fn style(&self) -> SelectorStyle {
        self.style
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index.get()
    }

    #[must_use]
    pub fn value(&self) -> ParamValue {
        self.options[self.index.get()].clone()
    }

    pub fn select(&self, index: usize) -> ControlsResult<()> {
        if index >= self.options.len() {
            return Err(ControlsError::IndexOutOfRange {
                name: self.description.clone(),
                index,
                len: self.options.len(),
            });
        }
        if index != self.index.get() {
            self.index.set(index);
            self.observers.notify(&index);
        }
        Ok(())
    }

    pub fn select_value(&self, value: &ParamValue) -> ControlsResult<()> {
        let index = self
            .options
            .iter()
            .position(|option| option == value)
            .ok_or_else(|| {
                ControlsError::invalid(&self.description, format!("`{value}` is not an option"))
            })?;
        self.select(index)
    }

    pub fn on_change(&self, observer: impl Fn(&usize) + 'static) -> ConnectionId {
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

impl Observable for Selector {
    type Value = usize;

    fn current(&self) -> usize {
        self.index()
    }

    fn observe<F: Fn(&usize) + 'static>(&self, observer: F) -> ConnectionId {
        self.on_change(observer)
    }

    fn unobserve(&self, id: ConnectionId) -> bool {
        self.disconnect(id)
    }
}

/// Generic value-bearing widget, such as a text box or a checkbox built by the host.
#[derive(Debug)]
pub struct ValueWidget {
    description: String,
    value: RefCell<ParamValue>,
    observers: Observers<ParamValue>,
}

impl ValueWidget {
    #[must_use]
    pub fn new(description: impl Into<String>, value: impl Into<ParamValue>) -> Rc<Self> {
        Rc::new(Self {
            description: description.into(),
            value: RefCell::new(value.into()),
            observers: Observers::default(),
        })
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn value(&self) -> ParamValue {
        self.value.borrow().clone()
    }

    pub fn set_value(&self, value: impl Into<ParamValue>) {
        let value = value.into();
        if *self.value.borrow() == value {
            return;
        }
        self.value.replace(value.clone());
        self.observers.notify(&value);
    }

    pub fn on_change(&self, observer: impl Fn(&ParamValue) + 'static) -> ConnectionId {
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

impl Observable for ValueWidget {
    type Value = ParamValue;

    fn current(&self) -> ParamValue {
        self.value()
    }

    fn observe<F: Fn(&ParamValue) + 'static>(&self, observer: F) -> ConnectionId {
        self.on_change(observer)
    }

    fn unobserve(&self, id: ConnectionId) -> bool {
        self.disconnect(id)
    }
}

impl Settable for ValueWidget {
    fn assign(&self, value: ParamValue) {
        self.set_value(value);
    }
}

//! Widget backends.
//!
//! A [`WidgetBackend`] turns resolved [`ParameterSpec`]s into live controls for
//! one UI toolkit and normalizes that toolkit's change events into
//! [`ChangePayload`]s. The registry is written against the trait only and picks
//! an implementation once, at construction time.

mod control;
#[cfg(feature = "native")]
mod native;
#[cfg(feature = "notebook")]
mod notebook;
mod panel;

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::api::{ControlsConfig, DisplaySink};
use crate::core::{ControlIndex, ParamValue, ParameterSpec};
use crate::error::{ControlsError, ControlsResult};
use crate::widgets::{ConnectionId, PlayButtonPosition, Widget};

pub use control::Control;
pub(crate) use control::ControlDriver;
#[cfg(feature = "native")]
pub use native::NativeBackend;
#[cfg(feature = "notebook")]
pub use notebook::NotebookBackend;
pub use panel::{
    AxesRect, AxesRole, ControlFigure, NotebookPanel, PanelItem, PanelRow, WidgetAxes,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BackendKind {
    /// Sliders and selectors stacked in a notebook output panel.
    #[default]
    Notebook,
    /// Plot-library widgets laid out in a dedicated control figure.
    Native,
}

impl BackendKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Notebook => "notebook",
            Self::Native => "native",
        }
    }
}

/// Normalized change event delivered by a control.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangePayload {
    /// New position in the parameter's values.
    Index(usize),
    /// New `(low, high)` positions of a range control.
    IndexPair(usize, usize),
    /// A value that is not index based: continuous sliders and external widgets.
    Value(ParamValue),
}

pub type ChangeHandler = Rc<dyn Fn(ChangePayload)>;

/// One control the registry wants built.
#[derive(Debug, Clone, Copy)]
pub struct ControlRequest<'a> {
    pub name: &'a str,
    pub spec: &'a ParameterSpec,
    pub play_button: Option<PlayButtonPosition>,
}

impl<'a> ControlRequest<'a> {
    #[must_use]
    pub fn new(name: &'a str, spec: &'a ParameterSpec) -> Self {
        Self {
            name,
            spec,
            play_button: None,
        }
    }

    #[must_use]
    pub fn with_play_button(mut self, position: Option<PlayButtonPosition>) -> Self {
        self.play_button = position;
        self
    }
}

/// Result of [`WidgetBackend::build`]: the starting value plus the live control, if any.
#[derive(Debug)]
pub struct BuiltControl {
    pub value: ParamValue,
    pub index: ControlIndex,
    pub control: Option<Control>,
}

impl BuiltControl {
    #[must_use]
    pub fn fixed(value: ParamValue) -> Self {
        Self {
            value,
            index: ControlIndex::default(),
            control: None,
        }
    }

    #[must_use]
    pub fn live(spec: &ParameterSpec, control: Control) -> Self {
        Self {
            value: spec.initial_value(),
            index: spec.initial_index(),
            control: Some(control),
        }
    }
}

/// Capability surface of one UI toolkit.
pub trait WidgetBackend {
    fn kind(&self) -> BackendKind;

    /// Called with every request of one `add_params` batch before any of them
    /// is built, so layout-driven backends can size their container up front.
    fn prepare(&mut self, _requests: &[ControlRequest<'_>]) {}

    fn build(
        &mut self,
        request: &ControlRequest<'_>,
        on_change: ChangeHandler,
    ) -> ControlsResult<BuiltControl>;

    fn present(&self, sink: &mut dyn DisplaySink);
}

/// Builds the backend for `kind`, or fails when it was compiled out.
#[cfg_attr(
    not(any(feature = "notebook", feature = "native")),
    allow(unused_variables)
)]
pub fn create_backend(
    kind: BackendKind,
    config: &ControlsConfig,
) -> ControlsResult<Box<dyn WidgetBackend>> {
    match kind {
        #[cfg(feature = "notebook")]
        BackendKind::Notebook => Ok(Box::new(NotebookBackend::new(config.play_interval_ms))),
        #[cfg(feature = "native")]
        BackendKind::Native => Ok(Box::new(NativeBackend::new(
            config.layout,
            config.play_interval_ms,
        ))),
        #[allow(unreachable_patterns)]
        other => Err(unavailable(other)),
    }
}

fn unavailable(kind: BackendKind) -> ControlsError {
    ControlsError::BackendUnavailable {
        backend: kind.name(),
        capability: format!(
            "this build was compiled without the `{}` cargo feature",
            kind.name()
        ),
    }
}

/// Forwards an external widget's own change event as [`ChangePayload::Value`].
pub fn wire_external(widget: &Widget, on_change: ChangeHandler) -> ConnectionId {
    match widget {
        Widget::Slider(slider) => slider.on_change(move |value| {
            on_change(ChangePayload::Value(ParamValue::Number(*value)));
        }),
        Widget::RangeSlider(slider) => slider.on_change(move |(lo, hi)| {
            on_change(ChangePayload::Value(ParamValue::pair(*lo, *hi)));
        }),
        Widget::Selector(selector) => {
            let options = selector.options().to_vec();
            selector.on_change(move |index| {
                if let Some(option) = options.get(*index) {
                    on_change(ChangePayload::Value(option.clone()));
                }
            })
        }
        Widget::Value(widget) => {
            widget.on_change(move |value| on_change(ChangePayload::Value(value.clone())))
        }
    }
}

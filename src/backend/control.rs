use std::fmt;
use std::rc::Rc;

use crate::core::{Domain, ParamValue, ParameterKind, ParameterSpec};
use crate::error::{ControlsError, ControlsResult};
use crate::widgets::{ConnectionId, Label, Link, Play, SliderBounds, Widget};

use super::ChangePayload;
use super::panel::WidgetAxes;

/// A live control: the widget bound to one parameter plus everything attached to it.
///
/// Dropping a control disconnects the registry's change observer from its
/// widget, which matters for external widgets that outlive the registry.
pub struct Control {
    name: String,
    spec: Rc<ParameterSpec>,
    widget: Widget,
    indexed: bool,
    connection: ConnectionId,
    readout: Option<Rc<Label>>,
    play: Option<Rc<Play>>,
    links: Vec<Link>,
    placement: Vec<WidgetAxes>,
}

impl Control {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        spec: ParameterSpec,
        widget: Widget,
        connection: ConnectionId,
    ) -> Self {
        Self {
            name: name.into(),
            spec: Rc::new(spec),
            widget,
            indexed: false,
            connection,
            readout: None,
            play: None,
            links: Vec::new(),
            placement: Vec::new(),
        }
    }

    /// Marks the widget's position as an index into the parameter's values.
    #[must_use]
    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    #[must_use]
    pub fn with_readout(mut self, label: Rc<Label>, link: Link) -> Self {
        self.readout = Some(label);
        self.links.push(link);
        self
    }

    #[must_use]
    pub fn with_play(mut self, play: Rc<Play>, link: Link) -> Self {
        self.play = Some(play);
        self.links.push(link);
        self
    }

    #[must_use]
    pub fn with_placement(mut self, axes: WidgetAxes) -> Self {
        self.placement.push(axes);
        self
    }

    /// Detached handle for moving the widget without holding a borrow of the registry.
    pub(crate) fn driver(&self) -> ControlDriver {
        ControlDriver {
            name: self.name.clone(),
            spec: Rc::clone(&self.spec),
            widget: self.widget.clone(),
            indexed: self.indexed,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn spec(&self) -> &ParameterSpec {
        &self.spec
    }

    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        self.spec.kind()
    }

    #[must_use]
    pub fn widget(&self) -> &Widget {
        &self.widget
    }

    #[must_use]
    pub fn readout(&self) -> Option<&Rc<Label>> {
        self.readout.as_ref()
    }

    #[must_use]
    pub fn play(&self) -> Option<&Rc<Play>> {
        self.play.as_ref()
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        matches!(self.spec.domain, Domain::External(_))
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        self.indexed
    }

    /// Axes this control occupies in a native control figure.
    #[must_use]
    pub fn placement(&self) -> &[WidgetAxes] {
        &self.placement
    }
}

impl Drop for Control {
    fn drop(&mut self) {
        self.widget.disconnect(self.connection);
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("name", &self.name)
            .field("kind", &self.spec.kind())
            .field("widget", &self.widget.type_name())
            .field("indexed", &self.indexed)
            .field("play", &self.play.is_some())
            .field("links", &self.links.len())
            .field("placement", &self.placement.len())
            .finish()
    }
}

/// Moves a control's widget. Observers fire as if the user had moved it.
#[derive(Debug, Clone)]
pub(crate) struct ControlDriver {
    name: String,
    spec: Rc<ParameterSpec>,
    widget: Widget,
    indexed: bool,
}

impl ControlDriver {
    pub(crate) fn widget(&self) -> &Widget {
        &self.widget
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// `(min, max, step)` of the widget. Selectors report their option positions.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn bounds(&self) -> ControlsResult<SliderBounds> {
        match &self.widget {
            Widget::Slider(slider) => Ok(slider.bounds()),
            Widget::RangeSlider(slider) => Ok(slider.bounds()),
            Widget::Selector(selector) => Ok(SliderBounds::new(
                0.0,
                selector.options().len().saturating_sub(1) as f64,
                Some(1.0),
            )),
            Widget::Value(_) => Err(ControlsError::UnsupportedWidgetType {
                name: self.name.clone(),
                widget: self.widget.type_name(),
            }),
        }
    }

    /// Moves the widget to position `index` of the parameter's values.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn set_index(&self, index: usize) -> ControlsResult<()> {
        let Some(values) = self.spec.values() else {
            return Err(ControlsError::invalid(
                &self.name,
                "control is not index based; set its value instead",
            ));
        };
        if index >= values.len() {
            return Err(ControlsError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                len: values.len(),
            });
        }
        match &self.widget {
            Widget::Slider(slider) if self.indexed => {
                slider.set_value(index as f64);
                Ok(())
            }
            Widget::Slider(slider) => match values[index].as_f64() {
                Some(value) => {
                    slider.set_value(value);
                    Ok(())
                }
                None => Err(ControlsError::invalid(&self.name, "sample is not numeric")),
            },
            Widget::Selector(selector) => selector.select(index),
            Widget::RangeSlider(_) => Err(ControlsError::invalid(
                &self.name,
                "range controls take a pair of indices",
            )),
            Widget::Value(_) => Err(ControlsError::NoControl(self.name.clone())),
        }
    }

    /// Moves both handles of a range control.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn set_range(&self, low: usize, high: usize) -> ControlsResult<()> {
        let Widget::RangeSlider(slider) = &self.widget else {
            return Err(ControlsError::UnsupportedWidgetType {
                name: self.name.clone(),
                widget: self.widget.type_name(),
            });
        };
        let len = self.spec.values().map_or(0, <[_]>::len);
        if let Some(index) = [low, high].into_iter().find(|index| *index >= len) {
            return Err(ControlsError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                len,
            });
        }
        slider.set_value((low as f64, high as f64));
        Ok(())
    }

    /// The change event a slider sends for the position it is at now.
    pub(crate) fn slider_payload(&self) -> ControlsResult<ChangePayload> {
        match &self.widget {
            Widget::Slider(slider) if self.indexed => Ok(ChangePayload::Index(slider.index())),
            Widget::Slider(slider) => Ok(ChangePayload::Value(ParamValue::Number(slider.value()))),
            other => Err(ControlsError::UnsupportedWidgetType {
                name: self.name.clone(),
                widget: other.type_name(),
            }),
        }
    }

    /// Sets a slider to a raw position. The value is clamped and snapped.
    pub(crate) fn set_value(&self, value: f64) -> ControlsResult<()> {
        match &self.widget {
            Widget::Slider(slider) => {
                slider.set_value(value);
                Ok(())
            }
            other => Err(ControlsError::UnsupportedWidgetType {
                name: self.name.clone(),
                widget: other.type_name(),
            }),
        }
    }
}

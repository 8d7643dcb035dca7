use std::rc::Rc;

use tracing::debug;

use crate::api::{DisplaySink, NativeLayoutConfig};
use crate::core::{Domain, ParamValue};
use crate::error::ControlsResult;
use crate::widgets::{
    Label, Play, PlayButtonPosition, RangeSlider, Selector, SelectorStyle, Slider, Widget, dlink,
    link,
};

use super::panel::{AxesRect, AxesRole, ControlFigure, PanelItem, WidgetAxes};
use super::{
    BackendKind, BuiltControl, ChangeHandler, ChangePayload, Control, ControlRequest,
    WidgetBackend, wire_external,
};

const PLAY_BUTTON_GAP: f64 = 0.02;

/// Widget counts of one batch, used to size its control figure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LayoutBudget {
    pub sliders: usize,
    pub radio_groups: usize,
    pub options: usize,
}

impl LayoutBudget {
    pub(crate) fn count(requests: &[ControlRequest<'_>]) -> Self {
        let mut budget = Self::default();
        for request in requests {
            match &request.spec.domain {
                Domain::Continuous { .. } | Domain::Index(_) | Domain::Range(_) => {
                    budget.sliders += 1;
                }
                Domain::Categorical(options) => {
                    budget.radio_groups += 1;
                    budget.options += options.len();
                }
                Domain::Fixed(_) | Domain::External(_) => {}
            }
        }
        budget
    }

    pub(crate) fn is_empty(self) -> bool {
        self.sliders == 0 && self.radio_groups == 0
    }

    /// Figure height: per-slider and per-option heights, one gap around every
    /// widget, plus the outer margin.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn height_in(self, layout: &NativeLayoutConfig) -> f64 {
        self.sliders as f64 * layout.slider_height_in
            + self.options as f64 * layout.option_height_in
            + layout.gap_in * (self.sliders + self.radio_groups + 1) as f64
            + layout.margin_in
    }
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    figure: usize,
    offset_in: f64,
}

/// Native plot-widget toolkit.
///
/// Every `add_params` batch that needs on-screen widgets gets its own control
/// figure. Widgets are stacked top to bottom in a single column.
#[derive(Debug)]
pub struct NativeBackend {
    layout: NativeLayoutConfig,
    play_interval_ms: u32,
    figures: Vec<ControlFigure>,
    cursor: Option<Cursor>,
}

impl NativeBackend {
    #[must_use]
    pub fn new(layout: NativeLayoutConfig, play_interval_ms: u32) -> Self {
        Self {
            layout,
            play_interval_ms,
            figures: Vec::new(),
            cursor: None,
        }
    }

    #[must_use]
    pub fn figures(&self) -> &[ControlFigure] {
        &self.figures
    }

    /// Reserves the next `height_in` inches of the current figure and returns
    /// the band's `(bottom, height)` in figure fractions.
    fn reserve(&mut self, request: &ControlRequest<'_>, height_in: f64) -> (usize, f64, f64) {
        if self.cursor.is_none() {
            self.prepare(std::slice::from_ref(request));
        }
        let gap_in = self.layout.gap_in;
        let Some(cursor) = self.cursor.as_mut() else {
            return (0, 0.0, 0.0);
        };
        let figure_height = self.figures[cursor.figure].height_in;
        let top_in = cursor.offset_in + gap_in;
        cursor.offset_in = top_in + height_in;
        (
            cursor.figure,
            1.0 - (top_in + height_in) / figure_height,
            height_in / figure_height,
        )
    }

    fn place(&mut self, figure: usize, axes: WidgetAxes) -> WidgetAxes {
        self.figures[figure].axes.push(axes.clone());
        axes
    }

    fn play_rect(&self, position: PlayButtonPosition, bottom: f64, height: f64) -> AxesRect {
        let layout = &self.layout;
        let left = match position {
            PlayButtonPosition::Leading => {
                layout.widget_left - layout.play_width - PLAY_BUTTON_GAP
            }
            PlayButtonPosition::Trailing => {
                layout.widget_left + layout.slider_width + PLAY_BUTTON_GAP
            }
        };
        AxesRect::new(left.max(0.0), bottom, layout.play_width, height)
    }

    fn continuous_slider(
        &mut self,
        request: &ControlRequest<'_>,
        min: f64,
        max: f64,
        on_change: ChangeHandler,
    ) -> Control {
        let slider = Slider::new(request.name, min, max, None);
        let label = Label::new("");
        let readout = {
            let format = request.spec.format.clone();
            dlink(&slider, &label, move |value| {
                format.format(&ParamValue::Number(*value))
            })
        };
        let connection = slider.on_change(move |value| {
            on_change(ChangePayload::Value(ParamValue::Number(*value)));
        });
        if request.play_button.is_some() {
            debug!(
                name = request.name,
                "continuous native slider has no step; play button skipped"
            );
        }

        let (figure, bottom, height) = self.reserve(request, self.layout.slider_height_in);
        let axes = self.place(
            figure,
            WidgetAxes {
                name: request.name.to_owned(),
                role: AxesRole::Slider,
                rect: AxesRect::new(self.layout.widget_left, bottom, self.layout.slider_width, height),
                item: PanelItem::Widget(Widget::Slider(Rc::clone(&slider))),
            },
        );
        Control::new(
            request.name,
            request.spec.clone(),
            Widget::Slider(slider),
            connection,
        )
        .with_readout(label, readout)
        .with_placement(axes)
    }

    fn index_slider(
        &mut self,
        request: &ControlRequest<'_>,
        values: &[ParamValue],
        on_change: ChangeHandler,
    ) -> Control {
        let slider = Slider::index_slider(request.name, values.len());
        let bounds = slider.bounds();
        let label = Label::new("");
        let readout = {
            let values = values.to_vec();
            let format = request.spec.format.clone();
            dlink(&slider, &label, move |value| {
                values
                    .get(bounds.index_of(*value))
                    .map_or_else(String::new, |value| format.format(value))
            })
        };
        let connection = slider.on_change(move |value| {
            on_change(ChangePayload::Index(bounds.index_of(*value)));
        });

        let (figure, bottom, height) = self.reserve(request, self.layout.slider_height_in);
        let axes = self.place(
            figure,
            WidgetAxes {
                name: request.name.to_owned(),
                role: AxesRole::Slider,
                rect: AxesRect::new(self.layout.widget_left, bottom, self.layout.slider_width, height),
                item: PanelItem::Widget(Widget::Slider(Rc::clone(&slider))),
            },
        );
        let mut control = Control::new(
            request.name,
            request.spec.clone(),
            Widget::Slider(Rc::clone(&slider)),
            connection,
        )
        .indexed()
        .with_readout(label, readout)
        .with_placement(axes);

        if let Some(position) = request.play_button {
            let play = Play::new(0, values.len().saturating_sub(1), 1, self.play_interval_ms);
            #[allow(clippy::cast_precision_loss)]
            let play_link = link(
                &play,
                &slider,
                |index| *index as f64,
                move |value| bounds.index_of(*value),
            );
            let rect = self.play_rect(position, bottom, height);
            let axes = self.place(
                figure,
                WidgetAxes {
                    name: request.name.to_owned(),
                    role: AxesRole::Play,
                    rect,
                    item: PanelItem::Play(Rc::clone(&play)),
                },
            );
            control = control.with_play(play, play_link).with_placement(axes);
        }
        control
    }

    fn range_slider(
        &mut self,
        request: &ControlRequest<'_>,
        values: &[ParamValue],
        on_change: ChangeHandler,
    ) -> Control {
        let slider = RangeSlider::index_slider(request.name, values.len());
        let bounds = slider.bounds();
        let label = Label::new("");
        let readout = {
            let values = values.to_vec();
            let format = request.spec.format.clone();
            dlink(&slider, &label, move |(lo, hi)| {
                match (
                    values.get(bounds.index_of(*lo)),
                    values.get(bounds.index_of(*hi)),
                ) {
                    (Some(lo), Some(hi)) => format.format_range(lo, hi),
                    _ => String::new(),
                }
            })
        };
        let connection = slider.on_change(move |(lo, hi)| {
            on_change(ChangePayload::IndexPair(
                bounds.index_of(*lo),
                bounds.index_of(*hi),
            ));
        });

        let (figure, bottom, height) = self.reserve(request, self.layout.slider_height_in);
        let axes = self.place(
            figure,
            WidgetAxes {
                name: request.name.to_owned(),
                role: AxesRole::RangeSlider,
                rect: AxesRect::new(self.layout.widget_left, bottom, self.layout.slider_width, height),
                item: PanelItem::Widget(Widget::RangeSlider(Rc::clone(&slider))),
            },
        );
        Control::new(
            request.name,
            request.spec.clone(),
            Widget::RangeSlider(slider),
            connection,
        )
        .indexed()
        .with_readout(label, readout)
        .with_placement(axes)
    }

    #[allow(clippy::cast_precision_loss)]
    fn radio_buttons(
        &mut self,
        request: &ControlRequest<'_>,
        options: &[ParamValue],
        on_change: ChangeHandler,
    ) -> ControlsResult<Control> {
        let selector = Selector::new(request.name, options.to_vec(), SelectorStyle::Radio)?;
        let connection = selector.on_change(move |index| on_change(ChangePayload::Index(*index)));

        let longest = options
            .iter()
            .map(|option| option.to_string().chars().count())
            .max()
            .unwrap_or(0);
        let width = (0.015 * longest as f64).max(0.15);
        let height_in = self.layout.option_height_in * options.len() as f64;
        let (figure, bottom, height) = self.reserve(request, height_in);
        let axes = self.place(
            figure,
            WidgetAxes {
                name: request.name.to_owned(),
                role: AxesRole::Radio,
                rect: AxesRect::new(self.layout.widget_left, bottom, width, height),
                item: PanelItem::Widget(Widget::Selector(Rc::clone(&selector))),
            },
        );
        Ok(Control::new(
            request.name,
            request.spec.clone(),
            Widget::Selector(selector),
            connection,
        )
        .indexed()
        .with_placement(axes))
    }
}

impl WidgetBackend for NativeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Native
    }

    fn prepare(&mut self, requests: &[ControlRequest<'_>]) {
        let budget = LayoutBudget::count(requests);
        if budget.is_empty() {
            self.cursor = None;
            return;
        }
        let height_in = budget.height_in(&self.layout);
        self.figures.push(ControlFigure {
            width_in: self.layout.figure_width_in,
            height_in,
            axes: Vec::new(),
        });
        self.cursor = Some(Cursor {
            figure: self.figures.len() - 1,
            offset_in: self.layout.margin_in / 2.0,
        });
        debug!(
            sliders = budget.sliders,
            radio_groups = budget.radio_groups,
            options = budget.options,
            height_in,
            "sized native control figure"
        );
    }

    fn build(
        &mut self,
        request: &ControlRequest<'_>,
        on_change: ChangeHandler,
    ) -> ControlsResult<BuiltControl> {
        let spec = request.spec;
        let control = match &spec.domain {
            Domain::Fixed(value) => return Ok(BuiltControl::fixed(value.clone())),
            Domain::External(widget) => {
                let connection = wire_external(widget, on_change);
                Control::new(request.name, spec.clone(), widget.clone(), connection)
            }
            Domain::Continuous { min, max, .. } => {
                self.continuous_slider(request, *min, *max, on_change)
            }
            Domain::Index(values) => self.index_slider(request, values, on_change),
            Domain::Range(values) => self.range_slider(request, values, on_change),
            Domain::Categorical(options) => self.radio_buttons(request, options, on_change)?,
        };
        Ok(BuiltControl::live(spec, control))
    }

    fn present(&self, sink: &mut dyn DisplaySink) {
        for figure in &self.figures {
            sink.show_figure(figure);
        }
    }
}

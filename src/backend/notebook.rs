use std::rc::Rc;

use tracing::debug;

use crate::api::DisplaySink;
use crate::core::{Domain, ParamValue};
use crate::error::ControlsResult;
use crate::widgets::{
    Label, Play, PlayButtonPosition, RangeSlider, Selector, Slider, SliderFormat, Widget, dlink,
    link,
};

use super::panel::{NotebookPanel, PanelItem, PanelRow};
use super::{
    BackendKind, BuiltControl, ChangeHandler, ChangePayload, Control, ControlRequest,
    WidgetBackend, wire_external,
};

/// Notebook-style toolkit: every slider is an index slider with a text readout,
/// rows are stacked vertically in one panel.
#[derive(Debug, Default)]
pub struct NotebookBackend {
    play_interval_ms: u32,
    panel: NotebookPanel,
}

impl NotebookBackend {
    #[must_use]
    pub fn new(play_interval_ms: u32) -> Self {
        Self {
            play_interval_ms,
            panel: NotebookPanel::default(),
        }
    }

    #[must_use]
    pub fn panel(&self) -> &NotebookPanel {
        &self.panel
    }

    fn index_slider(
        &mut self,
        request: &ControlRequest<'_>,
        values: &[ParamValue],
        on_change: ChangeHandler,
    ) -> Control {
        let slider = Slider::index_slider(request.name, values.len());
        let label = Label::new("");
        let readout = {
            let values = values.to_vec();
            let format = request.spec.format.clone();
            let bounds = slider.bounds();
            dlink(&slider, &label, move |value| {
                describe(&format, &values, bounds.index_of(*value))
            })
        };
        let bounds = slider.bounds();
        let connection = slider.on_change(move |value| {
            on_change(ChangePayload::Index(bounds.index_of(*value)));
        });

        let mut control = Control::new(
            request.name,
            request.spec.clone(),
            Widget::Slider(Rc::clone(&slider)),
            connection,
        )
        .indexed()
        .with_readout(Rc::clone(&label), readout);

        let mut items = vec![
            PanelItem::Widget(Widget::Slider(Rc::clone(&slider))),
            PanelItem::Readout(label),
        ];
        if let Some(position) = request.play_button {
            let play = Play::new(0, values.len().saturating_sub(1), 1, self.play_interval_ms);
            let play_link = link(
                &play,
                &slider,
                |index| index_to_position(*index),
                move |value| bounds.index_of(*value),
            );
            match position {
                PlayButtonPosition::Leading => items.insert(0, PanelItem::Play(Rc::clone(&play))),
                PlayButtonPosition::Trailing => items.push(PanelItem::Play(Rc::clone(&play))),
            }
            control = control.with_play(play, play_link);
        }
        self.push_row(request.name, items);
        control
    }

    fn range_slider(
        &mut self,
        request: &ControlRequest<'_>,
        values: &[ParamValue],
        on_change: ChangeHandler,
    ) -> Control {
        let slider = RangeSlider::index_slider(request.name, values.len());
        let label = Label::new("");
        let bounds = slider.bounds();
        let readout = {
            let values = values.to_vec();
            let format = request.spec.format.clone();
            dlink(&slider, &label, move |(lo, hi)| {
                let lo = values.get(bounds.index_of(*lo));
                let hi = values.get(bounds.index_of(*hi));
                match (lo, hi) {
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
        self.push_row(
            request.name,
            vec![
                PanelItem::Widget(Widget::RangeSlider(Rc::clone(&slider))),
                PanelItem::Readout(Rc::clone(&label)),
            ],
        );
        Control::new(
            request.name,
            request.spec.clone(),
            Widget::RangeSlider(slider),
            connection,
        )
        .indexed()
        .with_readout(label, readout)
    }

    fn selector(
        &mut self,
        request: &ControlRequest<'_>,
        options: &[ParamValue],
        on_change: ChangeHandler,
    ) -> ControlsResult<Control> {
        let selector = Selector::for_options(request.name, options.to_vec())?;
        let connection = selector.on_change(move |index| on_change(ChangePayload::Index(*index)));
        self.push_row(
            request.name,
            vec![PanelItem::Widget(Widget::Selector(Rc::clone(&selector)))],
        );
        Ok(Control::new(
            request.name,
            request.spec.clone(),
            Widget::Selector(selector),
            connection,
        )
        .indexed())
    }

    fn push_row(&mut self, name: &str, items: Vec<PanelItem>) {
        self.panel.rows.push(PanelRow {
            name: name.to_owned(),
            items,
        });
    }
}

impl WidgetBackend for NotebookBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Notebook
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
                self.push_row(request.name, vec![PanelItem::Widget(widget.clone())]);
                Control::new(request.name, spec.clone(), widget.clone(), connection)
            }
            Domain::Continuous { samples, .. } => self.index_slider(request, samples, on_change),
            Domain::Index(values) => self.index_slider(request, values, on_change),
            Domain::Range(values) => self.range_slider(request, values, on_change),
            Domain::Categorical(options) => self.selector(request, options, on_change)?,
        };
        debug!(
            name = request.name,
            kind = ?spec.kind(),
            rows = self.panel.rows.len(),
            "built notebook control"
        );
        Ok(BuiltControl::live(spec, control))
    }

    fn present(&self, sink: &mut dyn DisplaySink) {
        if !self.panel.is_empty() {
            sink.show_panel(&self.panel);
        }
    }
}

fn describe(format: &SliderFormat, values: &[ParamValue], index: usize) -> String {
    values
        .get(index)
        .map_or_else(String::new, |value| format.format(value))
}

#[allow(clippy::cast_precision_loss)]
fn index_to_position(index: usize) -> f64 {
    index as f64
}

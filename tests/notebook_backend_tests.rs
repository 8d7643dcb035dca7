use plot_controls::api::{DisplaySink, PlayButtons};
use plot_controls::backend::{ControlFigure, NotebookPanel, PanelItem};
use plot_controls::widgets::{
    PlayButtonPosition, SelectorStyle, SliderBounds, SliderFormat, SliderFormats, Widget,
};
use plot_controls::{AddOptions, BackendKind, Controls, ControlsConfig, ParamValue, RawParam};

#[derive(Default)]
struct PanelRecorder {
    panels: Vec<NotebookPanel>,
    figures: usize,
}

impl DisplaySink for PanelRecorder {
    fn show_panel(&mut self, panel: &NotebookPanel) {
        self.panels.push(panel.clone());
    }

    fn show_figure(&mut self, _figure: &ControlFigure) {
        self.figures += 1;
    }
}

fn notebook() -> Controls {
    Controls::new(ControlsConfig::new(BackendKind::Notebook)).expect("controls init")
}

fn readout(controls: &Controls, name: &str) -> String {
    controls
        .with_control(name, |control| control.readout().map(|label| label.text()))
        .flatten()
        .expect("readout label")
}

fn item_kind(item: &PanelItem) -> &'static str {
    match item {
        PanelItem::Widget(widget) => widget.type_name(),
        PanelItem::Readout(_) => "Readout",
        PanelItem::Play(_) => "Play",
    }
}

#[test]
fn index_slider_readout_follows_the_value() {
    let controls = notebook();
    controls
        .add_params(
            [("x", RawParam::linspace(0.0, 1.0, 5))],
            &AddOptions::default(),
        )
        .expect("add params");
    assert_eq!(readout(&controls, "x"), "0.00");
    assert_eq!(
        controls.control_bounds("x").expect("bounds"),
        SliderBounds::new(0.0, 4.0, Some(1.0))
    );

    controls.set_index("x", 2).expect("set index");
    assert_eq!(readout(&controls, "x"), "0.50");
}

#[test]
fn continuous_params_become_index_sliders_over_samples() {
    let controls = Controls::new(ControlsConfig::default().with_continuous_steps(11))
        .expect("controls init");
    controls
        .add_params([("x", RawParam::between(0.0, 1.0))], &AddOptions::default())
        .expect("add params");
    assert!(controls
        .with_control("x", |control| control.is_indexed())
        .unwrap_or(false));
    assert_eq!(
        controls.control_bounds("x").expect("bounds"),
        SliderBounds::new(0.0, 10.0, Some(1.0))
    );

    controls.set_index("x", 10).expect("set index");
    assert_eq!(controls.param("x"), Some(ParamValue::Number(1.0)));
}

#[test]
fn per_parameter_formats_override_the_default_precision() {
    let controls = Controls::new(ControlsConfig::default().with_slider_precision(1))
        .expect("controls init");
    let formats = SliderFormats::default().with("n", SliderFormat::Integer);
    controls
        .add_params(
            [
                ("n", RawParam::linspace(0.0, 10.0, 3)),
                ("x", RawParam::linspace(0.0, 1.0, 3)),
            ],
            &AddOptions::new().with_slider_formats(formats),
        )
        .expect("add params");

    controls.set_index("n", 1).expect("move n");
    controls.set_index("x", 1).expect("move x");
    assert_eq!(readout(&controls, "n"), "5");
    assert_eq!(readout(&controls, "x"), "0.5");
}

#[test]
fn batch_default_format_applies_to_every_parameter_of_the_call() {
    let controls = notebook();
    controls
        .add_params(
            [
                ("n", RawParam::linspace(1.0, 3.0, 3)),
                ("m", RawParam::linspace(0.0, 10.0, 3)),
            ],
            &AddOptions::new().with_slider_formats(
                SliderFormats::new(SliderFormat::Integer).with("m", SliderFormat::Precision(1)),
            ),
        )
        .expect("add params");
    assert_eq!(readout(&controls, "n"), "1");
    assert_eq!(readout(&controls, "m"), "0.0");

    controls
        .add_params([("x", RawParam::linspace(0.0, 1.0, 3))], &AddOptions::default())
        .expect("add params");
    assert_eq!(readout(&controls, "x"), "0.00");
}

#[test]
fn failed_batch_leaves_later_formats_untouched() {
    let controls = notebook();
    controls
        .add_params([("x", RawParam::linspace(0.0, 1.0, 3))], &AddOptions::default())
        .expect("add params");
    controls
        .add_params(
            [
                ("y", RawParam::linspace(0.0, 1.0, 3)),
                ("x", RawParam::linspace(0.0, 1.0, 3)),
            ],
            &AddOptions::new()
                .with_slider_formats(SliderFormats::default().with("y", SliderFormat::Integer)),
        )
        .expect_err("duplicate x");
    assert!(!controls.contains("y"));

    controls
        .add_params([("y", RawParam::linspace(0.0, 1.0, 3))], &AddOptions::default())
        .expect("add params");
    assert_eq!(readout(&controls, "y"), "0.00");
}

#[test]
fn range_slider_readout_shows_both_ends() {
    let controls = notebook();
    controls
        .add_params(
            [("window", RawParam::range(0.0, 1.0, Some(5)))],
            &AddOptions::default(),
        )
        .expect("add params");
    assert_eq!(readout(&controls, "window"), "0.00 - 1.00");

    controls.set_range("window", 1, 3).expect("set range");
    assert_eq!(readout(&controls, "window"), "0.25 - 0.75");
}

#[test]
fn play_button_drives_its_slider() {
    let controls = notebook();
    controls
        .add_params(
            [
                ("t", RawParam::linspace(0.0, 3.0, 4)),
                ("mode", RawParam::options(["a", "b"])),
            ],
            &AddOptions::new().with_play_buttons(PlayButtons::All),
        )
        .expect("add params");
    assert!(controls
        .with_control("mode", |control| control.play().is_none())
        .unwrap_or(false));

    let play = controls
        .with_control("t", |control| control.play().cloned())
        .flatten()
        .expect("play widget");
    assert_eq!(play.range(), (0, 3, 1));
    assert_eq!(play.interval_ms(), 100);

    play.set_value(2);
    assert_eq!(controls.param("t"), Some(ParamValue::Number(2.0)));
    while play.step_forward() {}
    assert_eq!(controls.param("t"), Some(ParamValue::Number(3.0)));

    controls.set_index("t", 1).expect("set index");
    assert_eq!(play.value(), 1);
}

#[test]
fn widgets_can_be_moved_from_inside_with_control() {
    let controls = notebook();
    controls
        .add_params(
            [("t", RawParam::linspace(0.0, 3.0, 4))],
            &AddOptions::new().with_play_buttons(PlayButtons::All),
        )
        .expect("add params");

    let stepped = controls
        .with_control("t", |control| control.play().map(|play| play.step_forward()))
        .flatten();
    assert_eq!(stepped, Some(true));
    assert_eq!(controls.param("t"), Some(ParamValue::Number(1.0)));
}

#[test]
fn play_button_position_orders_the_row() {
    let controls = notebook();
    controls
        .add_params(
            [
                ("lead", RawParam::linspace(0.0, 1.0, 3)),
                ("trail", RawParam::linspace(0.0, 1.0, 3)),
            ],
            &AddOptions::new()
                .with_play_buttons(PlayButtons::Only(vec!["lead".to_owned()]))
                .with_play_position(PlayButtonPosition::Leading),
        )
        .expect("add params");

    let mut recorder = PanelRecorder::default();
    controls.display(&mut recorder);
    assert_eq!(recorder.panels.len(), 1);
    assert_eq!(recorder.figures, 0);
    let panel = &recorder.panels[0];
    let kinds = |name: &str| -> Vec<&'static str> {
        panel
            .row(name)
            .expect("row")
            .items
            .iter()
            .map(item_kind)
            .collect()
    };
    assert_eq!(kinds("lead"), vec!["Play", "Slider", "Readout"]);
    assert_eq!(kinds("trail"), vec!["Slider", "Readout"]);
}

#[test]
fn short_option_lists_render_as_radio_buttons() {
    let controls = notebook();
    controls
        .add_params(
            [
                ("few", RawParam::options(["a", "b", "c"])),
                ("many", RawParam::options(["a", "b", "c", "d"])),
            ],
            &AddOptions::default(),
        )
        .expect("add params");

    let style = |name: &str| match controls.widget(name) {
        Some(Widget::Selector(selector)) => selector.style(),
        other => panic!("expected selector for {name}, got {other:?}"),
    };
    assert_eq!(style("few"), SelectorStyle::Radio);
    assert_eq!(style("many"), SelectorStyle::Dropdown);
}

#[test]
fn fixed_params_add_no_rows() {
    let controls = notebook();
    controls
        .add_params(
            [("k", RawParam::from(1.0)), ("s", RawParam::fixed("label"))],
            &AddOptions::default(),
        )
        .expect("add params");

    let mut recorder = PanelRecorder::default();
    controls.display(&mut recorder);
    assert!(recorder.panels.is_empty());
}

#[test]
fn external_widgets_get_their_own_row() {
    let slider = plot_controls::widgets::Slider::new("ext", 0.0, 1.0, Some(0.5));
    let controls = notebook();
    controls
        .add_params(
            [
                ("x", RawParam::linspace(0.0, 1.0, 3)),
                ("ext", RawParam::widget(slider)),
            ],
            &AddOptions::default(),
        )
        .expect("add params");

    let mut recorder = PanelRecorder::default();
    controls.display(&mut recorder);
    let rows: Vec<&str> = recorder.panels[0]
        .rows
        .iter()
        .map(|row| row.name.as_str())
        .collect();
    assert_eq!(rows, vec!["x", "ext"]);
}

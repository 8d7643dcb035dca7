use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::rc::Rc;

use approx::assert_relative_eq;
use image::Rgba;
use plot_controls::api::{FrameCollector, FrameSink, GifFrameSink, frame_positions};
use plot_controls::figure::NullFigure;
use plot_controls::widgets::SliderBounds;
use plot_controls::{
    AddOptions, AnimationOptions, BackendKind, Controls, ControlsConfig, ControlsError,
    FigureHandle, ParamMap, ParamValue, RawParam,
};

fn controls(backend: BackendKind, params: Vec<(&str, RawParam)>) -> Controls {
    let controls = Controls::new(ControlsConfig::new(backend)).expect("controls init");
    controls
        .add_params(params, &AddOptions::default())
        .expect("add params");
    controls
}

#[test]
fn stepped_sliders_export_one_frame_per_step() {
    let controls = controls(
        BackendKind::Notebook,
        vec![("x", RawParam::linspace(0.0, 1.0, 5))],
    );
    let figure = NullFigure::new(16, 8);
    let handle: FigureHandle = figure.clone();
    let seen = Rc::new(RefCell::new(Vec::<f64>::new()));
    let recorder = Rc::clone(&seen);
    controls
        .register_update(
            move |args| {
                recorder
                    .borrow_mut()
                    .push(args.params["x"].as_f64().unwrap_or_default());
            },
            Some(&handle),
            None,
        )
        .expect("register update");

    let mut sink = FrameCollector::default();
    let frames = controls
        .animate(&*figure, "x", AnimationOptions::default(), &mut sink)
        .expect("animate");

    assert_eq!(frames, 5);
    assert_eq!(sink.frames.len(), 5);
    assert!(sink.frames.iter().all(|(frame, delay)| {
        frame.dimensions() == (16, 8) && *delay == 20
    }));
    assert_eq!(seen.borrow().as_slice(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    assert_eq!(controls.param("x"), Some(ParamValue::Number(1.0)));
}

#[test]
fn free_sliders_export_a_synthesized_sweep() {
    let controls = controls(BackendKind::Native, vec![("x", RawParam::between(0.0, 2.0))]);
    let figure = NullFigure::new(4, 4);
    let last = Rc::new(RefCell::new(None::<ParamMap>));
    let recorder = Rc::clone(&last);
    controls
        .register_callback(
            move |params: &ParamMap| {
                recorder.replace(Some(params.clone()));
            },
            None,
            false,
        )
        .expect("register callback");

    let mut sink = FrameCollector::default();
    let options = AnimationOptions::default()
        .with_frame_count(7)
        .with_interval_ms(40);
    let frames = controls
        .animate(&*figure, "x", options, &mut sink)
        .expect("animate");

    assert_eq!(frames, 7);
    assert!(sink.frames.iter().all(|(_, delay)| *delay == 40));
    let last = last.borrow().clone().expect("callback ran");
    assert_eq!(last["x"], ParamValue::Number(2.0));
}

#[test]
fn every_frame_runs_one_cascade() {
    let controls = controls(
        BackendKind::Native,
        vec![
            ("x", RawParam::linspace(0.0, 4.0, 5)),
            ("t", RawParam::between(0.0, 1.0)),
        ],
    );
    let figure = NullFigure::new(2, 2);
    let handle: FigureHandle = figure.clone();
    let cascades = Rc::new(RefCell::new(Vec::<String>::new()));
    for name in ["x", "t"] {
        let recorder = Rc::clone(&cascades);
        controls
            .register_update(
                move |_| recorder.borrow_mut().push(name.to_owned()),
                Some(&handle),
                Some(&[name]),
            )
            .expect("register update");
    }

    let mut sink = FrameCollector::default();
    let frames = controls
        .animate(&*figure, "x", AnimationOptions::default(), &mut sink)
        .expect("animate x");
    assert_eq!(frames, 5);
    assert_eq!(cascades.borrow().len(), 5);

    cascades.borrow_mut().clear();
    let frames = controls
        .animate(
            &*figure,
            "t",
            AnimationOptions::default().with_frame_count(3),
            &mut sink,
        )
        .expect("animate t");
    assert_eq!(frames, 3);
    assert_eq!(cascades.borrow().as_slice(), &["t", "t", "t"]);
}

#[test]
fn frames_capture_the_current_figure_pixels() {
    let controls = controls(
        BackendKind::Notebook,
        vec![("x", RawParam::linspace(0.0, 1.0, 2))],
    );
    let figure = NullFigure::new(2, 2);
    figure.set_fill(Rgba([10, 20, 30, 255]));
    let mut sink = FrameCollector::default();
    controls
        .animate(&*figure, "x", AnimationOptions::default(), &mut sink)
        .expect("animate");
    assert_eq!(sink.frames[0].0.get_pixel(1, 1), &Rgba([10, 20, 30, 255]));
}

#[test]
fn only_sliders_can_be_animated() {
    let controls = controls(
        BackendKind::Notebook,
        vec![
            ("mode", RawParam::options(["a", "b"])),
            ("window", RawParam::range(0.0, 1.0, Some(3))),
            ("k", RawParam::from(1.0)),
        ],
    );
    let figure = NullFigure::new(2, 2);
    let mut sink = FrameCollector::default();

    let err = controls
        .animate(&*figure, "mode", AnimationOptions::default(), &mut sink)
        .expect_err("selector");
    assert!(matches!(
        err,
        ControlsError::UnsupportedWidgetType { widget: "Selector", .. }
    ));
    let err = controls
        .animate(&*figure, "window", AnimationOptions::default(), &mut sink)
        .expect_err("range slider");
    assert!(matches!(
        err,
        ControlsError::UnsupportedWidgetType { widget: "RangeSlider", .. }
    ));
    let err = controls
        .animate(&*figure, "k", AnimationOptions::default(), &mut sink)
        .expect_err("fixed");
    assert!(matches!(err, ControlsError::NoControl(_)));
    assert!(sink.frames.is_empty());
}

#[test]
fn animations_save_as_gif() {
    let controls = controls(
        BackendKind::Notebook,
        vec![("x", RawParam::linspace(0.0, 1.0, 3))],
    );
    let figure = NullFigure::new(8, 8);
    let path = std::env::temp_dir().join(format!(
        "plot-controls-animation-{}.gif",
        std::process::id()
    ));

    let frames = controls
        .save_animation(&path, &*figure, "x", AnimationOptions::default())
        .expect("save animation");
    assert_eq!(frames, 3);

    let bytes = fs::read(&path).expect("read gif");
    fs::remove_file(&path).expect("remove gif");
    assert!(bytes.starts_with(b"GIF89a"));
}

struct RejectingWriter;

impl Write for RejectingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn gif_write_failures_are_reported() {
    let controls = controls(
        BackendKind::Notebook,
        vec![("x", RawParam::linspace(0.0, 1.0, 3))],
    );
    let figure = NullFigure::new(4, 4);
    let mut sink = GifFrameSink::new(RejectingWriter, true).expect("gif sink");

    let err = controls
        .animate(&*figure, "x", AnimationOptions::default(), &mut sink)
        .expect_err("writer rejects bytes");
    assert!(matches!(err, ControlsError::Export(_)));
    assert!(err.to_string().contains("disk full"));
    assert_eq!(sink.frame_count(), 3);
}

#[test]
fn gif_sink_writes_a_complete_file_on_finish() {
    let mut sink = GifFrameSink::new(Vec::new(), false).expect("gif sink");
    let frame = image::RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 255]));
    sink.push_frame(frame.clone(), 20).expect("first frame");
    sink.push_frame(frame, 20).expect("second frame");
    sink.finish().expect("finish");
    sink.finish().expect("finish twice");

    let bytes = sink.into_inner();
    assert!(bytes.starts_with(b"GIF89a"));
    assert_eq!(bytes.last(), Some(&0x3B));
}

#[test]
fn frame_positions_follow_the_slider_step() {
    let stepped = frame_positions(SliderBounds::new(0.0, 1.0, Some(0.25)), 100);
    assert_eq!(stepped.len(), 5);
    assert_relative_eq!(stepped[4], 1.0);

    let uneven = frame_positions(SliderBounds::new(0.0, 1.0, Some(0.3)), 100);
    assert_eq!(uneven.len(), 4);

    let free = frame_positions(SliderBounds::new(-1.0, 1.0, None), 3);
    assert_eq!(free, vec![-1.0, 0.0, 1.0]);
}

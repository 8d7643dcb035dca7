use approx::assert_relative_eq;
use plot_controls::core::{Domain, ParameterKind, RawParam, Resolver, TupleItem, linspace, resolve};
use plot_controls::widgets::{Slider, SliderFormat, ValueWidget};
use plot_controls::{ControlsError, ParamValue};

fn numbers(values: &[ParamValue]) -> Vec<f64> {
    values
        .iter()
        .map(|value| value.as_f64().expect("numeric value"))
        .collect()
}

#[test]
fn count_tuple_becomes_index_slider_over_linspace() {
    let spec = resolve("x", &RawParam::linspace(0.0, 10.0, 5)).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::IndexSlider);
    assert_eq!(
        numbers(spec.values().expect("values")),
        vec![0.0, 2.5, 5.0, 7.5, 10.0]
    );
    assert_eq!(spec.initial_value(), ParamValue::Number(0.0));
}

#[test]
fn two_number_tuple_becomes_continuous_slider() {
    let spec = resolve("x", &RawParam::between(-1.0, 3.0)).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::ContinuousSlider);
    let Domain::Continuous { min, max, samples } = &spec.domain else {
        panic!("expected continuous domain, got {:?}", spec.domain);
    };
    assert_relative_eq!(*min, -1.0);
    assert_relative_eq!(*max, 3.0);
    assert_eq!(samples.len(), 50);
    assert_eq!(samples.last(), Some(&ParamValue::Number(3.0)));
}

#[test]
fn continuous_sample_count_follows_resolver_settings() {
    let resolver = Resolver {
        continuous_steps: 11,
        ..Resolver::default()
    };
    let spec = resolver
        .resolve("x", &RawParam::between(0.0, 1.0))
        .expect("resolve");
    assert_eq!(spec.values().map(<[_]>::len), Some(11));

    let degenerate = Resolver {
        continuous_steps: 0,
        ..Resolver::default()
    };
    let spec = degenerate
        .resolve("x", &RawParam::between(0.0, 1.0))
        .expect("resolve");
    assert_eq!(spec.values().map(<[_]>::len), Some(2));
}

#[test]
fn range_without_count_follows_resolver_settings() {
    let resolver = Resolver {
        continuous_steps: 7,
        ..Resolver::default()
    };
    let spec = resolver
        .resolve("window", &RawParam::range(0.0, 1.0, None))
        .expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::RangeSlider);
    assert_eq!(spec.values().map(<[_]>::len), Some(7));

    let degenerate = Resolver {
        continuous_steps: 1,
        ..Resolver::default()
    };
    let spec = degenerate
        .resolve("window", &RawParam::range(0.0, 1.0, None))
        .expect("resolve");
    assert_eq!(numbers(spec.values().expect("values")), vec![0.0, 1.0]);
}

#[test]
fn scalars_and_fixed_values_never_get_controls() {
    let scalar = resolve("k", &RawParam::from(3.0)).expect("scalar");
    assert_eq!(scalar.kind(), ParameterKind::Fixed);
    assert!(!scalar.needs_control());
    assert_eq!(scalar.initial_value(), ParamValue::Number(3.0));

    let fixed = resolve("label", &RawParam::fixed("hello")).expect("fixed");
    assert_eq!(fixed.kind(), ParameterKind::Fixed);
    assert_eq!(fixed.initial_value(), ParamValue::from("hello"));
}

#[test]
fn single_member_set_is_fixed() {
    let spec = resolve("x", &RawParam::set(["x"])).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::Fixed);
    assert_eq!(spec.initial_value(), ParamValue::from("x"));
}

#[test]
fn multi_member_set_keeps_insertion_order_and_dedups() {
    let spec = resolve("mode", &RawParam::set(["x", "y", "x", "z"])).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::Categorical);
    assert_eq!(
        spec.values().expect("options"),
        &[
            ParamValue::from("x"),
            ParamValue::from("y"),
            ParamValue::from("z"),
        ]
    );
}

#[test]
fn ordered_options_become_categorical() {
    let spec = resolve("mode", &RawParam::options(["linear", "log"])).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::Categorical);
    assert_eq!(spec.initial_value(), ParamValue::from("linear"));

    let single = resolve("mode", &RawParam::options(["only"])).expect("resolve");
    assert_eq!(single.kind(), ParameterKind::Fixed);

    let err = resolve("mode", &RawParam::Options(Vec::new())).expect_err("empty options");
    assert!(matches!(err, ControlsError::InvalidSpec { .. }));
}

#[test]
fn one_element_array_is_fixed() {
    let spec = resolve("x", &RawParam::values([5.0])).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::Fixed);
    assert_eq!(spec.initial_value(), ParamValue::Number(5.0));
}

#[test]
fn zero_dimensional_array_is_fixed() {
    let spec = resolve("x", &RawParam::array(vec![ParamValue::Number(7.0)], Vec::new()))
        .expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::Fixed);
    assert_eq!(spec.initial_value(), ParamValue::Number(7.0));
}

#[test]
fn one_dimensional_array_becomes_index_slider() {
    let spec = resolve("x", &RawParam::values([0.0, 2.0, 4.0])).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::IndexSlider);
    assert_eq!(numbers(spec.values().expect("values")), vec![0.0, 2.0, 4.0]);
}

#[test]
fn two_dimensional_array_is_rejected() {
    let values = [1.0, 2.0, 3.0, 4.0].map(ParamValue::Number).to_vec();
    let err = resolve("x", &RawParam::array(values, vec![2, 2])).expect_err("2D");
    assert!(matches!(err, ControlsError::Dimensionality { ndim: 2, .. }));
    assert_eq!(err.to_string(), "x is 2D but can only be 1D or a scalar");
}

#[test]
fn array_shape_must_match_its_values() {
    let values = [1.0, 2.0, 3.0].map(ParamValue::Number).to_vec();
    let err = resolve("x", &RawParam::array(values, vec![2, 2])).expect_err("bad shape");
    assert!(matches!(err, ControlsError::InvalidSpec { .. }));
}

#[test]
fn range_token_builds_range_slider() {
    let spec = resolve("window", &RawParam::range(0.0, 1.0, Some(5))).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::RangeSlider);
    assert_eq!(
        numbers(spec.values().expect("values")),
        vec![0.0, 0.25, 0.5, 0.75, 1.0]
    );
    assert_eq!(
        spec.initial_value(),
        ParamValue::pair(ParamValue::Number(0.0), ParamValue::Number(1.0))
    );
    assert_eq!(spec.initial_index().pair(), Some((0, 4)));
}

#[test]
fn range_over_explicit_sequence_keeps_its_values() {
    let spec = resolve("window", &RawParam::range_over(["lo", "mid", "hi"])).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::RangeSlider);
    assert_eq!(spec.values().map(<[_]>::len), Some(3));
}

#[test]
fn range_token_is_forgiving_about_spelling() {
    for token in ["r", "R", "range", "Range", "rnage", "rang", "ranges"] {
        let raw = RawParam::Tuple(vec![
            TupleItem::from(token),
            TupleItem::from(0.0),
            TupleItem::from(1.0),
            TupleItem::from(3.0),
        ]);
        let spec = resolve("x", &raw).unwrap_or_else(|err| panic!("{token}: {err}"));
        assert_eq!(spec.kind(), ParameterKind::RangeSlider, "{token}");
    }
}

#[test]
fn unrecognized_range_token_is_an_error() {
    let raw = RawParam::Tuple(vec![
        TupleItem::from("bogus"),
        TupleItem::from(0.0),
        TupleItem::from(1.0),
    ]);
    let err = resolve("x", &raw).expect_err("bad token");
    assert!(matches!(
        err,
        ControlsError::UnrecognizedRangeToken { ref token, .. } if token == "bogus"
    ));
}

#[test]
fn range_needs_two_values() {
    let err = resolve("x", &RawParam::range_over([1.0])).expect_err("one value");
    assert!(matches!(err, ControlsError::InvalidSpec { .. }));
}

#[test]
fn fractional_sample_count_is_rejected() {
    let raw = RawParam::Tuple(vec![
        TupleItem::from(0.0),
        TupleItem::from(1.0),
        TupleItem::from(2.5),
    ]);
    let err = resolve("x", &raw).expect_err("fractional count");
    assert!(matches!(err, ControlsError::InvalidSpec { .. }));
}

#[test]
fn prebuilt_widget_is_passed_through() {
    let slider = Slider::new("external", 0.0, 1.0, Some(0.1));
    let spec = resolve("x", &RawParam::widget(slider)).expect("resolve");
    assert_eq!(spec.kind(), ParameterKind::ExternalWidget);
    assert!(spec.values().is_none());

    let value = ValueWidget::new("text", "hello");
    let spec = resolve("t", &RawParam::widget(value)).expect("resolve");
    assert_eq!(spec.initial_value(), ParamValue::from("hello"));
}

#[test]
fn resolver_format_is_attached_to_the_parameter() {
    let resolver = Resolver::default().with_format(SliderFormat::Integer);
    let spec = resolver
        .resolve("n", &RawParam::linspace(0.0, 4.0, 5))
        .expect("resolve");
    assert_eq!(spec.format, SliderFormat::Integer);
    assert_eq!(spec.format.format(&ParamValue::Number(2.0)), "2");
}

#[test]
fn linspace_includes_both_ends() {
    assert!(linspace(0.0, 1.0, 0).is_empty());
    assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
    let values = linspace(0.0, 1.0, 3);
    assert_relative_eq!(values[1], 0.5);
    assert_eq!(values[2], 1.0);
}

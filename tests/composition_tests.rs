use std::cell::Cell;
use std::rc::Rc;

use plot_controls::api::NullDisplay;
use plot_controls::{
    ComposeRequest, Controls, ControlsConfig, ControlsContext, ControlsError, ParamValue, RawParam,
};

fn shared_registry() -> Controls {
    Controls::with_params(
        ControlsConfig::default(),
        [
            ("a", RawParam::linspace(0.0, 1.0, 3)),
            ("b", RawParam::options(["x", "y"])),
        ],
    )
    .expect("controls init")
}

#[test]
fn composing_without_references_creates_and_displays_a_registry() {
    let mut display = NullDisplay::default();
    let composition = ComposeRequest::new([
        ("a", RawParam::linspace(0.0, 1.0, 3)),
        ("k", RawParam::from(2.0)),
    ])
    .display_with(&mut display)
    .compose()
    .expect("compose");

    assert_eq!(composition.params, vec!["a", "k"]);
    assert_eq!(composition.controls.control_names(), vec!["a"]);
    assert_eq!(display.panels_shown, 1);
    assert_eq!(display.last_rows, vec!["a"]);
}

#[test]
fn sliced_reference_merges_with_new_params() {
    let controls = shared_registry();
    let composition = ComposeRequest::new([("c", RawParam::linspace(0.0, 10.0, 11))])
        .with_controls(controls.slice(&["a"]).expect("slice"))
        .compose()
        .expect("compose");

    assert!(composition.controls.ptr_eq(&controls));
    assert_eq!(composition.params, vec!["c", "a"]);
    assert!(controls.contains("c"));

    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    composition
        .register_update(
            move |args| {
                assert!(args.params.contains_key("a"));
                assert!(args.params.contains_key("c"));
                assert!(!args.params.contains_key("b"));
                counter.set(counter.get() + 1);
            },
            None,
        )
        .expect("register update");

    controls.set_index("b", 1).expect("move b");
    assert_eq!(calls.get(), 0);
    controls.set_index("a", 1).expect("move a");
    controls.set_index("c", 4).expect("move c");
    assert_eq!(calls.get(), 2);
    assert_eq!(controls.param("c"), Some(ParamValue::Number(4.0)));
}

#[test]
fn full_reference_sees_params_added_after_it_was_taken() {
    let controls = shared_registry();
    let reference = controls.all();
    controls
        .add_params(
            [("late", RawParam::linspace(0.0, 1.0, 2))],
            &Default::default(),
        )
        .expect("add late");
    assert_eq!(reference.names(), vec!["a", "b", "late"]);
}

#[test]
fn slicing_unknown_names_fails() {
    let controls = shared_registry();
    let err = controls.slice(&["a", "missing"]).expect_err("unknown");
    assert!(matches!(err, ControlsError::UnknownParameter(ref name) if name == "missing"));
}

#[test]
fn referencing_two_registries_is_ambiguous() {
    let first = shared_registry();
    let second = shared_registry();
    let err = ComposeRequest::new(Vec::<(String, RawParam)>::new())
        .with_controls(first.all())
        .with_controls(second.slice(&["a"]).expect("slice"))
        .compose()
        .expect_err("ambiguous");
    assert!(matches!(err, ControlsError::AmbiguousControls { count: 2 }));
}

#[test]
fn repeated_references_to_one_registry_are_merged() {
    let controls = shared_registry();
    let composition = ComposeRequest::new(Vec::<(String, RawParam)>::new())
        .with_controls(controls.slice(&["a"]).expect("slice a"))
        .with_controls(controls.slice(&["b", "a"]).expect("slice b"))
        .compose()
        .expect("compose");
    assert_eq!(composition.params, vec!["a", "b"]);
}

#[test]
fn context_supplies_the_current_registry() {
    let context = ControlsContext::new();
    let controls = shared_registry();
    {
        let guard = context.enter(&controls);
        assert_eq!(context.depth(), 1);
        assert!(guard.controls().is_some_and(|current| current.ptr_eq(&controls)));

        let composition = ComposeRequest::new([("d", RawParam::linspace(0.0, 1.0, 5))])
            .within(&context)
            .compose()
            .expect("compose");
        assert!(composition.controls.ptr_eq(&controls));
        assert_eq!(composition.params, vec!["d", "a", "b"]);
    }
    assert_eq!(context.depth(), 0);
    assert!(context.current().is_none());
}

#[test]
fn nested_contexts_use_the_innermost_registry() {
    let context = ControlsContext::new();
    let outer = shared_registry();
    let inner = shared_registry();

    let _outer_guard = context.enter(&outer);
    {
        let _inner_guard = context.enter(&inner);
        assert_eq!(context.depth(), 2);
        let composition = ComposeRequest::new([("e", RawParam::from(1.0))])
            .within(&context)
            .compose()
            .expect("compose");
        assert!(composition.controls.ptr_eq(&inner));
        assert!(!outer.contains("e"));
    }
    assert_eq!(context.depth(), 1);
    let current = context.current().expect("outer entry");
    assert!(current.controls().ptr_eq(&outer));
}

#[test]
fn context_and_explicit_reference_must_agree() {
    let context = ControlsContext::new();
    let in_context = shared_registry();
    let other = shared_registry();
    let _guard = context.enter(&in_context);

    let err = ComposeRequest::new(Vec::<(String, RawParam)>::new())
        .with_controls(other.all())
        .within(&context)
        .compose()
        .expect_err("ambiguous");
    assert!(matches!(err, ControlsError::AmbiguousControls { count: 2 }));

    let composition = ComposeRequest::new(Vec::<(String, RawParam)>::new())
        .with_controls(in_context.slice(&["b"]).expect("slice"))
        .within(&context)
        .compose()
        .expect("same registry");
    assert!(composition.controls.ptr_eq(&in_context));
}

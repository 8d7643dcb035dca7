//! plot-controls: parameter-to-widget bindings for interactive plots.
//!
//! Plotting calls hand named parameters to a [`Controls`] registry. Each raw
//! parameter is classified into a [`ParameterSpec`], turned into a live widget
//! by the active [`WidgetBackend`], and every change of that widget runs the
//! registry's update cascade: redraw callbacks first, then user callbacks,
//! then one redraw request per affected figure.

pub mod api;
pub mod backend;
pub mod core;
pub mod error;
pub mod figure;
pub mod telemetry;
pub mod widgets;

pub use api::{
    AddOptions, AnimationOptions, ComposeRequest, Composition, Controls, ControlsConfig,
    ControlsContext, ControlsRef, DisplaySink, Evaluable, ParamFn, PlayButtons, UpdateArgs,
    UpdateCache,
};
pub use backend::{BackendKind, ChangePayload, Control, WidgetBackend};
pub use crate::core::{
    ControlIndex, ParamMap, ParamValue, ParameterKind, ParameterSpec, RawParam, resolve,
};
pub use error::{ControlsError, ControlsResult};
pub use figure::{Figure, FigureHandle, FigureId};

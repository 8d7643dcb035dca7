//! Public registry API: the controls registry, its update cascade, sharing
//! between plotting calls, display and animation export.

mod animation;
mod cache;
mod cascade;
mod compose;
mod config;
mod controls;
mod display;
mod snapshot;

pub use animation::{AnimationOptions, FrameCollector, FrameSink, GifFrameSink, frame_positions};
pub use cache::{CacheKey, Evaluable, ParamFn, UpdateCache};
pub use cascade::CascadeReport;
pub use compose::{ComposeRequest, Composition, ContextGuard, ControlsContext, ControlsRef};
pub use config::{AnimationDefaults, ControlsConfig, NativeLayoutConfig};
pub use controls::{
    AddOptions, Controls, PlayButtons, RegistrationId, UpdateArgs, UpdateFn, UserCallback, VMAX,
    VMIN, VMIN_VMAX,
};
pub use display::{DisplaySink, NullDisplay};
pub use snapshot::ControlsSnapshot;

use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::core::DEFAULT_CONTINUOUS_STEPS;
use crate::error::{ControlsError, ControlsResult};
use crate::widgets::{PlayButtonPosition, SliderFormat};

/// Sizes used to lay out native control figures.
///
/// Heights, gap and margin are inches; `widget_left`, `slider_width` and
/// `play_width` are fractions of the figure width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NativeLayoutConfig {
    #[serde(default = "default_figure_width_in")]
    pub figure_width_in: f64,
    #[serde(default = "default_slider_height_in")]
    pub slider_height_in: f64,
    #[serde(default = "default_option_height_in")]
    pub option_height_in: f64,
    #[serde(default = "default_gap_in")]
    pub gap_in: f64,
    #[serde(default = "default_margin_in")]
    pub margin_in: f64,
    #[serde(default = "default_widget_left")]
    pub widget_left: f64,
    #[serde(default = "default_slider_width")]
    pub slider_width: f64,
    #[serde(default = "default_play_width")]
    pub play_width: f64,
}

impl Default for NativeLayoutConfig {
    fn default() -> Self {
        Self {
            figure_width_in: default_figure_width_in(),
            slider_height_in: default_slider_height_in(),
            option_height_in: default_option_height_in(),
            gap_in: default_gap_in(),
            margin_in: default_margin_in(),
            widget_left: default_widget_left(),
            slider_width: default_slider_width(),
            play_width: default_play_width(),
        }
    }
}

/// Defaults for animation export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDefaults {
    #[serde(default = "default_frame_interval_ms")]
    pub interval_ms: u32,
    /// Frames of a sweep over a slider that has no natural step.
    #[serde(default = "default_synthesized_frames")]
    pub synthesized_frames: usize,
}

impl Default for AnimationDefaults {
    fn default() -> Self {
        Self {
            interval_ms: default_frame_interval_ms(),
            synthesized_frames: default_synthesized_frames(),
        }
    }
}

/// Registry bootstrap configuration.
///
/// Serializable so hosts can keep their widget setup next to the rest of
/// their plotting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlsConfig {
    #[serde(default)]
    pub backend: BackendKind,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
    #[serde(default)]
    pub play_button_position: PlayButtonPosition,
    #[serde(default = "default_play_interval_ms")]
    pub play_interval_ms: u32,
    #[serde(default = "default_slider_precision")]
    pub slider_precision: usize,
    #[serde(default = "default_continuous_steps")]
    pub continuous_steps: usize,
    #[serde(default)]
    pub layout: NativeLayoutConfig,
    #[serde(default)]
    pub animation: AnimationDefaults,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            use_cache: default_use_cache(),
            play_button_position: PlayButtonPosition::default(),
            play_interval_ms: default_play_interval_ms(),
            slider_precision: default_slider_precision(),
            continuous_steps: default_continuous_steps(),
            layout: NativeLayoutConfig::default(),
            animation: AnimationDefaults::default(),
        }
    }
}

impl ControlsConfig {
    #[must_use]
    pub fn new(backend: BackendKind) -> Self {
        Self {
            backend,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    /// Enables or disables the per-event evaluation cache.
    #[must_use]
    pub fn with_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    #[must_use]
    pub fn with_play_button_position(mut self, position: PlayButtonPosition) -> Self {
        self.play_button_position = position;
        self
    }

    #[must_use]
    pub fn with_play_interval_ms(mut self, interval_ms: u32) -> Self {
        self.play_interval_ms = interval_ms;
        self
    }

    /// Sets the decimals of the default slider readout.
    #[must_use]
    pub fn with_slider_precision(mut self, precision: usize) -> Self {
        self.slider_precision = precision;
        self
    }

    /// Sets how many samples a `(start, stop)` tuple is spread over.
    #[must_use]
    pub fn with_continuous_steps(mut self, steps: usize) -> Self {
        self.continuous_steps = steps;
        self
    }

    #[must_use]
    pub fn with_layout(mut self, layout: NativeLayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: AnimationDefaults) -> Self {
        self.animation = animation;
        self
    }

    #[must_use]
    pub fn default_format(&self) -> SliderFormat {
        SliderFormat::Precision(self.slider_precision)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> ControlsResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ControlsError::Config(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> ControlsResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ControlsError::Config(format!("failed to parse config: {e}")))
    }
}

fn default_use_cache() -> bool {
    true
}

fn default_play_interval_ms() -> u32 {
    100
}

fn default_slider_precision() -> usize {
    2
}

fn default_continuous_steps() -> usize {
    DEFAULT_CONTINUOUS_STEPS
}

fn default_figure_width_in() -> f64 {
    6.4
}

fn default_slider_height_in() -> f64 {
    0.15
}

fn default_option_height_in() -> f64 {
    0.2
}

fn default_gap_in() -> f64 {
    0.1
}

fn default_margin_in() -> f64 {
    0.5
}

fn default_widget_left() -> f64 {
    0.2
}

fn default_slider_width() -> f64 {
    0.65
}

fn default_play_width() -> f64 {
    0.1
}

fn default_frame_interval_ms() -> u32 {
    20
}

fn default_synthesized_frames() -> usize {
    200
}

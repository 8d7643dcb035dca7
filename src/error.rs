use thiserror::Error;

pub type ControlsResult<T> = Result<T, ControlsError>;

#[derive(Debug, Error)]
pub enum ControlsError {
    #[error("{name} is {ndim}D but can only be 1D or a scalar")]
    Dimensionality { name: String, ndim: usize },

    #[error("can't overwrite an existing param in the controller: `{name}`")]
    DuplicateParameter { name: String },

    #[error(
        "a single call may only reference one controls registry, but {count} distinct registries were referenced"
    )]
    AmbiguousControls { count: usize },

    #[error("widget backend `{backend}` is unavailable: {capability}")]
    BackendUnavailable {
        backend: &'static str,
        capability: String,
    },

    #[error("control `{name}` is a {widget}, which cannot be stepped this way")]
    UnsupportedWidgetType { name: String, widget: &'static str },

    #[error("unrecognized range token `{token}` for `{name}` (expected \"r\" or \"range\")")]
    UnrecognizedRangeToken { name: String, token: String },

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidSpec { name: String, reason: String },

    #[error("unknown parameter `{0}`")]
    UnknownParameter(String),

    #[error("parameter `{0}` has no live control")]
    NoControl(String),

    #[error("index {index} out of range for `{name}` with {len} values")]
    IndexOutOfRange {
        name: String,
        index: usize,
        len: usize,
    },

    #[error("animation export failed: {0}")]
    Export(String),

    #[error("invalid controls config: {0}")]
    Config(String),
}

impl ControlsError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSpec {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for ControlsError {
    fn from(err: std::io::Error) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<image::ImageError> for ControlsError {
    fn from(err: image::ImageError) -> Self {
        Self::Export(err.to_string())
    }
}

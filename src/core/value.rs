use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Current value of one named parameter.
///
/// Floats compare and hash by total order so values can live in ordered sets
/// (categorical options are deduplicated this way).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
    Pair(Box<ParamValue>, Box<ParamValue>),
}

impl ParamValue {
    #[must_use]
    pub fn pair(first: impl Into<ParamValue>, second: impl Into<ParamValue>) -> Self {
        Self::Pair(Box::new(first.into()), Box::new(second.into()))
    }

    /// Numeric view of the value. Integers and booleans widen to `f64`.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(value) => Some(*value as f64),
            Self::Bool(value) => Some(f64::from(u8::from(*value))),
            Self::Text(_) | Self::Pair(..) => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_pair(&self) -> Option<(&ParamValue, &ParamValue)> {
        match self {
            Self::Pair(first, second) => Some((first, second)),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number(_) | Self::Integer(_))
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Pair(a0, a1), Self::Pair(b0, b1)) => a0 == b0 && a1 == b1,
            _ => false,
        }
    }
}

impl Eq for ParamValue {}

impl Hash for ParamValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(value) => value.hash(state),
            Self::Integer(value) => value.hash(state),
            Self::Number(value) => OrderedFloat(*value).hash(state),
            Self::Text(value) => value.hash(state),
            Self::Pair(first, second) => {
                first.hash(state);
                second.hash(state);
            }
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
            Self::Pair(first, second) => write!(f, "({first}, {second})"),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Position of a control inside its domain.
///
/// Range sliders carry both ends; everything else a single index. Parameters
/// that were never index-driven report `Single(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlIndex {
    Single(usize),
    Pair(usize, usize),
}

impl Default for ControlIndex {
    fn default() -> Self {
        Self::Single(0)
    }
}

impl ControlIndex {
    #[must_use]
    pub fn single(self) -> Option<usize> {
        match self {
            Self::Single(index) => Some(index),
            Self::Pair(..) => None,
        }
    }

    #[must_use]
    pub fn pair(self) -> Option<(usize, usize)> {
        match self {
            Self::Pair(lo, hi) => Some((lo, hi)),
            Self::Single(_) => None,
        }
    }
}

/// Parameter name to current value. Keys are unique; iteration follows
/// insertion.
pub type ParamMap = IndexMap<String, ParamValue>;

/// Parameter name to current control index.
pub type ParamIndices = IndexMap<String, ControlIndex>;

/// Returns `params` minus the names in `excluded`.
///
/// Redraw callbacks use this to keep a parameter that is bound to an artist
/// property (for example `alpha`) out of the arguments of a user function.
#[must_use]
pub fn exclude_params(params: &ParamMap, excluded: &[&str]) -> ParamMap {
    params
        .iter()
        .filter(|(name, _)| !excluded.contains(&name.as_str()))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

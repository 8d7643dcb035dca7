use crate::widgets::Widget;

use super::ParamValue;

/// One element of a tuple-style raw parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum TupleItem {
    Number(f64),
    Text(String),
    Sequence(Vec<ParamValue>),
}

impl From<f64> for TupleItem {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for TupleItem {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Vec<ParamValue>> for TupleItem {
    fn from(values: Vec<ParamValue>) -> Self {
        Self::Sequence(values)
    }
}

/// Member of a legacy set-style categorical input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SetMember {
    Value(ParamValue),
    Tuple(Vec<ParamValue>),
}

impl From<ParamValue> for SetMember {
    fn from(value: ParamValue) -> Self {
        Self::Value(value)
    }
}

impl From<f64> for SetMember {
    fn from(value: f64) -> Self {
        Self::Value(ParamValue::Number(value))
    }
}

impl From<i64> for SetMember {
    fn from(value: i64) -> Self {
        Self::Value(ParamValue::Integer(value))
    }
}

impl From<&str> for SetMember {
    fn from(value: &str) -> Self {
        Self::Value(ParamValue::from(value))
    }
}

/// Untyped parameter as passed by a plotting call, before resolution.
#[derive(Debug, Clone)]
pub enum RawParam {
    /// A scalar. Never gets a control.
    Scalar(ParamValue),
    /// `(start, stop)`, `(start, stop, count)` or `("range", ...)`.
    Tuple(Vec<TupleItem>),
    /// Array-like input with an explicit shape. An empty shape is a 0-D scalar.
    Array {
        values: Vec<ParamValue>,
        shape: Vec<usize>,
    },
    /// Ordered categorical options.
    Options(Vec<ParamValue>),
    /// Set-literal categorical input, kept for callers that relied on it.
    /// Order is the caller's insertion order after deduplication.
    Set(Vec<SetMember>),
    /// A widget the caller already built.
    Widget(Widget),
    /// Constant pass-through that must never become a control.
    Fixed(ParamValue),
}

impl RawParam {
    /// Evenly spaced continuous range `(start, stop)`.
    #[must_use]
    pub fn between(start: f64, stop: f64) -> Self {
        Self::Tuple(vec![TupleItem::Number(start), TupleItem::Number(stop)])
    }

    /// Evenly spaced index range `(start, stop, count)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn linspace(start: f64, stop: f64, count: usize) -> Self {
        Self::Tuple(vec![
            TupleItem::Number(start),
            TupleItem::Number(stop),
            TupleItem::Number(count as f64),
        ])
    }

    /// Two-ended range selector over an evenly spaced sequence.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn range(start: f64, stop: f64, count: Option<usize>) -> Self {
        let mut items = vec![
            TupleItem::Text("range".to_owned()),
            TupleItem::Number(start),
            TupleItem::Number(stop),
        ];
        if let Some(count) = count {
            items.push(TupleItem::Number(count as f64));
        }
        Self::Tuple(items)
    }

    /// Two-ended range selector over an explicit sequence.
    #[must_use]
    pub fn range_over<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::Tuple(vec![
            TupleItem::Text("range".to_owned()),
            TupleItem::Sequence(values.into_iter().map(Into::into).collect()),
        ])
    }

    /// One-dimensional array.
    #[must_use]
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        let values: Vec<ParamValue> = values.into_iter().map(Into::into).collect();
        let shape = vec![values.len()];
        Self::Array { values, shape }
    }

    /// Array with an explicit (possibly multi-dimensional) shape.
    #[must_use]
    pub fn array(values: Vec<ParamValue>, shape: Vec<usize>) -> Self {
        Self::Array { values, shape }
    }

    #[must_use]
    pub fn options<I, V>(options: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<ParamValue>,
    {
        Self::Options(options.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn set<I, V>(members: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SetMember>,
    {
        Self::Set(members.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn fixed(value: impl Into<ParamValue>) -> Self {
        Self::Fixed(value.into())
    }

    #[must_use]
    pub fn widget(widget: impl Into<Widget>) -> Self {
        Self::Widget(widget.into())
    }
}

impl From<f64> for RawParam {
    fn from(value: f64) -> Self {
        Self::Scalar(ParamValue::Number(value))
    }
}

impl From<i64> for RawParam {
    fn from(value: i64) -> Self {
        Self::Scalar(ParamValue::Integer(value))
    }
}

impl From<&str> for RawParam {
    fn from(value: &str) -> Self {
        Self::Scalar(ParamValue::from(value))
    }
}

impl From<(f64, f64)> for RawParam {
    fn from((start, stop): (f64, f64)) -> Self {
        Self::between(start, stop)
    }
}

impl From<(f64, f64, usize)> for RawParam {
    fn from((start, stop, count): (f64, f64, usize)) -> Self {
        Self::linspace(start, stop, count)
    }
}

impl From<Vec<f64>> for RawParam {
    fn from(values: Vec<f64>) -> Self {
        Self::values(values)
    }
}

impl From<Widget> for RawParam {
    fn from(widget: Widget) -> Self {
        Self::Widget(widget)
    }
}

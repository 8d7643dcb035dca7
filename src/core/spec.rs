use indexmap::IndexSet;

use crate::error::{ControlsError, ControlsResult};
use crate::widgets::{SliderFormat, Widget};

use super::{ControlIndex, ParamValue, RawParam, SetMember, TupleItem};

/// Sample count used for a `(start, stop)` tuple when nothing else is configured.
pub const DEFAULT_CONTINUOUS_STEPS: usize = 50;

/// Kind of control a parameter resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ParameterKind {
    Fixed,
    ContinuousSlider,
    IndexSlider,
    RangeSlider,
    Categorical,
    ExternalWidget,
}

/// Resolved domain of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    Fixed(ParamValue),
    /// Float slider over `[min, max]`. `samples` is the evenly spaced
    /// sequence used by backends that only offer index sliders.
    Continuous {
        min: f64,
        max: f64,
        samples: Vec<ParamValue>,
    },
    Index(Vec<ParamValue>),
    Range(Vec<ParamValue>),
    Categorical(Vec<ParamValue>),
    External(Widget),
}

/// Immutable description of one parameter, created once when its control is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    pub domain: Domain,
    pub format: SliderFormat,
}

impl ParameterSpec {
    #[must_use]
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            format: SliderFormat::default(),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: SliderFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn kind(&self) -> ParameterKind {
        match self.domain {
            Domain::Fixed(_) => ParameterKind::Fixed,
            Domain::Continuous { .. } => ParameterKind::ContinuousSlider,
            Domain::Index(_) => ParameterKind::IndexSlider,
            Domain::Range(_) => ParameterKind::RangeSlider,
            Domain::Categorical(_) => ParameterKind::Categorical,
            Domain::External(_) => ParameterKind::ExternalWidget,
        }
    }

    #[must_use]
    pub fn needs_control(&self) -> bool {
        !matches!(self.domain, Domain::Fixed(_))
    }

    /// Ordered values an index ranges over, when the control is index based.
    #[must_use]
    pub fn values(&self) -> Option<&[ParamValue]> {
        match &self.domain {
            Domain::Continuous { samples, .. } => Some(samples),
            Domain::Index(values) | Domain::Range(values) | Domain::Categorical(values) => {
                Some(values)
            }
            Domain::Fixed(_) | Domain::External(_) => None,
        }
    }

    #[must_use]
    pub fn initial_value(&self) -> ParamValue {
        match &self.domain {
            Domain::Fixed(value) => value.clone(),
            Domain::Continuous { min, .. } => ParamValue::Number(*min),
            Domain::Index(values) | Domain::Categorical(values) => values[0].clone(),
            Domain::Range(values) => {
                ParamValue::pair(values[0].clone(), values[values.len() - 1].clone())
            }
            Domain::External(widget) => widget.value(),
        }
    }

    #[must_use]
    pub fn initial_index(&self) -> ControlIndex {
        match &self.domain {
            Domain::Range(values) => ControlIndex::Pair(0, values.len() - 1),
            Domain::External(widget) => widget.index(),
            _ => ControlIndex::Single(0),
        }
    }
}

/// Classifies raw parameters into [`ParameterSpec`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolver {
    pub continuous_steps: usize,
    pub format: SliderFormat,
}

impl Default for Resolver {
    fn default() -> Self {
        Self {
            continuous_steps: DEFAULT_CONTINUOUS_STEPS,
            format: SliderFormat::default(),
        }
    }
}

/// Resolves `raw` with default resolver settings.
pub fn resolve(name: &str, raw: &RawParam) -> ControlsResult<ParameterSpec> {
    Resolver::default().resolve(name, raw)
}

impl Resolver {
    #[must_use]
    pub fn with_format(mut self, format: SliderFormat) -> Self {
        self.format = format;
        self
    }

    pub fn resolve(&self, name: &str, raw: &RawParam) -> ControlsResult<ParameterSpec> {
        let domain = match raw {
            RawParam::Scalar(value) | RawParam::Fixed(value) => Domain::Fixed(value.clone()),
            RawParam::Set(members) => resolve_set(name, members)?,
            RawParam::Options(options) => resolve_options(name, options)?,
            RawParam::Widget(widget) => Domain::External(widget.clone()),
            RawParam::Tuple(items) => self.resolve_tuple(name, items)?,
            RawParam::Array { values, shape } => resolve_array(name, values, shape)?,
        };
        Ok(ParameterSpec {
            domain,
            format: self.format.clone(),
        })
    }

    fn resolve_tuple(&self, name: &str, items: &[TupleItem]) -> ControlsResult<Domain> {
        let Some(first) = items.first() else {
            return Err(ControlsError::invalid(name, "empty tuple"));
        };
        if let TupleItem::Text(token) = first {
            if !is_range_token(token) {
                return Err(ControlsError::UnrecognizedRangeToken {
                    name: name.to_owned(),
                    token: token.clone(),
                });
            }
            return resolve_range(name, &items[1..], self.continuous_steps);
        }

        let numbers = tuple_numbers(name, items)?;
        match numbers.as_slice() {
            [min, max] => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(ControlsError::invalid(name, "slider bounds must be finite"));
                }
                let samples = linspace(*min, *max, self.continuous_steps.max(2))
                    .into_iter()
                    .map(ParamValue::Number)
                    .collect();
                Ok(Domain::Continuous {
                    min: *min,
                    max: *max,
                    samples,
                })
            }
            [start, stop, count] => {
                let count = sample_count(name, *count)?;
                let values: Vec<ParamValue> = linspace(*start, *stop, count)
                    .into_iter()
                    .map(ParamValue::Number)
                    .collect();
                resolve_sequence(name, &values)
            }
            _ => {
                let values: Vec<ParamValue> =
                    numbers.iter().copied().map(ParamValue::Number).collect();
                resolve_sequence(name, &values)
            }
        }
    }
}

fn resolve_set(name: &str, members: &[SetMember]) -> ControlsResult<Domain> {
    let members: IndexSet<&SetMember> = members.iter().collect();
    if members.len() == 1 {
        return match members[0] {
            SetMember::Value(value) => Ok(Domain::Fixed(value.clone())),
            SetMember::Tuple(options) if options.is_empty() => {
                Err(ControlsError::invalid(name, "categorical tuple has no options"))
            }
            SetMember::Tuple(options) => Ok(Domain::Categorical(options.clone())),
        };
    }

    let mut options = Vec::with_capacity(members.len());
    for member in members {
        match member {
            SetMember::Value(value) => options.push(value.clone()),
            SetMember::Tuple(_) => {
                return Err(ControlsError::invalid(
                    name,
                    "a tuple of options must be the only member of its set",
                ));
            }
        }
    }
    if options.is_empty() {
        return Err(ControlsError::invalid(name, "categorical set has no options"));
    }
    Ok(Domain::Categorical(options))
}

fn resolve_options(name: &str, options: &[ParamValue]) -> ControlsResult<Domain> {
    match options {
        [] => Err(ControlsError::invalid(name, "categorical input has no options")),
        [only] => Ok(Domain::Fixed(only.clone())),
        _ => Ok(Domain::Categorical(options.to_vec())),
    }
}

fn resolve_range(name: &str, rest: &[TupleItem], continuous_steps: usize) -> ControlsResult<Domain> {
    let values: Vec<ParamValue> = match rest {
        [TupleItem::Sequence(values)] => values.clone(),
        _ => {
            let numbers = tuple_numbers(name, rest)?;
            let generated = match numbers.as_slice() {
                [start, stop] => linspace(*start, *stop, continuous_steps.max(2)),
                [start, stop, count] => linspace(*start, *stop, sample_count(name, *count)?),
                _ => {
                    return Err(ControlsError::invalid(
                        name,
                        "range expects an explicit sequence or (start, stop[, count])",
                    ));
                }
            };
            generated.into_iter().map(ParamValue::Number).collect()
        }
    };
    if values.len() < 2 {
        return Err(ControlsError::invalid(
            name,
            "range slider needs at least two values",
        ));
    }
    Ok(Domain::Range(values))
}

fn resolve_array(name: &str, values: &[ParamValue], shape: &[usize]) -> ControlsResult<Domain> {
    let expected: usize = shape.iter().product();
    if expected != values.len() {
        return Err(ControlsError::invalid(
            name,
            format!(
                "shape {shape:?} holds {expected} values but {} were given",
                values.len()
            ),
        ));
    }
    match shape.len() {
        0 => Ok(Domain::Fixed(values[0].clone())),
        1 => resolve_sequence(name, values),
        ndim => Err(ControlsError::Dimensionality {
            name: name.to_owned(),
            ndim,
        }),
    }
}

fn resolve_sequence(name: &str, values: &[ParamValue]) -> ControlsResult<Domain> {
    match values {
        [] => Err(ControlsError::invalid(name, "empty sequence")),
        [only] => Ok(Domain::Fixed(only.clone())),
        _ => Ok(Domain::Index(values.to_vec())),
    }
}

fn tuple_numbers(name: &str, items: &[TupleItem]) -> ControlsResult<Vec<f64>> {
    items
        .iter()
        .map(|item| match item {
            TupleItem::Number(value) => Ok(*value),
            TupleItem::Text(text) => Err(ControlsError::invalid(
                name,
                format!("unexpected text `{text}` inside numeric tuple"),
            )),
            TupleItem::Sequence(_) => Err(ControlsError::invalid(
                name,
                "nested sequences are only valid after a range token",
            )),
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn sample_count(name: &str, count: f64) -> ControlsResult<usize> {
    if !count.is_finite() || count < 0.0 || count.fract() != 0.0 {
        return Err(ControlsError::invalid(
            name,
            format!("sample count must be a non-negative integer, got {count}"),
        ));
    }
    Ok(count as usize)
}

/// `count` evenly spaced values from `start` to `stop`, both ends included.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        stop
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Case-insensitive match for `"r"` or anything one edit away from `"range"`.
#[must_use]
pub fn is_range_token(token: &str) -> bool {
    let lowered = token.trim().to_ascii_lowercase();
    lowered == "r" || (lowered.len() >= 3 && edit_distance(&lowered, "range") <= 1)
}

// Optimal string alignment distance: insert, delete, substitute, swap adjacent.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];
    for (i, row) in table.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=b.len() {
        table[0][j] = j;
    }
    for i in 1..=a.len() {
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (table[i - 1][j] + 1)
                .min(table[i][j - 1] + 1)
                .min(table[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(table[i - 2][j - 2] + 1);
            }
            table[i][j] = best;
        }
    }
    table[a.len()][b.len()]
}

#[cfg(test)]
mod tests {
    use super::{edit_distance, is_range_token, linspace};

    #[test]
    fn range_token_tolerates_common_misspellings() {
        for token in ["r", "R", "range", "Range", "rang", "rage", "rnage", "ranges"] {
            assert!(is_range_token(token), "{token} should match");
        }
        for token in ["x", "ra", "rng", "orange juice", "domain"] {
            assert!(!is_range_token(token), "{token} should not match");
        }
    }

    #[test]
    fn edit_distance_counts_adjacent_swaps_once() {
        assert_eq!(edit_distance("rnage", "range"), 1);
        assert_eq!(edit_distance("range", "range"), 0);
        assert_eq!(edit_distance("", "range"), 5);
    }

    #[test]
    fn linspace_includes_both_ends() {
        assert_eq!(linspace(0.0, 10.0, 5), vec![0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(linspace(3.0, 9.0, 1), vec![3.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}

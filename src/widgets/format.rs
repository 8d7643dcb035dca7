use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::core::ParamValue;

pub type FormatterFn = Rc<dyn Fn(&ParamValue) -> String + 'static>;

/// How a slider readout renders the value under the handle.
#[derive(Clone)]
pub enum SliderFormat {
    /// Numbers with a fixed number of decimals. `Precision(2)` is the default.
    Precision(usize),
    /// Numbers rounded to integers.
    Integer,
    /// `Display` output, unchanged.
    Plain,
    Custom(FormatterFn),
}

impl Default for SliderFormat {
    fn default() -> Self {
        Self::Precision(2)
    }
}

impl SliderFormat {
    #[must_use]
    pub fn custom(formatter: impl Fn(&ParamValue) -> String + 'static) -> Self {
        Self::Custom(Rc::new(formatter))
    }

    #[must_use]
    pub fn format(&self, value: &ParamValue) -> String {
        if let Self::Custom(formatter) = self {
            return formatter(value);
        }
        if let Some((first, second)) = value.as_pair() {
            return format!("({}, {})", self.format(first), self.format(second));
        }
        let number = if value.is_numeric() {
            value.as_f64()
        } else {
            None
        };
        match (self, number) {
            (Self::Precision(precision), Some(number)) => {
                let precision = *precision;
                format!("{number:.precision$}")
            }
            (Self::Integer, Some(number)) => format!("{number:.0}"),
            _ => value.to_string(),
        }
    }

    /// Readout for a two-ended range: `"<low> - <high>"`.
    #[must_use]
    pub fn format_range(&self, low: &ParamValue, high: &ParamValue) -> String {
        format!("{} - {}", self.format(low), self.format(high))
    }
}

impl fmt::Debug for SliderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Precision(precision) => f.debug_tuple("Precision").field(precision).finish(),
            Self::Integer => f.write_str("Integer"),
            Self::Plain => f.write_str("Plain"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for SliderFormat {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Precision(a), Self::Precision(b)) => a == b,
            (Self::Integer, Self::Integer) | (Self::Plain, Self::Plain) => true,
            (Self::Custom(a), Self::Custom(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Per-parameter readout formats with an optional fallback for unnamed
/// parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SliderFormats {
    default: Option<SliderFormat>,
    overrides: IndexMap<String, SliderFormat>,
}

impl SliderFormats {
    /// Formats that render every unnamed parameter with `default`.
    #[must_use]
    pub fn new(default: SliderFormat) -> Self {
        Self {
            default: Some(default),
            overrides: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, format: SliderFormat) -> Self {
        self.overrides.insert(name.into(), format);
        self
    }

    /// The override for `name`, else the fallback when one is set.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&SliderFormat> {
        self.overrides.get(name).or(self.default.as_ref())
    }

    /// Like [`SliderFormats::lookup`], with `Precision(2)` when nothing is set.
    #[must_use]
    pub fn get(&self, name: &str) -> SliderFormat {
        self.lookup(name).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::{SliderFormat, SliderFormats};

    #[test]
    fn lookup_prefers_overrides_then_the_fallback() {
        let formats = SliderFormats::new(SliderFormat::Integer).with("x", SliderFormat::Plain);
        assert_eq!(formats.lookup("x"), Some(&SliderFormat::Plain));
        assert_eq!(formats.lookup("y"), Some(&SliderFormat::Integer));

        let overrides_only = SliderFormats::default().with("x", SliderFormat::Plain);
        assert_eq!(overrides_only.lookup("y"), None);
        assert_eq!(overrides_only.get("y"), SliderFormat::Precision(2));
    }
}

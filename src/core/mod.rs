//! Parameter values and the classifier that turns raw inputs into specs.

mod raw;
mod spec;
mod value;

pub use raw::{RawParam, SetMember, TupleItem};
pub use spec::{
    DEFAULT_CONTINUOUS_STEPS, Domain, ParameterKind, ParameterSpec, Resolver, is_range_token,
    linspace, resolve,
};
pub use value::{ControlIndex, ParamIndices, ParamMap, ParamValue, exclude_params};

//! # paramtree
//!
//! Path-aware, type-directed decoding of dynamic configuration trees.
//!
//! A configuration source (a YAML document, a host parameter store)
//! produces a [`DynamicValue`] tree. [`RootParam`] owns such a tree;
//! [`Param`] is a cheap borrowed cursor into it that remembers how it was
//! reached, so every diagnostic names the exact node at fault.
//!
//! ## Design
//!
//! Decoding is dispatched statically through the [`Decode`] trait. Missing
//! data decodes to `Ok(None)` silently; data of the wrong shape is handed to
//! the parameter's [`TypeErrorStrategy`], which either logs and lets
//! decoding continue ([`LOG_TYPE_ERROR`], the default) or aborts it with a
//! [`TypeError`] ([`FAIL_ON_TYPE_ERROR`]).
//!
//! ## Example
//!
//! ```rust
//! use paramtree::{DynamicValue, RootParam};
//!
//! let value: DynamicValue = [("rate", DynamicValue::Int(50))].into_iter().collect();
//! let root = RootParam::new("/driver", value);
//! let param = root.param();
//!
//! assert_eq!(param.member("rate").decode::<u8>(), Ok(Some(50)));
//! assert_eq!(param.member("absent").decode::<u8>(), Ok(None));
//! assert_eq!(param.member("rate").path().to_string(), "/driver/rate");
//! ```

mod access;
mod codec;
mod collections;
mod param;
mod path;
mod record;
mod source;
mod strategy;
mod value;

pub use access::{
    get_optional_param, get_optional_param_into, get_optional_param_member, get_optional_param_member_into, get_param,
    get_param_into, get_param_member, get_param_member_into, get_required_param, get_required_param_into,
    get_required_param_member, get_required_param_member_into,
};
pub use codec::{Decode, decode_param};
pub use param::{Param, ParamIter, RootParam};
pub use path::PathNode;
pub use record::{FieldNames, FieldStream, Record, decode_record, field_names};
pub use source::{
    MemorySource, ParamSource, get_optional_source_param, get_required_source_param,
    get_source_param, get_source_param_member, join_namespace,
};
pub use strategy::{
    CollectTypeErrors, FAIL_ON_TYPE_ERROR, FailOnTypeError, LOG_TYPE_ERROR, LogTypeError,
    SharedStrategy, TypeError, TypeErrorStrategy,
};
pub use value::{DynamicValue, INVALID, Members, ValueKind};

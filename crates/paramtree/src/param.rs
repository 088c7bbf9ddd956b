//! Path-aware views over dynamic values.

use crate::codec::Decode;
use crate::path::PathNode;
use crate::source::ParamSource;
use crate::strategy::{LOG_TYPE_ERROR, SharedStrategy, TypeError};
use crate::value::{DynamicValue, INVALID, ValueKind};
use std::borrow::Cow;
use std::fmt;
use std::ptr;

/// A borrowed cursor into a dynamic value tree.
///
/// A `Param` pairs a [`PathNode`] with a reference to the value it names and
/// the strategy used to report type errors. Navigating to a child never
/// fails: a missing element or member yields a `Param` over [`INVALID`]
/// whose path still names the requested child, and the problem surfaces
/// only when something is decoded from it.
#[derive(Clone)]
pub struct Param<'a> {
    path: PathNode<'a>,
    value: &'a DynamicValue,
    strategy: &'a SharedStrategy,
}

impl<'a> Param<'a> {
    pub fn new(path: PathNode<'a>, value: &'a DynamicValue, strategy: &'a SharedStrategy) -> Self {
        Self {
            path,
            value,
            strategy,
        }
    }

    pub fn path(&self) -> &PathNode<'a> {
        &self.path
    }

    pub fn value(&self) -> &'a DynamicValue {
        self.value
    }

    pub fn strategy(&self) -> &'a SharedStrategy {
        self.strategy
    }

    pub fn kind(&self) -> ValueKind {
        self.value.kind()
    }

    /// Element or member count; 0 for scalars and missing values.
    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn exists(&self) -> bool {
        self.value.exists()
    }

    pub fn is_scalar(&self) -> bool {
        self.value.is_scalar()
    }

    pub fn is_collection(&self) -> bool {
        self.value.is_collection()
    }

    pub fn is_array(&self) -> bool {
        self.value.is_array()
    }

    pub fn is_struct(&self) -> bool {
        self.value.is_struct()
    }

    /// The array element at `index`.
    pub fn at(&self, index: usize) -> Param<'_> {
        let value = self.value.get(index).unwrap_or(&INVALID);
        Param {
            path: self.path.child(index.to_string()),
            value,
            strategy: self.strategy,
        }
    }

    /// The struct member called `name`.
    pub fn member<'s>(&'s self, name: impl Into<Cow<'s, str>>) -> Param<'s> {
        let name = name.into();
        let value = self.value.member(&name).unwrap_or(&INVALID);
        Param {
            path: self.path.child(name),
            value,
            strategy: self.strategy,
        }
    }

    /// Child at `position` in container order.
    fn child(&self, position: usize) -> Param<'_> {
        match self.value {
            DynamicValue::Struct(members) => match members.get_index(position) {
                Some((name, value)) => Param {
                    path: self.path.child(name.as_str()),
                    value,
                    strategy: self.strategy,
                },
                None => Param {
                    path: self.path.child("-"),
                    value: &INVALID,
                    strategy: self.strategy,
                },
            },
            _ => self.at(position),
        }
    }

    /// Children in container order: ascending index for arrays, insertion
    /// order for structs, nothing for anything else.
    pub fn iter(&self) -> ParamIter<'_, 'a> {
        ParamIter {
            container: self,
            position: 0,
            end: if self.is_collection() { self.len() } else { 0 },
        }
    }

    /// Decodes this parameter; absence yields `Ok(None)` without a report.
    pub fn decode<T: Decode>(&self) -> Result<Option<T>, TypeError> {
        T::decode(self)
    }

    /// Decodes into `result`, leaving it untouched unless decoding succeeds.
    pub fn decode_into<T: Decode>(&self, result: &mut T) -> Result<bool, TypeError> {
        match T::decode(self)? {
            Some(value) => {
                *result = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Decodes this parameter, falling back to `default`.
    pub fn get_optional<T: Decode>(&self, default: T) -> Result<T, TypeError> {
        Ok(T::decode(self)?.unwrap_or(default))
    }

    /// Decodes this parameter, reporting absence as a type error.
    ///
    /// Returns `T::default()` when the strategy lets decoding continue.
    pub fn get_required<T: Decode + Default>(&self) -> Result<T, TypeError> {
        if let Some(value) = T::decode(self)? {
            return Ok(value);
        }
        self.handle_type_error("required parameter not available")?;
        Ok(T::default())
    }

    /// Reports `message` for this parameter through its strategy.
    pub fn handle_type_error(&self, message: &str) -> Result<(), TypeError> {
        self.strategy.on_type_error(self, message)
    }
}

impl fmt::Debug for Param<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Param")
            .field("path", &self.path.to_string())
            .field("value", self.value)
            .finish_non_exhaustive()
    }
}

impl<'p, 'a> IntoIterator for &'p Param<'a> {
    type Item = Param<'p>;
    type IntoIter = ParamIter<'p, 'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the children of a [`Param`].
///
/// Each call to [`Param::iter`] starts afresh from the live container. Two
/// iterators compare equal when they walk the same container and stand at
/// the same position.
#[derive(Debug, Clone)]
pub struct ParamIter<'p, 'a> {
    container: &'p Param<'a>,
    position: usize,
    end: usize,
}

impl ParamIter<'_, '_> {
    /// Index of the next child to be yielded.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl<'p> Iterator for ParamIter<'p, '_> {
    type Item = Param<'p>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.end {
            return None;
        }
        let item = self.container.child(self.position);
        self.position += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ParamIter<'_, '_> {}

impl PartialEq for ParamIter<'_, '_> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.container, other.container) && self.position == other.position
    }
}

impl Eq for ParamIter<'_, '_> {}

/// An owning root parameter.
///
/// Holds its own copy of the value tree so that views handed out by
/// [`RootParam::param`] do not depend on caller-managed storage.
#[derive(Clone)]
pub struct RootParam {
    key: String,
    value: DynamicValue,
    strategy: SharedStrategy,
}

impl RootParam {
    /// A root named `key` (typically a namespace) that logs type errors.
    pub fn new(key: impl Into<String>, value: DynamicValue) -> Self {
        Self {
            key: key.into(),
            value,
            strategy: LOG_TYPE_ERROR.clone(),
        }
    }

    /// A root with an empty key.
    pub fn from_value(value: DynamicValue) -> Self {
        Self::new(String::new(), value)
    }

    /// Re-roots `param`: the new root's key is the rendered path of `param`,
    /// so paths below it read as they did below the original.
    pub fn from_param(param: &Param<'_>) -> Self {
        Self {
            key: param.path().to_string(),
            value: param.value().clone(),
            strategy: param.strategy().clone(),
        }
    }

    /// Snapshot of a parameter source, rooted at its namespace.
    pub fn from_source<S: ParamSource + ?Sized>(source: &S) -> Self {
        Self::new(source.namespace(), source.fetch())
    }

    pub fn with_strategy(mut self, strategy: SharedStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &DynamicValue {
        &self.value
    }

    pub fn into_value(self) -> DynamicValue {
        self.value
    }

    pub fn strategy(&self) -> &SharedStrategy {
        &self.strategy
    }

    pub fn exists(&self) -> bool {
        self.value.exists()
    }

    /// A view over the owned tree.
    pub fn param(&self) -> Param<'_> {
        Param::new(PathNode::root(self.key.as_str()), &self.value, &self.strategy)
    }

    /// Decodes the whole tree; see [`Param::decode`].
    pub fn decode<T: Decode>(&self) -> Result<Option<T>, TypeError> {
        self.param().decode()
    }

    /// Reports `message` against the root.
    pub fn handle_type_error(&self, message: &str) -> Result<(), TypeError> {
        self.param().handle_type_error(message)
    }
}

impl fmt::Debug for RootParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RootParam")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

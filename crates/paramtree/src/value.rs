//! Dynamic configuration values.
//!
//! A [`DynamicValue`] is one node of a nested configuration tree, the shape
//! produced by parsing YAML or exported by a host parameter store. Only
//! [`DynamicValue::Array`] and [`DynamicValue::Struct`] nest further values.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use std::fmt;

/// Struct members in insertion order.
pub type Members = IndexMap<String, DynamicValue>;

/// The distinguished absent value.
///
/// Navigation that misses (index out of range, absent member) hands out a
/// reference to this constant instead of a null reference.
pub static INVALID: DynamicValue = DynamicValue::Invalid;

/// Format used for the canonical text of [`DynamicValue::DateTime`].
const DATE_TIME_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// One node of a dynamic configuration tree.
#[derive(Debug, Clone, Default)]
pub enum DynamicValue {
    /// Absence of a value (YAML `null`, missing members).
    #[default]
    Invalid,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Opaque date/time, passed through but never coerced.
    DateTime(NaiveDateTime),
    /// Opaque byte payload.
    Binary(Vec<u8>),
    Array(Vec<DynamicValue>),
    Struct(Members),
}

/// The variant of a [`DynamicValue`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Invalid,
    Bool,
    Int,
    Double,
    String,
    DateTime,
    Binary,
    Array,
    Struct,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Invalid => "Invalid",
            ValueKind::Bool => "Boolean",
            ValueKind::Int => "Int",
            ValueKind::Double => "Double",
            ValueKind::String => "String",
            ValueKind::DateTime => "DateTime",
            ValueKind::Binary => "Binary",
            ValueKind::Array => "Array",
            ValueKind::Struct => "Struct",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DynamicValue {
    /// An empty array.
    pub fn empty_array() -> Self {
        DynamicValue::Array(Vec::new())
    }

    /// An empty struct.
    pub fn empty_struct() -> Self {
        DynamicValue::Struct(Members::new())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            DynamicValue::Invalid => ValueKind::Invalid,
            DynamicValue::Bool(_) => ValueKind::Bool,
            DynamicValue::Int(_) => ValueKind::Int,
            DynamicValue::Double(_) => ValueKind::Double,
            DynamicValue::String(_) => ValueKind::String,
            DynamicValue::DateTime(_) => ValueKind::DateTime,
            DynamicValue::Binary(_) => ValueKind::Binary,
            DynamicValue::Array(_) => ValueKind::Array,
            DynamicValue::Struct(_) => ValueKind::Struct,
        }
    }

    /// False only for [`DynamicValue::Invalid`].
    pub fn exists(&self) -> bool {
        !matches!(self, DynamicValue::Invalid)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            DynamicValue::Bool(_)
                | DynamicValue::Int(_)
                | DynamicValue::Double(_)
                | DynamicValue::String(_)
                | DynamicValue::DateTime(_)
                | DynamicValue::Binary(_)
        )
    }

    pub fn is_collection(&self) -> bool {
        self.is_array() || self.is_struct()
    }

    pub fn is_array(&self) -> bool {
        matches!(self, DynamicValue::Array(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, DynamicValue::Struct(_))
    }

    /// Element or member count; 0 for scalars and Invalid.
    pub fn len(&self) -> usize {
        match self {
            DynamicValue::Array(items) => items.len(),
            DynamicValue::Struct(members) => members.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            DynamicValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            DynamicValue::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&NaiveDateTime> {
        match self {
            DynamicValue::DateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_binary(&self) -> Option<&[u8]> {
        match self {
            DynamicValue::Binary(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[DynamicValue]> {
        match self {
            DynamicValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&Members> {
        match self {
            DynamicValue::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Array element at `index`, if this is an array and the index is in range.
    pub fn get(&self, index: usize) -> Option<&DynamicValue> {
        self.as_array().and_then(|items| items.get(index))
    }

    /// Struct member `name`, if this is a struct that has it.
    pub fn member(&self, name: &str) -> Option<&DynamicValue> {
        self.as_struct().and_then(|members| members.get(name))
    }

    /// Appends to an array. Returns false, leaving `self` untouched, for any
    /// other variant.
    pub fn push(&mut self, value: DynamicValue) -> bool {
        match self {
            DynamicValue::Array(items) => {
                items.push(value);
                true
            }
            _ => false,
        }
    }

    /// Inserts a struct member unless one with that name already exists.
    /// Returns whether the member was inserted.
    pub fn insert_if_absent(&mut self, name: impl Into<String>, value: DynamicValue) -> bool {
        match self {
            DynamicValue::Struct(members) => {
                let name = name.into();
                if members.contains_key(&name) {
                    return false;
                }
                members.insert(name, value);
                true
            }
            _ => false,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::String(value) => write!(f, "{:?}", value),
            other => fmt::Display::fmt(other, f),
        }
    }
}

/// Structural equality. Doubles compare equal when both are NaN so that
/// trees ingested from the same text always compare equal; struct member
/// order is not significant.
impl PartialEq for DynamicValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DynamicValue::Invalid, DynamicValue::Invalid) => true,
            (DynamicValue::Bool(a), DynamicValue::Bool(b)) => a == b,
            (DynamicValue::Int(a), DynamicValue::Int(b)) => a == b,
            (DynamicValue::Double(a), DynamicValue::Double(b)) => a == b || (a.is_nan() && b.is_nan()),
            (DynamicValue::String(a), DynamicValue::String(b)) => a == b,
            (DynamicValue::DateTime(a), DynamicValue::DateTime(b)) => a == b,
            (DynamicValue::Binary(a), DynamicValue::Binary(b)) => a == b,
            (DynamicValue::Array(a), DynamicValue::Array(b)) => a == b,
            (DynamicValue::Struct(a), DynamicValue::Struct(b)) => a == b,
            _ => false,
        }
    }
}

/// Canonical text of a value.
///
/// Doubles use the YAML spellings `.inf`, `-.inf` and `.nan`; strings nested
/// in collections are quoted, top-level strings are not.
impl fmt::Display for DynamicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynamicValue::Invalid => f.write_str("null"),
            DynamicValue::Bool(value) => write!(f, "{}", value),
            DynamicValue::Int(value) => write!(f, "{}", value),
            DynamicValue::Double(value) => {
                if value.is_nan() {
                    f.write_str(".nan")
                } else if value.is_infinite() {
                    f.write_str(if *value > 0.0 { ".inf" } else { "-.inf" })
                } else {
                    write!(f, "{:?}", value)
                }
            }
            DynamicValue::String(value) => f.write_str(value),
            DynamicValue::DateTime(value) => write!(f, "{}", value.format(DATE_TIME_FORMAT)),
            DynamicValue::Binary(value) => f.write_str(&BASE64.encode(value)),
            DynamicValue::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            DynamicValue::Struct(members) => {
                f.write_str("{")?;
                for (i, (name, value)) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: ", name)?;
                    value.fmt_nested(f)?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for DynamicValue {
    fn from(value: bool) -> Self {
        DynamicValue::Bool(value)
    }
}

impl From<i32> for DynamicValue {
    fn from(value: i32) -> Self {
        DynamicValue::Int(value.into())
    }
}

impl From<i64> for DynamicValue {
    fn from(value: i64) -> Self {
        DynamicValue::Int(value)
    }
}

impl From<f64> for DynamicValue {
    fn from(value: f64) -> Self {
        DynamicValue::Double(value)
    }
}

impl From<&str> for DynamicValue {
    fn from(value: &str) -> Self {
        DynamicValue::String(value.to_owned())
    }
}

impl From<String> for DynamicValue {
    fn from(value: String) -> Self {
        DynamicValue::String(value)
    }
}

impl From<NaiveDateTime> for DynamicValue {
    fn from(value: NaiveDateTime) -> Self {
        DynamicValue::DateTime(value)
    }
}

impl From<Vec<DynamicValue>> for DynamicValue {
    fn from(items: Vec<DynamicValue>) -> Self {
        DynamicValue::Array(items)
    }
}

impl From<Members> for DynamicValue {
    fn from(members: Members) -> Self {
        DynamicValue::Struct(members)
    }
}

impl<K: Into<String>> FromIterator<(K, DynamicValue)> for DynamicValue {
    fn from_iter<I: IntoIterator<Item = (K, DynamicValue)>>(iter: I) -> Self {
        DynamicValue::Struct(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

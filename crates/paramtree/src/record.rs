//! Decoding of record types from message definitions.
//!
//! A record type names its fields through a message definition, one
//! declaration per line:
//!
//! ```text
//! # comment
//! float64 x        # trailing comment
//! uint8 MODE_FAST=1
//! string label
//! ===
//! everything after a line starting with '=' is ignored
//! ```
//!
//! Constant declarations (`<type> <NAME>=<value>`) and comments do not
//! consume a field slot. [`FieldStream`] hands out the remaining names in
//! order and decodes each from the struct member of the same name.

use crate::codec::{Decode, mismatch};
use crate::param::Param;
use crate::strategy::TypeError;
use std::str::Lines;
use std::time::Duration;

/// Iterator over the field names of a message definition.
#[derive(Debug, Clone)]
pub struct FieldNames<'d> {
    lines: Lines<'d>,
    finished: bool,
}

/// The field names declared by `definition`, in declaration order.
pub fn field_names(definition: &str) -> FieldNames<'_> {
    FieldNames {
        lines: definition.lines(),
        finished: false,
    }
}

impl<'d> Iterator for FieldNames<'d> {
    type Item = &'d str;

    fn next(&mut self) -> Option<&'d str> {
        if self.finished {
            return None;
        }
        for line in self.lines.by_ref() {
            let line = line.trim_start();
            if line.starts_with('=') {
                self.finished = true;
                return None;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((_type_name, rest)) = line.split_once([' ', '\t']) else {
                continue;
            };
            let rest = rest.trim_start_matches([' ', '\t']);
            let end = rest
                .find([' ', '\t', '\r', '#', '='])
                .unwrap_or(rest.len());
            let (name, after) = rest.split_at(end);
            if name.is_empty() || after.trim_start_matches([' ', '\t']).starts_with('=') {
                continue;
            }
            return Some(name);
        }
        self.finished = true;
        None
    }
}

/// Decodes the fields of one record in declaration order.
pub struct FieldStream<'p, 'a> {
    param: &'p Param<'a>,
    names: FieldNames<'p>,
}

impl<'p, 'a> FieldStream<'p, 'a> {
    pub fn new(param: &'p Param<'a>, definition: &'p str) -> Self {
        Self {
            param,
            names: field_names(definition),
        }
    }

    /// Decodes the next declared field into `field`.
    ///
    /// A missing member leaves `field` at its current value. Returns whether
    /// the field was assigned.
    pub fn next<T: Decode>(&mut self, field: &mut T) -> Result<bool, TypeError> {
        match self.names.next() {
            Some(name) => self.param.member(name).decode_into(field),
            None => {
                tracing::error!(
                    path = %self.param.path(),
                    "message definition ended before decoding was finished"
                );
                Ok(false)
            }
        }
    }
}

/// A type decoded field by field from a struct parameter.
///
/// Bind a record to the codec with [`record_codec!`](crate::record_codec).
pub trait Record: Default {
    /// Message definition naming the fields in the order
    /// [`Record::decode_fields`] consumes them.
    const DEFINITION: &'static str;

    fn decode_fields(&mut self, fields: &mut FieldStream<'_, '_>) -> Result<(), TypeError>;
}

/// Decodes a [`Record`] from a struct parameter.
pub fn decode_record<T: Record>(param: &Param<'_>) -> Result<Option<T>, TypeError> {
    if !param.is_struct() {
        return mismatch(param, "expected struct");
    }
    let mut record = T::default();
    let mut fields = FieldStream::new(param, T::DEFINITION);
    record.decode_fields(&mut fields)?;
    Ok(Some(record))
}

/// Implements [`Decode`](crate::Decode) for record types through
/// [`decode_record`](crate::decode_record).
#[macro_export]
macro_rules! record_codec {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Decode for $ty {
                fn decode(
                    param: &$crate::Param<'_>,
                ) -> ::std::result::Result<::std::option::Option<Self>, $crate::TypeError> {
                    $crate::decode_record(param)
                }
            }
        )+
    };
}

const DURATION_DEFINITION: &str = "uint32 sec\nuint32 nsec";

impl Decode for Duration {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        if !param.is_struct() {
            return mismatch(param, "expected struct");
        }
        let mut sec: u32 = 0;
        let mut nsec: u32 = 0;
        let mut fields = FieldStream::new(param, DURATION_DEFINITION);
        fields.next(&mut sec)?;
        fields.next(&mut nsec)?;
        Ok(Some(Duration::new(sec.into(), nsec)))
    }
}

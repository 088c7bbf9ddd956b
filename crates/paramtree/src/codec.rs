//! Type-directed decoding of parameters.
//!
//! Each target type implements [`Decode`]. Decoding distinguishes two
//! failure classes: a missing value yields `Ok(None)` silently, while a
//! value of the wrong shape is reported through the parameter's strategy
//! (and then also yields `Ok(None)` unless the strategy aborts).
//!
//! Coercions between dynamic kinds:
//!
//! | target   | accepted sources                                              |
//! |----------|---------------------------------------------------------------|
//! | `bool`   | Bool; Int 0/1; String `true`/`True`/`false`/`False`           |
//! | integers | Int within the target's range                                 |
//! | floats   | Int, Double; String `.inf`, `-.inf`, `.nan`                   |
//! | `String` | anything that exists, rendered as its canonical text          |

use crate::param::Param;
use crate::strategy::TypeError;
use crate::value::DynamicValue;
use chrono::NaiveDateTime;

/// A type that can be decoded from a [`Param`].
pub trait Decode: Sized {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError>;
}

/// Decodes `param` as `T`.
pub fn decode_param<T: Decode>(param: &Param<'_>) -> Result<Option<T>, TypeError> {
    T::decode(param)
}

/// Reports `message` unless `param` is missing, then yields absence.
pub(crate) fn mismatch<T>(param: &Param<'_>, message: &str) -> Result<Option<T>, TypeError> {
    if param.exists() {
        param.handle_type_error(message)?;
    }
    Ok(None)
}

impl Decode for DynamicValue {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        Ok(param.exists().then(|| param.value().clone()))
    }
}

impl Decode for bool {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        match param.value() {
            DynamicValue::Invalid => return Ok(None),
            DynamicValue::Bool(value) => return Ok(Some(*value)),
            DynamicValue::Int(0) => return Ok(Some(false)),
            DynamicValue::Int(1) => return Ok(Some(true)),
            DynamicValue::String(value) => match value.as_str() {
                "true" | "True" => return Ok(Some(true)),
                "false" | "False" => return Ok(Some(false)),
                _ => {}
            },
            _ => {}
        }
        mismatch(param, "expected boolean or convertible-to-boolean")
    }
}

fn decode_integer(param: &Param<'_>) -> Result<Option<i64>, TypeError> {
    match param.value() {
        DynamicValue::Int(value) => Ok(Some(*value)),
        _ => mismatch(param, "expected integer"),
    }
}

macro_rules! integer_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Decode for $ty {
                fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
                    let Some(value) = decode_integer(param)? else {
                        return Ok(None);
                    };
                    match <$ty>::try_from(value) {
                        Ok(value) => Ok(Some(value)),
                        Err(_) => mismatch(
                            param,
                            &format!(
                                "integer {} out of range [{}, {}]",
                                value,
                                <$ty>::MIN,
                                <$ty>::MAX
                            ),
                        ),
                    }
                }
            }
        )*
    };
}

integer_codec!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl Decode for f64 {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        match param.value() {
            DynamicValue::Invalid => return Ok(None),
            DynamicValue::Int(value) => return Ok(Some(*value as f64)),
            DynamicValue::Double(value) => return Ok(Some(*value)),
            DynamicValue::String(value) => match value.as_str() {
                ".inf" => return Ok(Some(f64::INFINITY)),
                "-.inf" => return Ok(Some(f64::NEG_INFINITY)),
                ".nan" => return Ok(Some(f64::NAN)),
                _ => {}
            },
            _ => {}
        }
        mismatch(param, "expected floating-point or convertible-to-floating-point")
    }
}

impl Decode for f32 {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        Ok(f64::decode(param)?.map(|value| value as f32))
    }
}

impl Decode for String {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        Ok(match param.value() {
            DynamicValue::Invalid => None,
            DynamicValue::String(value) => Some(value.clone()),
            other => Some(other.to_string()),
        })
    }
}

impl Decode for NaiveDateTime {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        match param.value() {
            DynamicValue::DateTime(value) => Ok(Some(*value)),
            _ => mismatch(param, "expected date/time"),
        }
    }
}

/// Absence decodes to `Some(None)`; a present value must decode as `T`.
impl<T: Decode> Decode for Option<T> {
    fn decode(param: &Param<'_>) -> Result<Option<Self>, TypeError> {
        if !param.exists() {
            return Ok(Some(None));
        }
        Ok(T::decode(param)?.map(Some))
    }
}

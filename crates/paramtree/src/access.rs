//! Free-standing accessors over borrowed dynamic values.
//!
//! These wrap a value the caller already holds in a short-lived [`Param`]
//! and decode from it. The member forms look `name` up in a struct value and
//! root the reported path at `name`.

use crate::codec::Decode;
use crate::param::Param;
use crate::path::PathNode;
use crate::strategy::{SharedStrategy, TypeError};
use crate::value::{DynamicValue, INVALID};

fn member_of<'v>(value: &'v DynamicValue, name: &str) -> &'v DynamicValue {
    value.member(name).unwrap_or(&INVALID)
}

/// Decodes `value` as `T`.
pub fn get_param<T: Decode>(value: &DynamicValue, strategy: &SharedStrategy) -> Result<Option<T>, TypeError> {
    Param::new(PathNode::root(""), value, strategy).decode()
}

/// Decodes member `name` of the struct `value`.
pub fn get_param_member<T: Decode>(
    value: &DynamicValue,
    name: &str,
    strategy: &SharedStrategy,
) -> Result<Option<T>, TypeError> {
    Param::new(PathNode::root(name), member_of(value, name), strategy).decode()
}

/// Decodes `value` into `result`, leaving it untouched on failure.
pub fn get_param_into<T: Decode>(
    value: &DynamicValue,
    result: &mut T,
    strategy: &SharedStrategy,
) -> Result<bool, TypeError> {
    Param::new(PathNode::root(""), value, strategy).decode_into(result)
}

pub fn get_param_member_into<T: Decode>(
    value: &DynamicValue,
    name: &str,
    result: &mut T,
    strategy: &SharedStrategy,
) -> Result<bool, TypeError> {
    Param::new(PathNode::root(name), member_of(value, name), strategy).decode_into(result)
}

pub fn get_optional_param<T: Decode>(
    value: &DynamicValue,
    default: T,
    strategy: &SharedStrategy,
) -> Result<T, TypeError> {
    Ok(get_param(value, strategy)?.unwrap_or(default))
}

pub fn get_optional_param_member<T: Decode>(
    value: &DynamicValue,
    name: &str,
    default: T,
    strategy: &SharedStrategy,
) -> Result<T, TypeError> {
    Ok(get_param_member(value, name, strategy)?.unwrap_or(default))
}

/// Decodes `value` into `result`, or stores `default` when nothing decodes.
pub fn get_optional_param_into<T: Decode>(
    value: &DynamicValue,
    result: &mut T,
    default: T,
    strategy: &SharedStrategy,
) -> Result<(), TypeError> {
    *result = get_optional_param(value, default, strategy)?;
    Ok(())
}

pub fn get_optional_param_member_into<T: Decode>(
    value: &DynamicValue,
    name: &str,
    result: &mut T,
    default: T,
    strategy: &SharedStrategy,
) -> Result<(), TypeError> {
    *result = get_optional_param_member(value, name, default, strategy)?;
    Ok(())
}

/// Decodes `value`, reporting absence or failure and falling back to
/// `T::default()`.
pub fn get_required_param<T: Decode + Default>(
    value: &DynamicValue,
    strategy: &SharedStrategy,
) -> Result<T, TypeError> {
    Param::new(PathNode::root(""), value, strategy).get_required()
}

/// Like [`get_required_param`] for member `name`.
///
/// The reported path is `name`; the message names the member as well, so a
/// log line stays readable when the path is printed without context.
pub fn get_required_param_member<T: Decode + Default>(
    value: &DynamicValue,
    name: &str,
    strategy: &SharedStrategy,
) -> Result<T, TypeError> {
    let param = Param::new(PathNode::root(name), member_of(value, name), strategy);
    if let Some(decoded) = param.decode::<T>()? {
        return Ok(decoded);
    }
    param.handle_type_error(&format!("required parameter not available in {}", name))?;
    Ok(T::default())
}

/// Stores the required `value` in `result`, or `T::default()` when it is
/// unavailable.
pub fn get_required_param_into<T: Decode + Default>(
    value: &DynamicValue,
    result: &mut T,
    strategy: &SharedStrategy,
) -> Result<(), TypeError> {
    *result = get_required_param(value, strategy)?;
    Ok(())
}

pub fn get_required_param_member_into<T: Decode + Default>(
    value: &DynamicValue,
    name: &str,
    result: &mut T,
    strategy: &SharedStrategy,
) -> Result<(), TypeError> {
    *result = get_required_param_member(value, name, strategy)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{CollectTypeErrors, FAIL_ON_TYPE_ERROR, LOG_TYPE_ERROR};
    use std::sync::Arc;

    fn settings() -> DynamicValue {
        [
            ("rate", DynamicValue::Int(20)),
            ("name", DynamicValue::from("lidar")),
            ("flags", DynamicValue::Array(vec![DynamicValue::Bool(true)])),
        ]
        .into_iter()
        .collect()
    }

    fn collecting() -> (SharedStrategy, Arc<CollectTypeErrors>) {
        let collector = Arc::new(CollectTypeErrors::new());
        (collector.clone(), collector)
    }

    #[test]
    fn test_get_param_on_whole_value() {
        assert_eq!(get_param::<i32>(&DynamicValue::Int(3), &LOG_TYPE_ERROR), Ok(Some(3)));
        assert_eq!(get_param::<i32>(&DynamicValue::Invalid, &LOG_TYPE_ERROR), Ok(None));
        assert_eq!(get_optional_param(&DynamicValue::Invalid, 7i32, &LOG_TYPE_ERROR), Ok(7));
    }

    #[test]
    fn test_member_accessors() {
        let value = settings();
        assert_eq!(get_param_member::<u16>(&value, "rate", &LOG_TYPE_ERROR), Ok(Some(20)));
        assert_eq!(get_param_member::<u16>(&value, "absent", &LOG_TYPE_ERROR), Ok(None));
        assert_eq!(
            get_optional_param_member(&value, "absent", "x".to_owned(), &LOG_TYPE_ERROR),
            Ok("x".to_owned())
        );
        assert_eq!(
            get_param_member::<Vec<bool>>(&value, "flags", &LOG_TYPE_ERROR),
            Ok(Some(vec![true]))
        );
    }

    #[test]
    fn test_member_of_non_struct_is_absent() {
        assert_eq!(get_param_member::<i32>(&DynamicValue::Int(1), "rate", &LOG_TYPE_ERROR), Ok(None));
    }

    #[test]
    fn test_into_keeps_previous_value_on_failure() {
        let value = settings();
        let (strategy, errors) = collecting();
        let mut rate = 5u8;
        assert_eq!(get_param_member_into(&value, "rate", &mut rate, &strategy), Ok(true));
        assert_eq!(rate, 20);

        let mut name = 0i32;
        assert_eq!(get_param_member_into(&value, "name", &mut name, &strategy), Ok(false));
        assert_eq!(name, 0);
        assert_eq!(errors.errors()[0].path, "name");

        let mut whole = 0i64;
        assert_eq!(get_param_into(&DynamicValue::Int(-4), &mut whole, &strategy), Ok(true));
        assert_eq!(whole, -4);
    }

    #[test]
    fn test_required_reports_absence() {
        let (strategy, errors) = collecting();
        let rate: u32 = get_required_param(&DynamicValue::Invalid, &strategy).unwrap();
        assert_eq!(rate, 0);
        assert_eq!(errors.errors()[0].message, "required parameter not available");
    }

    #[test]
    fn test_required_member_reports_name() {
        let (strategy, errors) = collecting();
        let rate: u32 = get_required_param_member(&settings(), "missing", &strategy).unwrap();
        assert_eq!(rate, 0);
        let reported = errors.errors();
        assert_eq!(reported.len(), 1);
        insta::assert_snapshot!(
            reported[0].to_string(),
            @"parameter missing has wrong type: required parameter not available in missing"
        );
    }

    #[test]
    fn test_required_member_mismatch_reports_twice() {
        let (strategy, errors) = collecting();
        let rate: i32 = get_required_param_member(&settings(), "name", &strategy).unwrap();
        assert_eq!(rate, 0);
        let messages: Vec<String> = errors.errors().into_iter().map(|error| error.message).collect();
        assert_eq!(messages, ["expected integer", "required parameter not available in name"]);
    }

    #[test]
    fn test_into_forms_assign_fallbacks() {
        let value = settings();
        let (strategy, errors) = collecting();

        let mut rate = 1u16;
        get_optional_param_member_into(&value, "rate", &mut rate, 9, &strategy).unwrap();
        assert_eq!(rate, 20);
        get_optional_param_member_into(&value, "absent", &mut rate, 9, &strategy).unwrap();
        assert_eq!(rate, 9);
        get_optional_param_into(&DynamicValue::Invalid, &mut rate, 4, &strategy).unwrap();
        assert_eq!(rate, 4);
        assert!(errors.is_empty());

        let mut name = "old".to_owned();
        get_required_param_member_into(&value, "name", &mut name, &strategy).unwrap();
        assert_eq!(name, "lidar");
        get_required_param_member_into(&value, "absent", &mut name, &strategy).unwrap();
        assert_eq!(name, "");
        get_required_param_into(&DynamicValue::Int(6), &mut rate, &strategy).unwrap();
        assert_eq!(rate, 6);
        assert_eq!(errors.errors().len(), 1);
    }

    #[test]
    fn test_required_into_under_fail_policy() {
        let mut rate = 3u8;
        let error = get_required_param_member_into(&settings(), "absent", &mut rate, &FAIL_ON_TYPE_ERROR).unwrap_err();
        assert_eq!(error.path, "absent");
        assert_eq!(rate, 3);
    }

    #[test]
    fn test_required_under_fail_policy() {
        let error = get_required_param_member::<String>(&settings(), "missing", &FAIL_ON_TYPE_ERROR).unwrap_err();
        assert_eq!(error.path, "missing");
        assert_eq!(
            get_required_param_member::<String>(&settings(), "name", &FAIL_ON_TYPE_ERROR),
            Ok("lidar".to_owned())
        );
    }
}

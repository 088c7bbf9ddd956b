//! Parameter sources.
//!
//! A host parameter store is seen through [`ParamSource`]: it exports one
//! dynamic value tree together with the namespace that tree lives under.
//! The namespace becomes the root key of every path rendered for values
//! taken from the source.

use crate::codec::Decode;
use crate::param::{Param, RootParam};
use crate::path::PathNode;
use crate::strategy::{SharedStrategy, TypeError};
use crate::value::DynamicValue;

/// A source of a dynamic value tree.
pub trait ParamSource {
    /// Namespace of the exported tree, e.g. `/robot/driver`.
    fn namespace(&self) -> String;

    /// A snapshot of the tree.
    fn fetch(&self) -> DynamicValue;
}

/// A source backed by a value held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    namespace: String,
    value: DynamicValue,
}

impl MemorySource {
    pub fn new(namespace: impl Into<String>, value: DynamicValue) -> Self {
        Self {
            namespace: namespace.into(),
            value,
        }
    }

    pub fn value_mut(&mut self) -> &mut DynamicValue {
        &mut self.value
    }
}

impl ParamSource for MemorySource {
    fn namespace(&self) -> String {
        self.namespace.clone()
    }

    fn fetch(&self) -> DynamicValue {
        self.value.clone()
    }
}

impl ParamSource for RootParam {
    fn namespace(&self) -> String {
        self.key().to_owned()
    }

    fn fetch(&self) -> DynamicValue {
        self.value().clone()
    }
}

/// Joins a namespace and a member name with exactly one `/`.
pub fn join_namespace(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        return name.to_owned();
    }
    format!("{}/{}", namespace.trim_end_matches('/'), name)
}

/// Decodes the whole tree of `source`.
pub fn get_source_param<T, S>(source: &S, strategy: &SharedStrategy) -> Result<Option<T>, TypeError>
where
    T: Decode,
    S: ParamSource + ?Sized,
{
    let value = source.fetch();
    let namespace = source.namespace();
    Param::new(PathNode::root(namespace), &value, strategy).decode()
}

/// Decodes member `name` of the tree of `source`, rooted at the joined
/// namespace.
pub fn get_source_param_member<T, S>(
    source: &S,
    name: &str,
    strategy: &SharedStrategy,
) -> Result<Option<T>, TypeError>
where
    T: Decode,
    S: ParamSource + ?Sized,
{
    let tree = source.fetch();
    let value = tree.member(name).unwrap_or(&crate::value::INVALID);
    let namespace = join_namespace(&source.namespace(), name);
    Param::new(PathNode::root(namespace), value, strategy).decode()
}

/// Like [`get_source_param_member`], falling back to `default`.
pub fn get_optional_source_param<T, S>(
    source: &S,
    name: &str,
    default: T,
    strategy: &SharedStrategy,
) -> Result<T, TypeError>
where
    T: Decode,
    S: ParamSource + ?Sized,
{
    Ok(get_source_param_member(source, name, strategy)?.unwrap_or(default))
}

/// Like [`get_source_param_member`], reporting absence as a type error.
pub fn get_required_source_param<T, S>(
    source: &S,
    name: &str,
    strategy: &SharedStrategy,
) -> Result<T, TypeError>
where
    T: Decode + Default,
    S: ParamSource + ?Sized,
{
    let tree = source.fetch();
    let value = tree.member(name).unwrap_or(&crate::value::INVALID);
    let namespace = join_namespace(&source.namespace(), name);
    let param = Param::new(PathNode::root(namespace.as_str()), value, strategy);
    if let Some(decoded) = param.decode::<T>()? {
        return Ok(decoded);
    }
    param.handle_type_error(&format!("required parameter not available in {}", namespace))?;
    Ok(T::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{CollectTypeErrors, FAIL_ON_TYPE_ERROR, LOG_TYPE_ERROR};
    use std::sync::Arc;

    fn driver() -> MemorySource {
        MemorySource::new(
            "/robot/driver",
            [("rate", DynamicValue::Int(50)), ("port", DynamicValue::from("/dev/tty0"))]
                .into_iter()
                .collect(),
        )
    }

    #[test]
    fn test_join_namespace() {
        assert_eq!(join_namespace("/robot", "rate"), "/robot/rate");
        assert_eq!(join_namespace("/robot/", "rate"), "/robot/rate");
        assert_eq!(join_namespace("", "rate"), "rate");
    }

    #[test]
    fn test_root_param_from_source_uses_namespace() {
        let root = RootParam::from_source(&driver());
        let param = root.param();
        assert_eq!(param.member("rate").path().to_string(), "/robot/driver/rate");
    }

    #[test]
    fn test_member_access() {
        let source = driver();
        assert_eq!(get_source_param_member::<u32, _>(&source, "rate", &LOG_TYPE_ERROR), Ok(Some(50)));
        assert_eq!(get_source_param_member::<u32, _>(&source, "absent", &LOG_TYPE_ERROR), Ok(None));
        assert_eq!(get_optional_source_param(&source, "absent", 10u32, &LOG_TYPE_ERROR), Ok(10));
    }

    #[test]
    fn test_whole_tree_access() {
        let source = driver();
        let decoded = get_source_param::<std::collections::BTreeMap<String, String>, _>(&source, &LOG_TYPE_ERROR)
            .unwrap()
            .unwrap();
        assert_eq!(decoded["rate"], "50");
    }

    #[test]
    fn test_required_member_reports_namespace() {
        let collector = Arc::new(CollectTypeErrors::new());
        let strategy: SharedStrategy = collector.clone();
        let value: String = get_required_source_param(&driver(), "absent", &strategy).unwrap();
        assert!(value.is_empty());
        let errors = collector.errors();
        assert_eq!(errors.len(), 1);
        insta::assert_snapshot!(
            errors[0].to_string(),
            @"parameter /robot/driver/absent has wrong type: required parameter not available in /robot/driver/absent"
        );

        let rate = get_required_source_param::<u8, _>(&driver(), "rate", &FAIL_ON_TYPE_ERROR);
        assert_eq!(rate, Ok(50));
    }

    #[test]
    fn test_memory_source_reflects_updates() {
        let mut source = driver();
        source.value_mut().insert_if_absent("mode", DynamicValue::from("fast"));
        let root = RootParam::from_source(&source);
        assert_eq!(root.param().member("mode").decode::<String>(), Ok(Some("fast".to_owned())));
    }

    #[test]
    fn test_root_param_is_a_source() {
        let root = RootParam::new("/ns", DynamicValue::Int(1));
        assert_eq!(get_source_param::<i32, _>(&root, &LOG_TYPE_ERROR), Ok(Some(1)));
    }
}

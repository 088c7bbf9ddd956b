//! Loading YAML text into root parameters.

use crate::builder::{AliasPolicy, ValueBuilder};
use crate::error::IngestError;
use paramtree::{DynamicValue, RootParam, SharedStrategy, TypeError};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use yaml_rust2::parser::Parser;

/// Options controlling ingestion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YamlOptions {
    pub alias_policy: AliasPolicy,
}

impl YamlOptions {
    pub fn with_alias_policy(mut self, alias_policy: AliasPolicy) -> Self {
        self.alias_policy = alias_policy;
        self
    }
}

/// Converts the first document of `text` into a dynamic value.
pub fn ingest(text: &str) -> Result<DynamicValue, IngestError> {
    ingest_with_options(text, &YamlOptions::default())
}

pub fn ingest_with_options(text: &str, options: &YamlOptions) -> Result<DynamicValue, IngestError> {
    let mut parser = Parser::new_from_str(text);
    let mut builder = ValueBuilder::new(options.alias_policy);

    // false = single document only
    if let Err(err) = parser.load(&mut builder, false) {
        // A conversion error raised before the scanner gave up came first.
        return Err(builder.take_error().unwrap_or_else(|| err.into()));
    }
    builder.finish()
}

/// Loads `text` into a root parameter named `label`.
///
/// Failures are reported once through `strategy` and yield a root that does
/// not exist. `Err` is returned only when the strategy aborts.
pub fn load_yaml_str(text: &str, label: impl Into<String>, strategy: &SharedStrategy) -> Result<RootParam, TypeError> {
    load_yaml_str_with_options(text, label, strategy, &YamlOptions::default())
}

pub fn load_yaml_str_with_options(
    text: &str,
    label: impl Into<String>,
    strategy: &SharedStrategy,
    options: &YamlOptions,
) -> Result<RootParam, TypeError> {
    let label = label.into();
    tracing::debug!(label = %label, bytes = text.len(), "loading YAML");
    into_root(label, ingest_with_options(text, options), strategy)
}

/// Reads all of `reader` and loads it like [`load_yaml_str`].
pub fn load_yaml_reader<R: Read>(
    reader: R,
    label: impl Into<String>,
    strategy: &SharedStrategy,
) -> Result<RootParam, TypeError> {
    load_yaml_reader_with_options(reader, label, strategy, &YamlOptions::default())
}

pub fn load_yaml_reader_with_options<R: Read>(
    mut reader: R,
    label: impl Into<String>,
    strategy: &SharedStrategy,
    options: &YamlOptions,
) -> Result<RootParam, TypeError> {
    let label = label.into();
    let mut text = String::new();
    if let Err(err) = reader.read_to_string(&mut text) {
        return into_root(label, Err(err.into()), strategy);
    }
    load_yaml_str_with_options(&text, label, strategy, options)
}

/// Loads the file at `path`; paths in reports start with `<path>:`.
pub fn load_yaml_file(path: impl AsRef<Path>, strategy: &SharedStrategy) -> Result<RootParam, TypeError> {
    load_yaml_file_with_options(path, strategy, &YamlOptions::default())
}

pub fn load_yaml_file_with_options(
    path: impl AsRef<Path>,
    strategy: &SharedStrategy,
    options: &YamlOptions,
) -> Result<RootParam, TypeError> {
    let path = path.as_ref();
    let label = format!("{}:", path.display());
    match File::open(path) {
        Ok(file) => load_yaml_reader_with_options(BufReader::new(file), label, strategy, options),
        Err(err) => into_root(label, Err(err.into()), strategy),
    }
}

fn into_root(
    label: String,
    ingested: Result<DynamicValue, IngestError>,
    strategy: &SharedStrategy,
) -> Result<RootParam, TypeError> {
    match ingested {
        Ok(value) => Ok(RootParam::new(label, value).with_strategy(strategy.clone())),
        Err(error) => {
            tracing::debug!(label = %label, %error, "YAML ingestion failed");
            let root = RootParam::new(label, DynamicValue::Invalid).with_strategy(strategy.clone());
            root.handle_type_error(&error.report())?;
            Ok(root)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_flow_map() {
        let value = ingest("{a: 1, b: [x, 2.5]}").unwrap();
        assert_eq!(value.member("a"), Some(&DynamicValue::Int(1)));
        assert_eq!(
            value.member("b"),
            Some(&DynamicValue::Array(vec![DynamicValue::from("x"), DynamicValue::Double(2.5)]))
        );
    }

    #[test]
    fn test_ingest_reports_scanner_errors_as_parse_errors() {
        let error = ingest("{]").unwrap_err();
        assert!(matches!(error, IngestError::Parse { .. }), "{error:?}");
        assert!(error.report().starts_with("failed to parse YAML: "));
    }

    #[test]
    fn test_ingest_only_first_document() {
        assert_eq!(ingest("--- 1\n--- 2\n"), Ok(DynamicValue::Int(1)));
    }

    #[test]
    fn test_ingest_empty_text() {
        let error = ingest("").unwrap_err();
        assert!(error.report().starts_with("failed to convert YAML: "));
    }

    #[test]
    fn test_options_builder() {
        let options = YamlOptions::default().with_alias_policy(AliasPolicy::Resolve);
        assert_eq!(options.alias_policy, AliasPolicy::Resolve);
        assert_eq!(
            ingest_with_options("a: &x 3\nb: *x\n", &options).unwrap().member("b"),
            Some(&DynamicValue::Int(3))
        );
    }
}

//! # paramtree-yaml
//!
//! Ingestion of YAML text into [`paramtree`] dynamic values.
//!
//! The yaml-rust2 event parser drives a [`ValueBuilder`], which assembles the
//! first document of the stream into a [`DynamicValue`](paramtree::DynamicValue)
//! and resolves plain scalars to booleans, numbers, null and strings.
//!
//! The `load_yaml_*` functions wrap the result in a
//! [`RootParam`](paramtree::RootParam). Malformed input does not produce a
//! partial tree: it is reported once through the given type error strategy
//! and the returned root does not exist.
//!
//! ## Example
//!
//! ```rust
//! use paramtree::LOG_TYPE_ERROR;
//! use paramtree_yaml::load_yaml_str;
//!
//! let root = load_yaml_str("rate: 50\nports: [a, b]", "config.yaml:", &LOG_TYPE_ERROR).unwrap();
//! let param = root.param();
//! assert_eq!(param.member("rate").decode::<u8>(), Ok(Some(50)));
//! assert_eq!(param.member("ports").at(1).path().to_string(), "config.yaml:/ports/1");
//! ```

mod builder;
mod error;
mod loader;
mod scalar;

pub use builder::{AliasPolicy, ValueBuilder};
pub use error::IngestError;
pub use loader::{
    YamlOptions, ingest, ingest_with_options, load_yaml_file, load_yaml_file_with_options, load_yaml_reader,
    load_yaml_reader_with_options, load_yaml_str, load_yaml_str_with_options,
};
pub use scalar::{resolve_plain, resolve_scalar};

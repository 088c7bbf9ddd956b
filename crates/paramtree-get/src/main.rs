use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use paramtree::{DynamicValue, FAIL_ON_TYPE_ERROR, LOG_TYPE_ERROR, Param, TypeError};
use paramtree_yaml::{AliasPolicy, YamlOptions, load_yaml_file_with_options, load_yaml_reader_with_options};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Type a value is decoded as before printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Bool,
    Int,
    Float,
    String,
    /// The dynamic value in its canonical text.
    Value,
}

/// Print one value of a YAML parameter file
#[derive(Parser, Debug)]
#[command(name = "paramtree-get")]
#[command(about = "Decode and print a value from a YAML parameter file", long_about = None)]
struct Args {
    /// YAML document to read; standard input when omitted
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Slash-separated path to the value, e.g. `driver/rates/0`
    #[arg(long, default_value = "")]
    path: String,

    /// Type to decode the value as
    #[arg(long = "as", value_enum, default_value_t = Target::Value)]
    target: Target,

    /// Abort on the first type error instead of logging it
    #[arg(long)]
    strict: bool,

    /// Replace aliases with a copy of their anchored value
    #[arg(long)]
    resolve_aliases: bool,

    /// Log ingestion and decoding at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "paramtree=debug,paramtree_yaml=debug"
    } else {
        "paramtree=warn,paramtree_yaml=warn"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let strategy = if args.strict {
        FAIL_ON_TYPE_ERROR.clone()
    } else {
        LOG_TYPE_ERROR.clone()
    };
    let options = YamlOptions::default().with_alias_policy(if args.resolve_aliases {
        AliasPolicy::Resolve
    } else {
        AliasPolicy::Ignore
    });

    let root = match &args.input {
        Some(path) => load_yaml_file_with_options(path, &strategy, &options)?,
        None => load_yaml_reader_with_options(io::stdin().lock(), "<stdin>:", &strategy, &options)?,
    };
    tracing::debug!(key = root.key(), exists = root.exists(), "document loaded");

    let segments = split_path(&args.path);
    match lookup(&root.param(), &segments, args.target)? {
        Some(text) => {
            println!("{}", text);
            Ok(())
        }
        None => bail!("no {:?} value at '{}'", args.target, args.path),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Follows `segments` from `param` and renders the value found there.
///
/// A numeric segment indexes into arrays; on anything else it names a member.
fn lookup(param: &Param<'_>, segments: &[&str], target: Target) -> Result<Option<String>, TypeError> {
    let Some((segment, rest)) = segments.split_first() else {
        return render(param, target);
    };
    let child = match segment.parse::<usize>() {
        Ok(index) if param.is_array() => param.at(index),
        _ => param.member(*segment),
    };
    lookup(&child, rest, target)
}

fn render(param: &Param<'_>, target: Target) -> Result<Option<String>, TypeError> {
    Ok(match target {
        Target::Bool => param.decode::<bool>()?.map(|value| value.to_string()),
        Target::Int => param.decode::<i64>()?.map(|value| value.to_string()),
        Target::Float => param.decode::<f64>()?.map(|value| DynamicValue::Double(value).to_string()),
        Target::String => param.decode::<String>()?,
        Target::Value => param.decode::<DynamicValue>()?.map(|value| value.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use paramtree_yaml::load_yaml_str;

    fn get(text: &str, path: &str, target: Target) -> Result<Option<String>, TypeError> {
        let root = load_yaml_str(text, "t:", &FAIL_ON_TYPE_ERROR)?;
        let segments = split_path(path);
        lookup(&root.param(), &segments, target)
    }

    const DOC: &str = "driver:\n  rates: [10, 20]\n  gain: .inf\n  '0': zero\n";

    #[test]
    fn test_split_path_ignores_empty_segments() {
        assert_eq!(split_path("/a//b/"), ["a", "b"]);
        assert!(split_path("").is_empty());
    }

    #[test]
    fn test_lookup_indexes_arrays_and_members() {
        assert_eq!(get(DOC, "driver/rates/1", Target::Int), Ok(Some("20".to_owned())));
        assert_eq!(get(DOC, "driver/0", Target::String), Ok(Some("zero".to_owned())));
        assert_eq!(get(DOC, "driver/gain", Target::Float), Ok(Some(".inf".to_owned())));
        assert_eq!(get(DOC, "driver/rates", Target::Value), Ok(Some("[10, 20]".to_owned())));
        assert_eq!(get(DOC, "driver/absent", Target::Value), Ok(None));
    }

    #[test]
    fn test_strict_lookup_reports_path() {
        let error = get(DOC, "driver/rates", Target::Bool).unwrap_err();
        assert_eq!(error.path, "t:/driver/rates");
    }
}

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An option value that callers may hand over as a mapping, a list, or a single scalar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
  Mapping(Map<String, Value>),
  List(Vec<Value>),
  Scalar(Value),
}

impl OptionValue {
  /// Stringify into the list form used by `settings.remappings`: mappings become `key=value`
  /// pairs, lists are stringified element-wise and scalars become a one-element list.
  pub fn to_string_list(&self) -> Vec<String> {
    match self {
      OptionValue::Mapping(entries) => entries
        .iter()
        .map(|(key, value)| format!("{key}={}", stringify(value)))
        .collect(),
      OptionValue::List(values) => values.iter().map(stringify).collect(),
      OptionValue::Scalar(value) => vec![stringify(value)],
    }
  }

  /// The scalar rendition, if this value is a scalar.
  pub fn as_scalar_string(&self) -> Option<String> {
    match self {
      OptionValue::Scalar(value) => Some(stringify(value)),
      _ => None,
    }
  }
}

impl From<&str> for OptionValue {
  fn from(value: &str) -> Self {
    OptionValue::Scalar(Value::String(value.to_owned()))
  }
}

impl From<String> for OptionValue {
  fn from(value: String) -> Self {
    OptionValue::Scalar(Value::String(value))
  }
}

impl From<Vec<String>> for OptionValue {
  fn from(values: Vec<String>) -> Self {
    OptionValue::List(values.into_iter().map(Value::String).collect())
  }
}

impl From<IndexMap<String, String>> for OptionValue {
  fn from(entries: IndexMap<String, String>) -> Self {
    OptionValue::Mapping(
      entries
        .into_iter()
        .map(|(key, value)| (key, Value::String(value)))
        .collect(),
    )
  }
}

fn stringify(value: &Value) -> String {
  match value {
    Value::String(text) => text.clone(),
    other => other.to_string(),
  }
}

/// Source files accepted by `compile_files`: either a single path or an ordered list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceFiles {
  One(PathBuf),
  Many(Vec<PathBuf>),
}

impl SourceFiles {
  pub fn paths(&self) -> Vec<&Path> {
    match self {
      SourceFiles::One(path) => vec![path.as_path()],
      SourceFiles::Many(paths) => paths.iter().map(PathBuf::as_path).collect(),
    }
  }
}

impl From<PathBuf> for SourceFiles {
  fn from(path: PathBuf) -> Self {
    SourceFiles::One(path)
  }
}

impl From<&str> for SourceFiles {
  fn from(path: &str) -> Self {
    SourceFiles::One(PathBuf::from(path))
  }
}

impl From<Vec<PathBuf>> for SourceFiles {
  fn from(paths: Vec<PathBuf>) -> Self {
    SourceFiles::Many(paths)
  }
}

/// Flat keyword-style options shared by `compile_files` and `compile_source`. Keys use the
/// snake_case names of the solc wrapper; anything else lands in `unrecognized` and is rejected
/// during normalisation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub source_files: Option<SourceFiles>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub stdin: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output_values: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub import_remappings: Option<OptionValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_path: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allow_paths: Option<OptionValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output_dir: Option<PathBuf>,
  pub overwrite: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub evm_version: Option<OptionValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub revert_strings: Option<OptionValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub metadata_hash: Option<String>,
  pub metadata_literal: bool,
  pub optimize: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub optimize_runs: Option<u64>,
  pub optimize_yul: bool,
  pub no_optimize_yul: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub yul_optimizations: Option<Value>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solc_binary: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solc_version: Option<String>,
  pub allow_empty: bool,
  #[serde(flatten)]
  pub unrecognized: BTreeMap<String, Value>,
}

impl CompileOptions {
  /// Parse options from a loosely typed JSON object.
  pub fn from_value(value: Value) -> serde_json::Result<Self> {
    serde_json::from_value(value)
  }

  pub(crate) fn with_source_files(mut self, files: SourceFiles) -> Self {
    self.source_files = Some(files);
    self
  }

  pub(crate) fn with_stdin(mut self, source: impl Into<String>) -> Self {
    self.stdin = Some(source.into());
    self
  }

  /// Paths handed to `--allow-paths`, flattened to a list.
  pub fn allow_path_list(&self) -> Vec<PathBuf> {
    self
      .allow_paths
      .as_ref()
      .map(|paths| paths.to_string_list().into_iter().map(PathBuf::from).collect())
      .unwrap_or_default()
  }
}

/// Options accepted alongside a pre-built standard-JSON document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardJsonOptions {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub base_path: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub allow_paths: Option<OptionValue>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub output_dir: Option<PathBuf>,
  pub overwrite: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solc_binary: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solc_version: Option<String>,
  pub allow_empty: bool,
}

impl StandardJsonOptions {
  pub fn allow_path_list(&self) -> Vec<PathBuf> {
    self
      .allow_paths
      .as_ref()
      .map(|paths| paths.to_string_list().into_iter().map(PathBuf::from).collect())
      .unwrap_or_default()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn option_value_stringification_per_variant() {
    let mapping: OptionValue = serde_json::from_value(json!({
      "ds-test/": "lib/ds-test/src/",
      "@openzeppelin/": "lib/openzeppelin/"
    }))
    .unwrap();
    assert_eq!(
      mapping.to_string_list(),
      vec![
        "ds-test/=lib/ds-test/src/".to_string(),
        "@openzeppelin/=lib/openzeppelin/".to_string()
      ]
    );

    let list: OptionValue = serde_json::from_value(json!(["a=b", 7])).unwrap();
    assert_eq!(list.to_string_list(), vec!["a=b".to_string(), "7".to_string()]);

    let scalar = OptionValue::from("london");
    assert_eq!(scalar.to_string_list(), vec!["london".to_string()]);
    assert_eq!(scalar.as_scalar_string().as_deref(), Some("london"));
    assert_eq!(list.as_scalar_string(), None);
  }

  #[test]
  fn remapping_mapping_keeps_caller_order() {
    let entries: IndexMap<String, String> = [
      ("solmate/", "lib/solmate/src/"),
      ("forge-std/", "lib/forge-std/src/"),
      ("@uniswap/", "node_modules/@uniswap/"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect();
    assert_eq!(
      OptionValue::from(entries).to_string_list(),
      vec![
        "solmate/=lib/solmate/src/",
        "forge-std/=lib/forge-std/src/",
        "@uniswap/=node_modules/@uniswap/",
      ]
    );
  }

  #[test]
  fn compile_options_capture_unknown_keys() {
    let options = CompileOptions::from_value(json!({
      "stdin": "contract A {}",
      "optimize": true,
      "optimize_runs": 200,
      "via_ir": true
    }))
    .expect("parse options");

    assert_eq!(options.stdin.as_deref(), Some("contract A {}"));
    assert!(options.optimize);
    assert_eq!(options.optimize_runs, Some(200));
    assert_eq!(
      options.unrecognized.keys().collect::<Vec<_>>(),
      vec!["via_ir"]
    );
  }

  #[test]
  fn source_files_accepts_single_or_many() {
    let one: SourceFiles = serde_json::from_value(json!("contracts/A.sol")).unwrap();
    assert_eq!(one.paths(), vec![Path::new("contracts/A.sol")]);

    let many: SourceFiles = serde_json::from_value(json!(["A.sol", "B.sol"])).unwrap();
    assert_eq!(many.paths(), vec![Path::new("A.sol"), Path::new("B.sol")]);
  }
}

use std::fs;
use std::path::{Path, PathBuf};

use foundry_compilers::solc::Solc;
use serde_json::{json, Value};
use tracing::debug;

use crate::compiler::input::{normalize_options, CompilationRequest};
use crate::internal::errors::{Error, Result};
use crate::internal::options::{CompileOptions, SourceFiles, StandardJsonOptions};
use crate::internal::solc;

type BackendResult<T> = std::result::Result<T, SolcBackendError>;

/// The three compiler entry points that [`crate::CompilerFacade`] intercepts. Implementations
/// receive the caller's original arguments untouched.
pub trait CompilerBackend {
  type Output;
  type Error;

  fn compile_standard(
    &self,
    input: &CompilationRequest,
    options: &StandardJsonOptions,
  ) -> std::result::Result<Self::Output, Self::Error>;

  fn compile_files(
    &self,
    source_files: &SourceFiles,
    options: &CompileOptions,
  ) -> std::result::Result<Self::Output, Self::Error>;

  fn compile_source(
    &self,
    source: &str,
    options: &CompileOptions,
  ) -> std::result::Result<Self::Output, Self::Error>;
}

impl<B: CompilerBackend + ?Sized> CompilerBackend for &B {
  type Output = B::Output;
  type Error = B::Error;

  fn compile_standard(
    &self,
    input: &CompilationRequest,
    options: &StandardJsonOptions,
  ) -> std::result::Result<Self::Output, Self::Error> {
    (**self).compile_standard(input, options)
  }

  fn compile_files(
    &self,
    source_files: &SourceFiles,
    options: &CompileOptions,
  ) -> std::result::Result<Self::Output, Self::Error> {
    (**self).compile_files(source_files, options)
  }

  fn compile_source(
    &self,
    source: &str,
    options: &CompileOptions,
  ) -> std::result::Result<Self::Output, Self::Error> {
    (**self).compile_source(source, options)
  }
}

/// Failures raised by [`SolcBackend`] once the build-info pipeline has handed over.
#[derive(Debug, thiserror::Error)]
pub enum SolcBackendError {
  #[error(transparent)]
  Setup(#[from] Error),
  #[error("solc invocation failed: {0}")]
  Invocation(String),
  #[error("solc produced unreadable output: {0}")]
  Output(#[from] serde_json::Error),
  #[error("solc returned no contracts; pass allow_empty to accept an empty compilation")]
  Empty,
}

/// Output values requested when the caller does not pass `output_values`.
pub const DEFAULT_OUTPUT_VALUES: [&str; 4] =
  ["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"];

/// Backend that runs a local `solc` through Foundry's wrapper using standard-JSON for every
/// entry point.
#[derive(Clone, Debug, Default)]
pub struct SolcBackend {
  default_binary: Option<PathBuf>,
}

impl SolcBackend {
  pub fn new(default_binary: Option<PathBuf>) -> Self {
    Self { default_binary }
  }

  fn solc(
    &self,
    solc_binary: Option<&Path>,
    solc_version: Option<&str>,
    allow_paths: Vec<PathBuf>,
  ) -> Result<Solc> {
    let mut solc = solc::resolve_solc(solc_binary, solc_version, self.default_binary.as_deref())?;
    solc.allow_paths.extend(allow_paths);
    Ok(solc)
  }

  fn run(&self, solc: &Solc, input: &Value) -> BackendResult<Value> {
    debug!(version = %solc.version, "invoking solc with standard-JSON input");
    let raw = solc
      .compile_output(input)
      .map_err(|err| SolcBackendError::Invocation(err.to_string()))?;
    Ok(serde_json::from_slice(&raw)?)
  }

  fn compile_flat(&self, options: &CompileOptions) -> BackendResult<Value> {
    let mut request = normalize_options(options)?;
    request.settings_mut().insert(
      "outputSelection".to_string(),
      output_selection(options.output_values.as_deref()),
    );
    let solc = self.solc(
      options.solc_binary.as_deref(),
      options.solc_version.as_deref(),
      options.allow_path_list(),
    )?;
    let output = self.run(&solc, &request.to_value()?)?;
    finish(output, options.allow_empty, options.output_dir.as_deref(), options.overwrite)
  }
}

impl CompilerBackend for SolcBackend {
  type Output = Value;
  type Error = SolcBackendError;

  fn compile_standard(
    &self,
    input: &CompilationRequest,
    options: &StandardJsonOptions,
  ) -> BackendResult<Value> {
    let solc = self.solc(
      options.solc_binary.as_deref(),
      options.solc_version.as_deref(),
      options.allow_path_list(),
    )?;
    let output = self.run(&solc, &input.to_value()?)?;
    finish(output, options.allow_empty, options.output_dir.as_deref(), options.overwrite)
  }

  fn compile_files(
    &self,
    source_files: &SourceFiles,
    options: &CompileOptions,
  ) -> BackendResult<Value> {
    self.compile_flat(&options.clone().with_source_files(source_files.clone()))
  }

  fn compile_source(&self, source: &str, options: &CompileOptions) -> BackendResult<Value> {
    self.compile_flat(&options.clone().with_stdin(source))
  }
}

fn output_selection(output_values: Option<&[String]>) -> Value {
  let outputs: Vec<String> = match output_values {
    Some(values) if !values.is_empty() => values.to_vec(),
    _ => DEFAULT_OUTPUT_VALUES.iter().map(|value| value.to_string()).collect(),
  };
  json!({ "*": { "*": outputs, "": ["ast"] } })
}

fn has_contracts(output: &Value) -> bool {
  output
    .get("contracts")
    .and_then(Value::as_object)
    .is_some_and(|files| {
      files
        .values()
        .any(|contracts| contracts.as_object().is_some_and(|map| !map.is_empty()))
    })
}

fn finish(
  output: Value,
  allow_empty: bool,
  output_dir: Option<&Path>,
  overwrite: bool,
) -> BackendResult<Value> {
  if !allow_empty && !has_contracts(&output) {
    return Err(SolcBackendError::Empty);
  }
  if let Some(dir) = output_dir {
    write_output(dir, &output, overwrite)?;
  }
  Ok(output)
}

fn write_output(dir: &Path, output: &Value, overwrite: bool) -> Result<()> {
  fs::create_dir_all(dir).map_err(|err| Error::persistence(dir, err))?;
  let path = dir.join("output.json");
  if path.exists() && !overwrite {
    return Err(Error::PersistenceFailure {
      path,
      reason: "output file exists and overwrite is false".to_string(),
      source: None,
    });
  }
  let serialised = serde_json::to_vec_pretty(output).map_err(|err| Error::PersistenceFailure {
    path: path.clone(),
    reason: err.to_string(),
    source: None,
  })?;
  fs::write(&path, serialised).map_err(|err| Error::persistence(&path, err))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_output_selection_covers_artifacts() {
    assert_eq!(
      output_selection(None),
      json!({
        "*": {
          "*": ["abi", "evm.bytecode", "evm.deployedBytecode", "metadata"],
          "": ["ast"]
        }
      })
    );
    assert_eq!(
      output_selection(Some(&["abi".to_string()])),
      json!({ "*": { "*": ["abi"], "": ["ast"] } })
    );
  }

  #[test]
  fn empty_output_requires_allow_empty() {
    let empty = json!({ "contracts": {}, "sources": {} });
    assert!(matches!(
      finish(empty.clone(), false, None, false),
      Err(SolcBackendError::Empty)
    ));
    assert_eq!(finish(empty.clone(), true, None, false).unwrap(), empty);

    let populated = json!({ "contracts": { "A.sol": { "A": { "abi": [] } } } });
    assert!(finish(populated, false, None, false).is_ok());
  }

  #[test]
  fn output_dir_respects_overwrite() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = json!({ "contracts": { "A.sol": { "A": {} } } });
    write_output(temp.path(), &output, false).expect("first write");
    assert!(write_output(temp.path(), &output, false).is_err());
    write_output(temp.path(), &output, true).expect("overwrite");
  }
}

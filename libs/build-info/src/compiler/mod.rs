use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::internal::config::BuildInfoConfig;
use crate::internal::errors::{CompileError, Result};
use crate::internal::options::{CompileOptions, SourceFiles, StandardJsonOptions};
use crate::internal::path::prepare_output_directory;
use crate::internal::solc::resolve_version;
pub use backend::{CompilerBackend, SolcBackend, SolcBackendError, DEFAULT_OUTPUT_VALUES};
pub use build_info::{read_build_infos, write_build_info, BuildInfo, BUILD_INFO_FORMAT};
pub use input::{
  normalize_options, normalize_standard_json, resolve_urls, CompilationRequest, SourceEntry,
  SOLIDITY_LANGUAGE, STDIN_SOURCE_KEY,
};

mod backend;
mod build_info;
mod input;


/// Compiler façade that records a build-info artifact for every call before delegating to the
/// wrapped backend. Hosts construct one through [`CompilerFacade::activate`] and use it wherever
/// they would have called the backend directly; each activation yields an independent instance.
#[derive(Clone, Debug)]
pub struct CompilerFacade<B> {
  backend: B,
  config: BuildInfoConfig,
  artifacts_dir: PathBuf,
}

impl<B: CompilerBackend> CompilerFacade<B> {
  /// Create (or empty) `<root>/artifacts/build-info` and wrap `backend`. Existing entries are
  /// deleted here, once per activation, never on individual compilation calls.
  pub fn activate(config: BuildInfoConfig, backend: B) -> Result<Self> {
    let artifacts_dir = config.artifacts_dir();
    let removed = prepare_output_directory(&artifacts_dir)?;
    info!(
      dir = %artifacts_dir.display(),
      removed,
      "saving solc build info"
    );
    Ok(Self {
      backend,
      config,
      artifacts_dir,
    })
  }

  /// Shorthand for [`CompilerFacade::activate`] with the default configuration rooted at `root`.
  pub fn activate_at<P: AsRef<Path>>(root: P, backend: B) -> Result<Self> {
    Self::activate(BuildInfoConfig::new(root.as_ref()), backend)
  }

  /// Compile a standard-JSON document. Location-based sources are resolved to literal content in
  /// the artifact, while the backend still receives `input` exactly as given.
  pub fn compile_standard(
    &self,
    input: &CompilationRequest,
    options: &StandardJsonOptions,
  ) -> std::result::Result<B::Output, CompileError<B::Error>> {
    let normalised = normalize_standard_json(input.clone(), options.base_path.as_deref())?;
    self.persist(
      &normalised,
      options.solc_binary.as_deref(),
      options.solc_version.as_deref(),
    )?;
    self
      .backend
      .compile_standard(input, options)
      .map_err(CompileError::Backend)
  }

  /// Like [`CompilerFacade::compile_standard`] but accepts an untyped JSON document.
  pub fn compile_standard_value(
    &self,
    input: Value,
    options: &StandardJsonOptions,
  ) -> std::result::Result<B::Output, CompileError<B::Error>> {
    let input = CompilationRequest::from_value(input)?;
    self.compile_standard(&input, options)
  }

  /// Compile one or more files from disk. Each file is keyed by its base name in the artifact.
  pub fn compile_files(
    &self,
    source_files: &SourceFiles,
    options: &CompileOptions,
  ) -> std::result::Result<B::Output, CompileError<B::Error>> {
    let normalised = normalize_options(&options.clone().with_source_files(source_files.clone()))?;
    self.persist(
      &normalised,
      options.solc_binary.as_deref(),
      options.solc_version.as_deref(),
    )?;
    self
      .backend
      .compile_files(source_files, options)
      .map_err(CompileError::Backend)
  }

  /// Compile inline source text, recorded under the `<stdin>` source key.
  pub fn compile_source(
    &self,
    source: &str,
    options: &CompileOptions,
  ) -> std::result::Result<B::Output, CompileError<B::Error>> {
    let normalised = normalize_options(&options.clone().with_stdin(source))?;
    self.persist(
      &normalised,
      options.solc_binary.as_deref(),
      options.solc_version.as_deref(),
    )?;
    self
      .backend
      .compile_source(source, options)
      .map_err(CompileError::Backend)
  }

  /// Directory the build-info artifacts are written to.
  pub fn artifacts_dir(&self) -> &Path {
    &self.artifacts_dir
  }

  pub fn config(&self) -> &BuildInfoConfig {
    &self.config
  }

  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Consume the façade and hand back the wrapped backend.
  pub fn into_backend(self) -> B {
    self.backend
  }

  fn persist(
    &self,
    request: &CompilationRequest,
    solc_binary: Option<&Path>,
    solc_version: Option<&str>,
  ) -> Result<PathBuf> {
    let version = resolve_version(solc_binary, solc_version, self.config.default_solc_binary())?;
    write_build_info(&self.artifacts_dir, request, &version)
  }
}

impl CompilerFacade<SolcBackend> {
  /// Activate with a [`SolcBackend`] that shares the configured default binary.
  pub fn with_solc(config: BuildInfoConfig) -> Result<Self> {
    let backend = SolcBackend::new(config.default_solc_binary.clone());
    Self::activate(config, backend)
  }
}

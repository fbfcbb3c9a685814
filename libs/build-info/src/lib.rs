//! Records a hardhat-style build-info artifact for every Solidity compilation.
//!
//! [`CompilerFacade`] wraps a [`CompilerBackend`] and exposes the same three entry points
//! (`compile_standard`, `compile_files`, `compile_source`). Each call is normalised into a
//! canonical standard-JSON document, tagged with the resolved solc version, written to
//! `<root>/artifacts/build-info/<random>.json`, and only then forwarded to the backend.

mod compiler;
mod internal;

pub use compiler::{
  normalize_options, normalize_standard_json, read_build_infos, resolve_urls, write_build_info,
  BuildInfo, CompilationRequest, CompilerBackend, CompilerFacade, SolcBackend, SolcBackendError,
  SourceEntry, BUILD_INFO_FORMAT, DEFAULT_OUTPUT_VALUES, SOLIDITY_LANGUAGE, STDIN_SOURCE_KEY,
};
pub use internal::config::{BuildInfoConfig, BuildInfoConfigOptions};
pub use internal::errors::{map_version_failure, CompileError, Error, Result};
pub use internal::options::{CompileOptions, OptionValue, SourceFiles, StandardJsonOptions};
pub use internal::path::{build_info_dir, prepare_output_directory, source_key};
pub use internal::settings::{
  DebuggingSettings, OptimizerDetails, OptimizerSettings, SettingsBag, SettingsMetadata,
};
pub use internal::solc::resolve_version;

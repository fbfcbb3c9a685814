use std::path::{Path, PathBuf};

use foundry_compilers::solc::Solc;
use semver::Version;
use tracing::trace;

use super::errors::{map_version_failure, Error, Result};

/// Executable queried when neither an explicit binary nor a configured default is available.
pub(crate) const DEFAULT_SOLC_BINARY: &str = "solc";

pub(crate) fn parse_version(version: &str) -> Result<Version> {
  let trimmed = version.trim().trim_start_matches('v');
  map_version_failure(Version::parse(trimmed), "Failed to parse solc version")
}

/// Locate the `solc` executable that should be used when the caller did not pick a version.
pub(crate) fn active_binary(solc_binary: Option<&Path>, default_binary: Option<&Path>) -> PathBuf {
  solc_binary
    .or(default_binary)
    .map(Path::to_path_buf)
    .unwrap_or_else(|| PathBuf::from(DEFAULT_SOLC_BINARY))
}

/// Spawn `binary --version` through Foundry and return the parsed handle.
pub(crate) fn query_solc(binary: &Path) -> Result<Solc> {
  map_version_failure(
    Solc::new(binary),
    format!("Failed to query solc executable at {}", binary.display()),
  )
}

pub(crate) fn find_installed_version(version: &Version) -> Result<Option<Solc>> {
  map_version_failure(
    Solc::find_svm_installed_version(version),
    "Failed to inspect solc versions",
  )
}

/// Determine the version recorded in the build-info artifact. An explicit version always wins
/// and is recorded exactly as given; otherwise the active executable is queried. This is
/// independent from whatever the backend ends up running, so the two can disagree when the
/// caller mixes binaries and versions.
pub fn resolve_version(
  solc_binary: Option<&Path>,
  solc_version: Option<&str>,
  default_binary: Option<&Path>,
) -> Result<String> {
  if let Some(version) = solc_version {
    trace!(version, "using explicit solc version");
    return Ok(version.to_string());
  }

  let binary = active_binary(solc_binary, default_binary);
  trace!(binary = %binary.display(), "querying solc version");
  let solc = query_solc(&binary)?;
  Ok(solc.version.to_string())
}

/// Resolve a full `Solc` handle for the backend, preferring an explicit binary, then an
/// svm-installed copy of the requested version, then the default executable.
pub(crate) fn resolve_solc(
  solc_binary: Option<&Path>,
  solc_version: Option<&str>,
  default_binary: Option<&Path>,
) -> Result<Solc> {
  if let Some(binary) = solc_binary {
    return query_solc(binary);
  }
  if let Some(version) = solc_version {
    let version = parse_version(version)?;
    return find_installed_version(&version)?.ok_or_else(|| {
      Error::VersionResolutionFailure(format!(
        "Solc {version} is not installed. Install it with svm first."
      ))
    });
  }
  query_solc(&active_binary(None, default_binary))
}

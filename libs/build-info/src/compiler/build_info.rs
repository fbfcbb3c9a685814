use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compiler::input::CompilationRequest;
use crate::internal::errors::{Error, Result};

/// Format tag understood by hardhat-compatible build-info consumers.
pub const BUILD_INFO_FORMAT: &str = "hh-sol-build-info-1";

/// One persisted compilation record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
  #[serde(rename = "_format")]
  pub format: String,
  pub solc_version: String,
  pub input: CompilationRequest,
}

impl BuildInfo {
  pub fn new(input: CompilationRequest, solc_version: impl Into<String>) -> Self {
    BuildInfo {
      format: BUILD_INFO_FORMAT.to_string(),
      solc_version: solc_version.into(),
      input,
    }
  }

  pub fn read(path: &Path) -> Result<Self> {
    let raw = fs::read_to_string(path).map_err(|err| Error::persistence(path, err))?;
    serde_json::from_str(&raw).map_err(|err| Error::PersistenceFailure {
      path: path.to_path_buf(),
      reason: format!("malformed build info: {err}"),
      source: None,
    })
  }
}

/// Random 32 hex character file name; no content addressing, so identical inputs never share a
/// file.
pub(crate) fn random_file_name() -> String {
  let bytes: [u8; 16] = rand::random();
  format!("{}.json", hex::encode(bytes))
}

/// Persist `input` tagged with `solc_version` into a freshly named file inside `dir`.
pub fn write_build_info(
  dir: &Path,
  input: &CompilationRequest,
  solc_version: &str,
) -> Result<PathBuf> {
  let build_info = BuildInfo::new(input.clone(), solc_version);
  let path = dir.join(random_file_name());
  let serialised = serde_json::to_vec_pretty(&build_info).map_err(|err| {
    Error::PersistenceFailure {
      path: path.clone(),
      reason: format!("build info not serialisable: {err}"),
      source: None,
    }
  })?;

  if let Err(err) = fs::write(&path, serialised) {
    let _ = fs::remove_file(&path);
    return Err(Error::persistence(&path, err));
  }
  debug!(path = %path.display(), solc_version, "wrote build info");
  Ok(path)
}

/// Read every `*.json` build info in `dir`, ordered by file name.
pub fn read_build_infos(dir: &Path) -> Result<Vec<BuildInfo>> {
  let mut paths = Vec::new();
  for entry in fs::read_dir(dir).map_err(|err| Error::persistence(dir, err))? {
    let path = entry.map_err(|err| Error::persistence(dir, err))?.path();
    if path.extension().is_some_and(|ext| ext == "json") {
      paths.push(path);
    }
  }
  paths.sort();
  paths.iter().map(|path| BuildInfo::read(path)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::compiler::input::SourceEntry;
  use indexmap::IndexMap;
  use serde_json::{json, Map};

  fn sample_request() -> CompilationRequest {
    let mut sources = IndexMap::new();
    sources.insert("A.sol".to_string(), SourceEntry::content("contract A {}"));
    CompilationRequest::new(sources, Map::new())
  }

  #[test]
  fn file_names_are_32_hex_chars() {
    let name = random_file_name();
    let stem = name.strip_suffix(".json").expect("json suffix");
    assert_eq!(stem.len(), 32);
    assert!(stem.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(random_file_name(), name);
  }

  #[test]
  fn writes_two_space_indented_document() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = write_build_info(temp.path(), &sample_request(), "0.8.30").expect("write");

    let raw = fs::read_to_string(&path).expect("read");
    assert!(raw.starts_with("{\n  \"_format\": \"hh-sol-build-info-1\""));
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(
      value,
      json!({
        "_format": "hh-sol-build-info-1",
        "solcVersion": "0.8.30",
        "input": {
          "language": "Solidity",
          "sources": { "A.sol": { "content": "contract A {}" } },
          "settings": {}
        }
      })
    );
    assert_eq!(BuildInfo::read(&path).expect("read back").input, sample_request());
  }

  #[test]
  fn missing_directory_is_a_persistence_failure() {
    let temp = tempfile::tempdir().expect("tempdir");
    let err = write_build_info(&temp.path().join("absent"), &sample_request(), "0.8.30")
      .unwrap_err();
    assert!(matches!(err, Error::PersistenceFailure { .. }));
  }

  #[test]
  fn read_build_infos_skips_other_files() {
    let temp = tempfile::tempdir().expect("tempdir");
    write_build_info(temp.path(), &sample_request(), "0.8.30").expect("write");
    fs::write(temp.path().join("notes.txt"), "ignore me").expect("notes");
    let infos = read_build_infos(temp.path()).expect("read");
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].format, BUILD_INFO_FORMAT);
  }
}

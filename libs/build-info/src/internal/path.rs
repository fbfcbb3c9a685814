use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use super::errors::{Error, Result};

/// `<root>/artifacts/build-info`, the directory hardhat-style tooling scans for build infos.
pub fn build_info_dir(project_root: &Path) -> PathBuf {
  project_root.join("artifacts").join("build-info")
}

/// Base file name (directory stripped) used as the standard-JSON source key.
pub fn source_key(path: &Path) -> String {
  path
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Create `dir` if needed and delete every entry inside it. Symlinks are unlinked rather than
/// followed. Returns the number of removed entries.
pub fn prepare_output_directory(dir: &Path) -> Result<usize> {
  fs::create_dir_all(dir).map_err(|err| Error::persistence(dir, err))?;

  let entries = fs::read_dir(dir).map_err(|err| Error::persistence(dir, err))?;
  let mut removed = 0;
  for entry in entries {
    let entry = entry.map_err(|err| Error::persistence(dir, err))?;
    let path = entry.path();
    let file_type = entry
      .file_type()
      .map_err(|err| Error::persistence(&path, err))?;
    let outcome = if file_type.is_dir() {
      fs::remove_dir_all(&path)
    } else {
      fs::remove_file(&path)
    };
    outcome.map_err(|err| Error::persistence(&path, err))?;
    trace!(path = %path.display(), "removed stale build-info entry");
    removed += 1;
  }
  Ok(removed)
}

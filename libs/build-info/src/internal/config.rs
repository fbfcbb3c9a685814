use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::internal::path::build_info_dir;

/// Finalised configuration consumed by [`crate::CompilerFacade`].
#[derive(Clone, Debug, PartialEq)]
pub struct BuildInfoConfig {
  /// Project root; artifacts land under `<root>/artifacts/build-info`.
  pub project_root: PathBuf,
  /// Executable queried for its version when a call names neither binary nor version.
  pub default_solc_binary: Option<PathBuf>,
}

impl Default for BuildInfoConfig {
  fn default() -> Self {
    BuildInfoConfig {
      project_root: PathBuf::from("."),
      default_solc_binary: None,
    }
  }
}

impl BuildInfoConfig {
  pub fn new(project_root: impl Into<PathBuf>) -> Self {
    BuildInfoConfig {
      project_root: project_root.into(),
      ..Default::default()
    }
  }

  pub fn artifacts_dir(&self) -> PathBuf {
    build_info_dir(&self.project_root)
  }

  pub fn default_solc_binary(&self) -> Option<&Path> {
    self.default_solc_binary.as_deref()
  }

  pub fn from_options(options: Option<BuildInfoConfigOptions>) -> Self {
    Self::default().merge_options(options.as_ref())
  }

  /// Apply overrides on top of this configuration; unset fields keep their current value.
  pub fn merge_options(&self, options: Option<&BuildInfoConfigOptions>) -> Self {
    let mut merged = self.clone();
    let Some(options) = options else {
      return merged;
    };
    if let Some(root) = &options.project_root {
      merged.project_root = root.clone();
    }
    if let Some(binary) = &options.default_solc_binary {
      merged.default_solc_binary = Some(binary.clone());
    }
    merged
  }
}

/// Optional overrides for constructing a [`BuildInfoConfig`], loadable from JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildInfoConfigOptions {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub project_root: Option<PathBuf>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_solc_binary: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn defaults_point_at_current_directory() {
    let config = BuildInfoConfig::from_options(None);
    assert_eq!(config.project_root, PathBuf::from("."));
    assert_eq!(config.default_solc_binary(), None);
    assert_eq!(
      config.artifacts_dir(),
      PathBuf::from("./artifacts/build-info")
    );
  }

  #[test]
  fn options_override_only_set_fields() {
    let base = BuildInfoConfig {
      project_root: PathBuf::from("/repo"),
      default_solc_binary: Some(PathBuf::from("/usr/bin/solc")),
    };
    let options: BuildInfoConfigOptions =
      serde_json::from_value(json!({ "projectRoot": "/other" })).expect("options");
    let merged = base.merge_options(Some(&options));
    assert_eq!(merged.project_root, PathBuf::from("/other"));
    assert_eq!(
      merged.default_solc_binary(),
      Some(Path::new("/usr/bin/solc"))
    );
  }

  #[test]
  fn unknown_config_keys_are_rejected() {
    let parsed = serde_json::from_value::<BuildInfoConfigOptions>(json!({ "cacheDir": "x" }));
    assert!(parsed.is_err());
  }
}

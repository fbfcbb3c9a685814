use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{Error, Result};
use super::options::{CompileOptions, OptionValue};

/// Standard-JSON `settings` assembled from flat compiler flags. Sub-objects only exist when at
/// least one of their children was requested, so an untouched option never shows up as a
/// default-valued key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsBag {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub remappings: Option<Vec<String>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub evm_version: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub debug: Option<DebuggingSettings>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub metadata: Option<SettingsMetadata>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub optimizer: Option<OptimizerSettings>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebuggingSettings {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub revert_strings: Option<OptionValue>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsMetadata {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub bytecode_hash: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub use_literal_content: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerSettings {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub enabled: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub runs: Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub details: Option<OptimizerDetails>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizerDetails {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub yul: Option<bool>,
}

impl SettingsBag {
  /// Translate each recognised flag independently and merge the results.
  pub fn from_options(options: &CompileOptions) -> Result<Self> {
    if options.yul_optimizations.is_some() {
      return Err(Error::unsupported(
        "YUL optimization steps (yul_optimizations) are not currently supported",
      ));
    }

    Ok(SettingsBag {
      remappings: options
        .import_remappings
        .as_ref()
        .map(OptionValue::to_string_list),
      evm_version: evm_version(options.evm_version.as_ref())?,
      debug: debugging(options),
      metadata: metadata(options),
      optimizer: optimizer(options),
    })
  }

  /// Render as the JSON object stored under `settings`.
  pub fn into_map(self) -> Result<Map<String, Value>> {
    Ok(serde_json::from_value(serde_json::to_value(self)?)?)
  }
}

fn evm_version(value: Option<&OptionValue>) -> Result<Option<String>> {
  match value {
    None => Ok(None),
    Some(value) => value.as_scalar_string().map(Some).ok_or_else(|| {
      Error::unsupported("evm_version must be a single value, not a list or mapping")
    }),
  }
}

fn debugging(options: &CompileOptions) -> Option<DebuggingSettings> {
  options
    .revert_strings
    .clone()
    .map(|revert_strings| DebuggingSettings {
      revert_strings: Some(revert_strings),
    })
}

fn metadata(options: &CompileOptions) -> Option<SettingsMetadata> {
  let bytecode_hash = options.metadata_hash.clone();
  let use_literal_content = options.metadata_literal.then_some(true);
  if bytecode_hash.is_none() && use_literal_content.is_none() {
    return None;
  }
  Some(SettingsMetadata {
    bytecode_hash,
    use_literal_content,
  })
}

fn optimizer(options: &CompileOptions) -> Option<OptimizerSettings> {
  let enabled = options.optimize.then_some(true);
  let runs = options.optimize_runs;
  let details = options
    .optimize_yul
    .then_some(OptimizerDetails { yul: Some(true) });
  if enabled.is_none() && runs.is_none() && details.is_none() {
    return None;
  }
  Some(OptimizerSettings {
    enabled,
    runs,
    details,
  })
}

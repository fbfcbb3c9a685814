use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::trace;

use crate::internal::errors::{Error, Result};
use crate::internal::options::CompileOptions;
use crate::internal::path::source_key;
use crate::internal::settings::SettingsBag;

pub const SOLIDITY_LANGUAGE: &str = "Solidity";

/// Source key used for inline source text.
pub const STDIN_SOURCE_KEY: &str = "<stdin>";

/// Location prefixes served by content-addressed or distributed storage.
const REMOTE_URL_MARKERS: [&str; 3] = ["ipfs://", "bzzr:", "bzz-raw:"];

const REQUEST_KEYS: [&str; 3] = ["language", "sources", "settings"];
const SOURCE_KEYS: [&str; 2] = ["content", "urls"];

/// Canonical standard-JSON compiler input. Fields beyond `language`, `sources` and `settings`
/// are carried through untouched, and a parsed document is written back in its original key
/// order.
#[derive(Clone, Debug)]
pub struct CompilationRequest {
  pub language: String,
  pub sources: IndexMap<String, SourceEntry>,
  /// `None` when the document had no `settings` key at all.
  pub settings: Option<Map<String, Value>>,
  pub extra: Map<String, Value>,
  key_order: Vec<String>,
}

/// One named unit of source: literal `content` or a `urls` fallback chain.
#[derive(Clone, Debug, Default)]
pub struct SourceEntry {
  pub content: Option<String>,
  pub urls: Option<Vec<String>>,
  pub extra: Map<String, Value>,
  key_order: Vec<String>,
}

impl SourceEntry {
  pub fn content(content: impl Into<String>) -> Self {
    SourceEntry {
      content: Some(content.into()),
      ..Default::default()
    }
  }

  pub fn urls(urls: Vec<String>) -> Self {
    SourceEntry {
      urls: Some(urls),
      ..Default::default()
    }
  }

  pub fn is_resolved(&self) -> bool {
    self.urls.is_none() && self.content.is_some()
  }
}

// Key order is presentation only.
impl PartialEq for SourceEntry {
  fn eq(&self, other: &Self) -> bool {
    self.content == other.content && self.urls == other.urls && self.extra == other.extra
  }
}

impl PartialEq for CompilationRequest {
  fn eq(&self, other: &Self) -> bool {
    self.language == other.language
      && self.sources == other.sources
      && self.settings == other.settings
      && self.extra == other.extra
  }
}

/// Keys in emission order: the recorded order first, then known fields, then extras.
fn emission_order<'a>(
  recorded: &'a [String],
  known: &[&'static str],
  extra: &'a Map<String, Value>,
) -> Vec<&'a str> {
  let mut keys: Vec<&'a str> = recorded.iter().map(String::as_str).collect();
  for key in known.iter().copied().chain(extra.keys().map(String::as_str)) {
    if !keys.contains(&key) {
      keys.push(key);
    }
  }
  keys
}

impl Serialize for SourceEntry {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    for key in emission_order(&self.key_order, &SOURCE_KEYS, &self.extra) {
      match key {
        "content" => {
          if let Some(content) = &self.content {
            map.serialize_entry(key, content)?;
          }
        }
        "urls" => {
          if let Some(urls) = &self.urls {
            map.serialize_entry(key, urls)?;
          }
        }
        other => {
          if let Some(value) = self.extra.get(other) {
            map.serialize_entry(other, value)?;
          }
        }
      }
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for SourceEntry {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let mut fields = Map::<String, Value>::deserialize(deserializer)?;
    let key_order = fields.keys().cloned().collect();
    let content = fields
      .shift_remove("content")
      .map(serde_json::from_value)
      .transpose()
      .map_err(D::Error::custom)?;
    let urls = fields
      .shift_remove("urls")
      .map(serde_json::from_value)
      .transpose()
      .map_err(D::Error::custom)?;
    Ok(SourceEntry {
      content,
      urls,
      extra: fields,
      key_order,
    })
  }
}

impl Serialize for CompilationRequest {
  fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(None)?;
    for key in emission_order(&self.key_order, &REQUEST_KEYS, &self.extra) {
      match key {
        "language" => map.serialize_entry(key, &self.language)?,
        "sources" => map.serialize_entry(key, &self.sources)?,
        "settings" => {
          if let Some(settings) = &self.settings {
            map.serialize_entry(key, settings)?;
          }
        }
        other => {
          if let Some(value) = self.extra.get(other) {
            map.serialize_entry(other, value)?;
          }
        }
      }
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for CompilationRequest {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
    let mut fields = Map::<String, Value>::deserialize(deserializer)?;
    let key_order = fields.keys().cloned().collect();
    let language = match fields.shift_remove("language") {
      Some(Value::String(language)) => language,
      Some(other) => {
        return Err(D::Error::custom(format!(
          "language must be a string, got {other}"
        )))
      }
      None => return Err(D::Error::missing_field("language")),
    };
    let sources = match fields.shift_remove("sources") {
      Some(sources) => serde_json::from_value(sources).map_err(D::Error::custom)?,
      None => return Err(D::Error::missing_field("sources")),
    };
    let settings = match fields.shift_remove("settings") {
      Some(Value::Object(settings)) => Some(settings),
      Some(other) => {
        return Err(D::Error::custom(format!(
          "settings must be an object, got {other}"
        )))
      }
      None => None,
    };
    Ok(CompilationRequest {
      language,
      sources,
      settings,
      extra: fields,
      key_order,
    })
  }
}

impl CompilationRequest {
  pub fn new(sources: IndexMap<String, SourceEntry>, settings: Map<String, Value>) -> Self {
    CompilationRequest {
      language: SOLIDITY_LANGUAGE.to_string(),
      sources,
      settings: Some(settings),
      extra: Map::new(),
      key_order: Vec::new(),
    }
  }

  /// Parse a loosely typed standard-JSON document.
  pub fn from_value(value: Value) -> Result<Self> {
    serde_json::from_value(value)
      .map_err(|err| Error::unsupported(format!("malformed standard-JSON input: {err}")))
  }

  pub fn to_value(&self) -> Result<Value> {
    Ok(serde_json::to_value(self)?)
  }

  /// Mutable access to `settings`, creating the object if the document had none.
  pub fn settings_mut(&mut self) -> &mut Map<String, Value> {
    self.settings.get_or_insert_with(Map::new)
  }

  fn validate_sources(&self) -> Result<()> {
    if self.sources.is_empty() {
      return Err(Error::missing_source("standard-JSON input has no sources"));
    }
    for (name, entry) in &self.sources {
      if name.is_empty() {
        return Err(Error::missing_source("source entries must have a non-empty name"));
      }
      if entry.content.is_none() && entry.urls.as_ref().map_or(true, Vec::is_empty) {
        return Err(Error::missing_source(format!(
          "source `{name}` has neither content nor urls"
        )));
      }
    }
    Ok(())
  }
}

/// Replace every `urls` chain with the contents of its last location. Entries that already hold
/// content are left alone, so running this twice is a no-op.
pub fn resolve_urls(mut request: CompilationRequest) -> Result<CompilationRequest> {
  for (name, entry) in request.sources.iter_mut() {
    let Some(last_url) = entry.urls.as_ref().and_then(|urls| urls.last()) else {
      continue;
    };
    let content = read_local_source(last_url)?;
    trace!(source = %name, url = %last_url, "resolved source url");
    *entry = SourceEntry::content(content);
  }
  Ok(request)
}

fn read_local_source(url: &str) -> Result<String> {
  if REMOTE_URL_MARKERS.iter().any(|marker| url.contains(marker)) {
    return Err(Error::UnsupportedRemoteSource {
      url: url.to_string(),
    });
  }
  let content = fs::read_to_string(url).map_err(|err| Error::read(url, err))?;
  if content.is_empty() {
    return Err(Error::ReadFailure {
      url: url.to_string(),
      reason: "file is empty".to_string(),
      source: None,
    });
  }
  Ok(content)
}

/// Normalise a pre-built standard-JSON document: every source is resolved to literal content.
pub fn normalize_standard_json(
  input: CompilationRequest,
  base_path: Option<&Path>,
) -> Result<CompilationRequest> {
  if let Some(base_path) = base_path {
    return Err(Error::unsupported(format!(
      "base path {} was provided; base path remapping is not supported",
      base_path.display()
    )));
  }
  input.validate_sources()?;
  resolve_urls(input)
}

/// Build the canonical standard-JSON document equivalent to a flat `compile_files` /
/// `compile_source` invocation.
pub fn normalize_options(options: &CompileOptions) -> Result<CompilationRequest> {
  if !options.unrecognized.is_empty() {
    let names: Vec<&str> = options.unrecognized.keys().map(String::as_str).collect();
    return Err(Error::unsupported(format!(
      "unsupported arguments {names:?}; the solc wrapper may be newer than this crate"
    )));
  }
  if let Some(base_path) = &options.base_path {
    return Err(Error::unsupported(format!(
      "base path {} was provided; base path remapping is not supported",
      base_path.display()
    )));
  }

  let sources = sources_from_options(options)?;
  let settings = SettingsBag::from_options(options)?.into_map()?;
  trace!(sources = sources.len(), "normalised flat compiler options");

  resolve_urls(CompilationRequest::new(sources, settings))
}

fn sources_from_options(options: &CompileOptions) -> Result<IndexMap<String, SourceEntry>> {
  match (&options.source_files, &options.stdin) {
    (Some(_), Some(_)) => Err(Error::missing_source(
      "exactly one of source_files or stdin may be provided, not both",
    )),
    (None, None) => Err(Error::missing_source("no source files or stdin specified")),
    (None, Some(stdin)) => {
      let mut sources = IndexMap::new();
      sources.insert(STDIN_SOURCE_KEY.to_string(), SourceEntry::content(stdin.clone()));
      Ok(sources)
    }
    (Some(files), None) => {
      let paths = files.paths();
      if paths.is_empty() {
        return Err(Error::missing_source("source_files is an empty list"));
      }
      let mut sources = IndexMap::with_capacity(paths.len());
      for path in paths {
        let key = source_key(path);
        if sources.contains_key(&key) {
          return Err(Error::unsupported(format!(
            "two source files share the file name `{key}`"
          )));
        }
        let url = path.to_string_lossy().into_owned();
        sources.insert(key, SourceEntry::urls(vec![url]));
      }
      Ok(sources)
    }
  }
}

use std::fmt::Display;
use std::io;
use std::path::PathBuf;

/// Canonical error type raised by the normalisation and persistence pipeline. Every variant is
/// detected before the compiler backend runs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// Neither source files nor inline source text were supplied (or both were).
  #[error("missing source: {0}")]
  MissingSource(String),

  /// A base path, YUL optimisation steps, or an unrecognised option was requested.
  #[error("unsupported configuration: {0}")]
  UnsupportedConfiguration(String),

  /// The final location of a source points at IPFS/Swarm storage.
  #[error("remote file compilation is not supported (url={url})")]
  UnsupportedRemoteSource { url: String },

  #[error("could not read source contents at url={url}: {reason}")]
  ReadFailure {
    url: String,
    reason: String,
    #[source]
    source: Option<io::Error>,
  },

  #[error("could not resolve solc version: {0}")]
  VersionResolutionFailure(String),

  #[error("could not persist build info at {}: {reason}", path.display())]
  PersistenceFailure {
    path: PathBuf,
    reason: String,
    #[source]
    source: Option<io::Error>,
  },

  /// A request or settings value could not be converted to JSON.
  #[error("could not encode compiler input: {0}")]
  Encoding(#[from] serde_json::Error),
}

impl Error {
  pub fn unsupported(message: impl Into<String>) -> Self {
    Self::UnsupportedConfiguration(message.into())
  }

  pub fn missing_source(message: impl Into<String>) -> Self {
    Self::MissingSource(message.into())
  }

  pub(crate) fn read(url: impl Into<String>, source: io::Error) -> Self {
    Self::ReadFailure {
      url: url.into(),
      reason: source.to_string(),
      source: Some(source),
    }
  }

  pub(crate) fn persistence(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::PersistenceFailure {
      path: path.into(),
      reason: source.to_string(),
      source: Some(source),
    }
  }

  /// Build a [`Error::VersionResolutionFailure`] prefixed with `context`.
  pub fn version_failure(context: impl AsRef<str>, cause: impl Display) -> Self {
    let mut message = context.as_ref().to_owned();
    if !message.ends_with(':') {
      message.push(':');
    }
    message.push(' ');
    message.push_str(&cause.to_string());
    Self::VersionResolutionFailure(message)
  }
}

/// Result alias bound to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Turn a version lookup error from `result` into [`Error::VersionResolutionFailure`],
/// annotated with `context`.
pub fn map_version_failure<T, E>(
  result: std::result::Result<T, E>,
  context: impl AsRef<str>,
) -> Result<T>
where
  E: Display,
{
  result.map_err(|err| Error::version_failure(context, err))
}

/// Failure surfaced by [`crate::CompilerFacade`]: either the build-info pipeline rejected the call
/// before compilation, or the backend itself failed and its error is handed back untouched.
#[derive(Debug, thiserror::Error)]
pub enum CompileError<E> {
  #[error(transparent)]
  BuildInfo(#[from] Error),
  #[error("compiler backend failed: {0}")]
  Backend(E),
}

impl<E> CompileError<E> {
  /// The pipeline error, if the call never reached the backend.
  pub fn build_info(&self) -> Option<&Error> {
    match self {
      CompileError::BuildInfo(err) => Some(err),
      CompileError::Backend(_) => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn version_failure_joins_with_colon() {
    let err = Error::version_failure("Failed to parse solc version", "unexpected end of input");
    assert_eq!(
      err.to_string(),
      "could not resolve solc version: Failed to parse solc version: unexpected end of input"
    );
  }

  #[test]
  fn json_faults_are_encoding_errors() {
    let fault = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let err = Error::from(fault);
    assert!(matches!(err, Error::Encoding(_)));
    assert!(!matches!(err, Error::UnsupportedConfiguration(_)));
  }

  #[test]
  fn persistence_failure_reports_path() {
    let err = Error::persistence(
      "/tmp/artifacts/build-info",
      io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("/tmp/artifacts/build-info"));
    assert!(rendered.contains("denied"));
  }
}

//! Solidity version detection from `pragma solidity` directives.
//!
//! Pragmas are found by scanning the raw source text, so this works even on
//! files that do not parse.

use semver::Version;
use std::{error, fmt};

/// Version information extracted from a `pragma solidity` directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedVersion {
  /// The raw pragma value, e.g. `^0.8.0`
  pub raw: String,
  /// The constraint operator, e.g. `^` or `>=`, empty when none was given
  pub constraint: String,
  /// The version the constraint applies to
  pub version: Version,
}

impl fmt::Display for DetectedVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}{}", self.constraint, self.version)
  }
}

/// A problem detecting the Solidity version of a source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
  /// The source contains no `pragma solidity` directive
  NoPragma,
  /// The pragma value does not start with a version constraint
  InvalidVersion(String),
}

impl VersionError {
  /// The message describing what has gone wrong
  #[must_use]
  pub fn message(&self) -> String {
    match self {
      Self::NoPragma => "no pragma solidity found".into(),
      Self::InvalidVersion(raw) => format!("invalid pragma version: {raw}"),
    }
  }
}

impl fmt::Display for VersionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl error::Error for VersionError {}

/// Extract the first `pragma solidity` directive from source code.
///
/// # Errors
/// [`VersionError::NoPragma`] when the source has no pragma, or
/// [`VersionError::InvalidVersion`] when its value is not a version.
pub fn detect(source: &str) -> Result<DetectedVersion, VersionError> {
  let raw = raw_pragmas(source).next().ok_or(VersionError::NoPragma)?;
  parse_pragma(raw)
}

/// Extract every well-formed `pragma solidity` directive from source code.
///
/// # Errors
/// [`VersionError::NoPragma`] when no well-formed pragma was found.
pub fn detect_all(source: &str) -> Result<Vec<DetectedVersion>, VersionError> {
  let detected: Vec<DetectedVersion> = raw_pragmas(source)
    .filter_map(|raw| parse_pragma(raw).ok())
    .collect();

  if detected.is_empty() {
    return Err(VersionError::NoPragma);
  }
  Ok(detected)
}

/// The raw values of `pragma solidity <value>;` directives in the source
fn raw_pragmas(source: &str) -> impl Iterator<Item = &str> + '_ {
  source.match_indices("pragma").filter_map(move |(index, _)| {
    let rest = &source[index + "pragma".len()..];

    let after_pragma = rest.trim_start();
    if after_pragma.len() == rest.len() {
      return None; // no whitespace after `pragma`
    }

    let rest = after_pragma.strip_prefix("solidity")?;
    let after_solidity = rest.trim_start();
    if after_solidity.len() == rest.len() {
      return None;
    }

    let end = after_solidity.find(';')?;
    Some(after_solidity[..end].trim())
  })
}

fn parse_pragma(raw: &str) -> Result<DetectedVersion, VersionError> {
  let (constraint, rest) = split_constraint(raw);

  let version_end = rest
    .find(|character: char| !character.is_ascii_digit() && character != '.')
    .unwrap_or(rest.len());
  let version = parse_version(&rest[..version_end])
    .ok_or_else(|| VersionError::InvalidVersion(raw.to_owned()))?;

  Ok(DetectedVersion {
    raw: raw.to_owned(),
    constraint: constraint.to_owned(),
    version,
  })
}

fn split_constraint(raw: &str) -> (&str, &str) {
  for operator in [">=", "<=", "^", "~", ">", "<", "="] {
    if let Some(rest) = raw.strip_prefix(operator) {
      return (operator, rest);
    }
  }
  ("", raw)
}

/// Parse `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`, padding a missing patch
fn parse_version(value: &str) -> Option<Version> {
  let mut parts = value.split('.');

  let major = parts.next()?.parse().ok()?;
  let minor = parts.next()?.parse().ok()?;
  let patch = match parts.next() {
    Some(patch) => patch.parse().ok()?,
    None => 0,
  };
  if parts.next().is_some() {
    return None;
  }

  Some(Version::new(major, minor, patch))
}

//! Source-control version identity.
//!
//! Computed once per configure from git, injected into the generator as
//! `WELDER_*` cache variables, and read back from the generator cache by the
//! artifact assembler to locate prebuilt content for the same revision.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::consts::{GENERATOR_CACHE, VAR_PREFIX};
use crate::process::{ProcessError, RunOptions, run};

pub const REVISION_VAR: &str = "REVISION";
pub const CHANGESET_VAR: &str = "CHANGESET";

static CACHE_LINE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"(?m)^(?<name>[a-zA-Z0-9_-]+):UNINITIALIZED=(?<value>.*?)\r?$").unwrap());

#[derive(Debug, Error)]
pub enum VersionError {
  #[error("git {args} failed: {source}")]
  Git {
    args: String,
    #[source]
    source: ProcessError,
  },

  #[error("failed to read generator cache '{path}': {source}")]
  ReadCache {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("generator cache '{path}' does not define {name}")]
  MissingVariable { path: PathBuf, name: String },
}

/// Everything the generator is told about the source revision.
///
/// The default identity has every field empty; it stands in for a checkout
/// without git history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionIdentity {
  /// Number of commits reachable from HEAD.
  pub revision: String,
  pub short_changeset: String,
  pub changeset: String,
  /// Commit date of HEAD, `YYYY-MM-DD`.
  pub changeset_date: String,
}

impl VersionIdentity {
  /// Query git in `repo` for the identity of HEAD.
  pub async fn query(repo: &Path) -> Result<Self, VersionError> {
    let (revision, short_changeset, changeset, changeset_date) = tokio::try_join!(
      git(repo, &["rev-list", "--count", "HEAD"]),
      git(repo, &["log", "-1", "--pretty=%h", "--abbrev=12"]),
      git(repo, &["log", "-1", "--pretty=%H"]),
      git(repo, &["log", "-1", "--pretty=%cd", "--date=format:%Y-%m-%d"]),
    )?;

    let identity = Self {
      revision,
      short_changeset,
      changeset,
      changeset_date,
    };
    debug!(revision = %identity.revision, changeset = %identity.changeset, "queried version identity");
    Ok(identity)
  }
}

/// The part of the identity that namespaces prebuilt content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentVersion {
  pub revision: String,
  pub changeset: String,
}

impl ContentVersion {
  /// Read the identity back out of a configured build directory.
  pub fn from_build_dir(build_dir: &Path) -> Result<Self, VersionError> {
    let path = build_dir.join(GENERATOR_CACHE);
    let vars = read_cache_variables(&path)?;

    let lookup = |suffix: &str| {
      let name = var_name(suffix);
      vars.get(&name).cloned().ok_or_else(|| VersionError::MissingVariable {
        path: path.clone(),
        name,
      })
    };

    Ok(Self {
      revision: lookup(REVISION_VAR)?,
      changeset: lookup(CHANGESET_VAR)?,
    })
  }

  /// Directory name under the prebuilt content root.
  ///
  /// Must stay in sync with whatever writes prebuilt content.
  pub fn prebuilt_dir_name(&self) -> String {
    format!("Version-{}-{}", self.revision, self.changeset)
  }
}

/// Project-prefixed generator variable name, e.g. `WELDER_REVISION`.
pub fn var_name(suffix: &str) -> String {
  format!("{VAR_PREFIX}_{suffix}")
}

/// Collect every `NAME:UNINITIALIZED=VALUE` entry of a generator cache.
pub fn parse_cache_variables(contents: &str) -> BTreeMap<String, String> {
  CACHE_LINE
    .captures_iter(contents)
    .map(|caps| (caps["name"].to_string(), caps["value"].to_string()))
    .collect()
}

pub fn read_cache_variables(path: &Path) -> Result<BTreeMap<String, String>, VersionError> {
  let contents = std::fs::read_to_string(path).map_err(|source| VersionError::ReadCache {
    path: path.to_path_buf(),
    source,
  })?;
  Ok(parse_cache_variables(&contents))
}

async fn git(repo: &Path, args: &[&str]) -> Result<String, VersionError> {
  let output = run("git", args, &RunOptions::new().in_dir(repo).checked())
    .await
    .map_err(|source| VersionError::Git {
      args: args.join(" "),
      source,
    })?;
  Ok(output.stdout_trimmed().to_string())
}

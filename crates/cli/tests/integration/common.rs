//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Isolated project tree.
///
/// Each test gets its own temporary directory holding the root marker and the
/// fixed top-level directories.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn project() -> Self {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join(".welder"), "").unwrap();
    for dir in ["Libraries", "Resources", "Build"] {
      std::fs::create_dir_all(temp.path().join(dir)).unwrap();
    }
    Self { temp }
  }

  /// Project root as the binary will report it.
  pub fn root(&self) -> PathBuf {
    dunce::canonicalize(self.temp.path()).unwrap()
  }

  pub fn path(&self, relative: &str) -> PathBuf {
    self.temp.path().join(relative)
  }

  /// Write a file relative to the project root.
  pub fn write_file(&self, relative: &str, content: &str) -> PathBuf {
    let path = self.path(relative);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// Get a pre-configured Command for the welder binary.
  ///
  /// `WELDER_ROOT` pins discovery to this project and `RUST_LOG` is cleared so
  /// the default log level applies.
  pub fn welder_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("welder");
    cmd.current_dir(self.temp.path());
    cmd.env("WELDER_ROOT", self.temp.path());
    cmd.env_remove("RUST_LOG");
    cmd
  }
}

pub fn read(path: &Path) -> Vec<u8> {
  std::fs::read(path).unwrap()
}

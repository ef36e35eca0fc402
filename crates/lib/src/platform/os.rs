use std::fmt;

use serde::Serialize;

/// Host operating systems, named the way the generator variables expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HostOs {
  Windows,
  Mac,
  Linux,
}

impl HostOs {
  /// Detect the current operating system at runtime.
  ///
  /// Every Unix that is not macOS is treated as Linux.
  pub fn current() -> Self {
    Self::from_os_name(std::env::consts::OS)
  }

  fn from_os_name(name: &str) -> Self {
    match name {
      "windows" => Self::Windows,
      "macos" => Self::Mac,
      _ => Self::Linux,
    }
  }

  /// Returns the canonical name used in combo aliases and directory names
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Windows => "Windows",
      Self::Mac => "Mac",
      Self::Linux => "Linux",
    }
  }

  /// Suffix appended to executables built for this host.
  pub fn exe_extension(&self) -> &'static str {
    match self {
      Self::Windows => ".exe",
      Self::Mac | Self::Linux => "",
    }
  }
}

impl fmt::Display for HostOs {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_unix_maps_to_linux() {
    assert_eq!(HostOs::from_os_name("freebsd"), HostOs::Linux);
    assert_eq!(HostOs::from_os_name("macos"), HostOs::Mac);
    assert_eq!(HostOs::from_os_name("windows"), HostOs::Windows);
  }

  #[test]
  fn only_windows_has_exe_extension() {
    assert_eq!(HostOs::Windows.exe_extension(), ".exe");
    assert_eq!(HostOs::Linux.exe_extension(), "");
    assert_eq!(HostOs::Mac.exe_extension(), "");
  }
}

//! Build configuration resolution.
//!
//! A [`Combo`] is produced by looking up a named alias in a fixed table and
//! shallow-merging explicit overrides on top, field by field. No cross-field
//! validation happens here: a combination the generator cannot build is
//! rejected later by the generator itself, with a better diagnostic.

use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::platform::HostOs;
use crate::report::Reporter;

pub const NINJA: &str = "Ninja";
pub const CLANG: &str = "Clang";
pub const MSVC: &str = "MSVC";
pub const EMSCRIPTEN: &str = "Emscripten";
pub const X64: &str = "X64";

/// Alias substituted for any name not in the table.
pub const DEFAULT_ALIAS: &str = "Empty";

/// One fully-specified buildable configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Combo {
  pub architecture: String,
  pub builder: String,
  pub config: String,
  pub platform: String,
  pub targetos: String,
  pub toolchain: String,
}

impl Combo {
  pub fn uses_ninja(&self) -> bool {
    self.builder == NINJA
  }

  pub fn is_clang(&self) -> bool {
    self.toolchain == CLANG
  }

  pub fn is_msvc(&self) -> bool {
    self.toolchain == MSVC
  }

  pub fn is_emscripten(&self) -> bool {
    self.toolchain == EMSCRIPTEN
  }
}

impl fmt::Display for Combo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {} {} {} {} {}",
      self.targetos, self.builder, self.toolchain, self.platform, self.architecture, self.config
    )
  }
}

/// Per-field overrides applied on top of an alias. `None` keeps the alias value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboOverrides {
  pub architecture: Option<String>,
  pub builder: Option<String>,
  pub config: Option<String>,
  pub platform: Option<String>,
  pub targetos: Option<String>,
  pub toolchain: Option<String>,
}

impl ComboOverrides {
  /// Merge onto `combo`; every `Some` field wins.
  pub fn apply(&self, mut combo: Combo) -> Combo {
    let fields = [
      (&mut combo.architecture, &self.architecture),
      (&mut combo.builder, &self.builder),
      (&mut combo.config, &self.config),
      (&mut combo.platform, &self.platform),
      (&mut combo.targetos, &self.targetos),
      (&mut combo.toolchain, &self.toolchain),
    ];
    for (field, value) in fields {
      if let Some(value) = value {
        field.clone_from(value);
      }
    }
    combo
  }
}

struct Alias {
  name: &'static str,
  architecture: &'static str,
  builder: &'static str,
  config: &'static str,
  platform: &'static str,
  /// `None` targets the host.
  targetos: Option<&'static str>,
  toolchain: &'static str,
}

const ALIASES: &[Alias] = &[
  Alias {
    name: "Empty",
    architecture: "ANY",
    builder: NINJA,
    config: "Release",
    platform: "Stub",
    targetos: None,
    toolchain: CLANG,
  },
  Alias {
    name: "Emscripten",
    architecture: "WASM",
    builder: NINJA,
    config: "Release",
    platform: "Emscripten",
    targetos: Some("Emscripten"),
    toolchain: EMSCRIPTEN,
  },
  Alias {
    name: "Linux",
    architecture: "ANY",
    builder: NINJA,
    config: "Release",
    platform: "SDLSTDEmpty",
    targetos: Some("Linux"),
    toolchain: CLANG,
  },
  Alias {
    name: "Windows",
    architecture: X64,
    builder: "Visual Studio 16 2019",
    config: "Any",
    platform: "Windows",
    targetos: Some("Windows"),
    toolchain: MSVC,
  },
];

impl Alias {
  fn to_combo(&self, host: HostOs) -> Combo {
    Combo {
      architecture: self.architecture.to_string(),
      builder: self.builder.to_string(),
      config: self.config.to_string(),
      platform: self.platform.to_string(),
      targetos: self.targetos.unwrap_or(host.as_str()).to_string(),
      toolchain: self.toolchain.to_string(),
    }
  }
}

/// Names of every alias in the table.
pub fn alias_names() -> impl Iterator<Item = &'static str> {
  ALIASES.iter().map(|alias| alias.name)
}

/// Look up an alias by exact name.
pub fn lookup_alias(name: &str, host: HostOs) -> Option<Combo> {
  ALIASES.iter().find(|alias| alias.name == name).map(|alias| alias.to_combo(host))
}

/// Resolve an alias (defaulting to the host OS name) plus overrides into a [`Combo`].
///
/// An unknown alias is reported and replaced by [`DEFAULT_ALIAS`]; this never fails.
pub fn resolve(alias: Option<&str>, overrides: &ComboOverrides, host: HostOs, reporter: &Reporter) -> Combo {
  let name = alias.unwrap_or(host.as_str());

  let base = lookup_alias(name, host).unwrap_or_else(|| {
    warn!(alias = %name, fallback = DEFAULT_ALIAS, "undefined combo alias");
    reporter.error(&format!("Undefined alias {name}, choosing alias {DEFAULT_ALIAS}"));
    // The default alias is always present in the table
    ALIASES[0].to_combo(host)
  });

  let combo = overrides.apply(base);
  debug!(alias = %name, combo = %combo, "resolved combo");
  combo
}

//! Names fixed by the on-disk and generator contracts.

use std::time::Duration;

/// Marker file identifying the project root.
pub const ROOT_MARKER: &str = ".welder";

pub const LIBRARIES_DIR: &str = "Libraries";
pub const RESOURCES_DIR: &str = "Resources";
pub const BUILD_DIR: &str = "Build";
pub const PREBUILT_CONTENT_DIR: &str = "PrebuiltContent";
pub const DOCUMENTATION_DIR: &str = "Documentation";
pub const DOXYFILE: &str = "Doxyfile";

/// Name of the link under the build root that points at the current build.
pub const ACTIVE_LINK: &str = "Active";

/// Prefix of every generator variable injected by the flag synthesizer.
pub const VAR_PREFIX: &str = "WELDER";

/// Generator cache file inside a build directory.
pub const GENERATOR_CACHE: &str = "CMakeCache.txt";

pub const VFS_ARCHIVE: &str = "FileSystem.zip";

/// Environment variable naming the WebAssembly toolchain root.
pub const EMSCRIPTEN_ENV: &str = "EMSCRIPTEN";

/// Environment variable overriding project root discovery.
pub const ROOT_ENV: &str = "WELDER_ROOT";

/// Canonical first line of every house-formatted source file.
pub const FILE_HEADER: &str = "// MIT Licensed (see LICENSE.md).";

/// Files starting with this are vendored and exempt from house formatting.
pub const EXTERNAL_SENTINEL: &str = "// External.";

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(10);
pub const HEARTBEAT_LINE: &str = "Working...";

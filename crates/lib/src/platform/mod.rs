//! Host detection and project filesystem layout.

pub mod link;
pub mod os;
pub mod paths;

pub use os::HostOs;
pub use paths::ProjectDirs;

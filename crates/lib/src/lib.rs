//! welder-lib: build orchestration for the Welder engine
//!
//! This crate provides the pieces driven by the `welder` binary:
//! - `Combo`: a fully specified build configuration resolved from an alias
//! - `BuildDir`: the per-combo build directory and the `Build/Active` link
//! - toolchain flag synthesis and version identity for the generator
//! - VFS and package archive assembly
//! - the validate/fix source formatting pipeline

pub mod activate;
pub mod assemble;
pub mod combo;
pub mod consts;
pub mod format;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod report;
pub mod toolchain;
pub mod util;
pub mod version;

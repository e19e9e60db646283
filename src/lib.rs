//! # Repack Core Library
//!
//! This crate provides the core functionality for the `repack` packaging
//! wrappers: thin, property-driven front-ends for `jpackage`, `WiX` and
//! `Inno Setup` that turn a platform-independent application bundle into an
//! installable artifact.
//!
//! ## Key Modules
//!
//! - [`archive`]: The deterministic tar/gzip archive builder. Its output is
//!   a pure function of the tree's relative paths, file contents and
//!   executable bits, which makes the produced tarballs reproducible.
//! - [`props`]: Java-style `.properties` configuration parsing.
//! - [`exec`]: External tool invocation with concurrent output draining.
//! - [`jpackage`]: Argument construction, image pruning and metadata extras
//!   for `jpackage` app-image and Debian package builds.
//! - [`wix`]: WiX v4 source generation for Windows installers.

pub mod archive;
pub mod cli;
pub mod exec;
pub mod inno;
pub mod jpackage;
pub mod props;
pub mod wix;

pub mod error;
pub use error::PackError;

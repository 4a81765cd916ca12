//! # devrun-core - Core Domain Types
//!
//! Foundation crate for devrun. Provides the run configuration, packager
//! endpoint/state types, error handling and logging setup.
//!
//! This crate has **zero internal dependencies**.
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`RunConfig`] - Immutable input to one orchestration run
//! - [`PackagerEndpoint`] - Host and port the packager listens on
//! - [`PackagerState`] - Down, Starting, Up or Failed
//! - [`PlatformTaskResult`], [`PlatformReport`] - Per-platform outcomes
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Error enum with an [`ErrorKind`] classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//!
//! ## Prelude
//!
//! ```rust
//! use devrun_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use types::{
    DeviceSelector, NativeBuildType, PackagerEndpoint, PackagerState, Platform, PlatformReport,
    PlatformTaskResult, RunConfig, DEFAULT_CONFIG_FILE, DEFAULT_PACKAGER_PORT,
};

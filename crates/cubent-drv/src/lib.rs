//! The `cubent` binary's library half: configuration, source discovery,
//! datapack assembly, and the `Session` that orchestrates a compile.
//!
//! Exposed as a library (rather than folded into `main.rs`) so integration
//! tests can drive a `Session` directly, the way
//! `faxc-drv/tests/integration_test.rs` drives `faxc_drv::Session`.

mod assemble;
mod config;
mod discover;
mod error;
mod session;
mod version_info;

pub use assemble::{assemble, AssembleOptions};
pub use config::{Config, EngineVersion, VersionSpec, DEFAULT_DESCRIPTION};
pub use discover::discover;
pub use error::{DriverError, DriverResult};
pub use session::Session;
pub use version_info::{StaticVersionInfoProvider, VersionInfoProvider};

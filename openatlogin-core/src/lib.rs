//! openatlogin core library — job identity, LaunchAgent descriptor, paths, errors.
//!
//! Public API surface:
//! - [`types`] — [`JobLabel`] newtype and the [`LaunchAgent`] descriptor
//! - [`environment`] — the [`Environment`] capability and [`HostEnvironment`]
//! - [`descriptor`] — identity / descriptor builders, XML plist codec
//! - [`paths`] — agent-definitions dir, descriptor path, launchd domain
//! - [`error`] — [`CoreError`]

pub mod descriptor;
pub mod environment;
pub mod error;
pub mod paths;
pub mod types;

pub use descriptor::{build_descriptor, build_identity};
pub use environment::{Environment, HostEnvironment};
pub use error::CoreError;
pub use types::{JobLabel, LaunchAgent};

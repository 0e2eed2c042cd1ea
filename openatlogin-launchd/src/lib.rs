//! launchd registration for the open-at-login LaunchAgent: descriptor file
//! on disk plus `launchctl` bootstrap / kickstart / bootout.

pub mod background;
pub mod controller;
pub mod runner;

pub use background::{apply_in_background, Intent, ToggleReport};
pub use controller::{CommandStep, DisableReport, EnableReport, RegistrationController, StepOutcome};
pub use runner::{CommandRunner, Launchctl, ProcessRunner, LAUNCHCTL_PATH, SPAWN_FAILURE_STATUS};

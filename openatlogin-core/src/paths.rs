use std::path::{Path, PathBuf};

use crate::types::JobLabel;

pub const DESCRIPTOR_EXTENSION: &str = "plist";

pub fn launch_agents_dir(home: &Path) -> PathBuf {
    home.join("Library").join("LaunchAgents")
}

/// `<agent_dir>/<label>.plist`
pub fn descriptor_path(agent_dir: &Path, label: &JobLabel) -> PathBuf {
    agent_dir.join(format!("{label}.{DESCRIPTOR_EXTENSION}"))
}

/// The GUI session domain of `uid`, e.g. `gui/501`.
pub fn service_domain(uid: u32) -> String {
    format!("gui/{uid}")
}

/// `<domain>/<label>`, the service target for `kickstart` and `bootout`.
pub fn service_target(domain: &str, label: &JobLabel) -> String {
    format!("{domain}/{label}")
}

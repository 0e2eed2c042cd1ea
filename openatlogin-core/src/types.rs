//! Domain types for the login-item LaunchAgent.
//!
//! The descriptor is a plain serde struct; field order matches the key order
//! written to disk.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The launchd job label, e.g. `com.example.MyApp.openatlogin`.
///
/// Used both as the descriptor file stem and as the service name inside the
/// per-user domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobLabel(pub String);

impl JobLabel {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for JobLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobLabel {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// A per-user LaunchAgent definition, serialized as
/// `~/Library/LaunchAgents/<Label>.plist`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LaunchAgent {
    pub label: JobLabel,
    pub program_arguments: Vec<String>,
    pub run_at_load: bool,
    pub limit_load_to_session_type: String,
}

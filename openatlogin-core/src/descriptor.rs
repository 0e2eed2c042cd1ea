//! Job identity and LaunchAgent descriptor builders.
//!
//! Both builders are pure functions of the [`Environment`] at call time and
//! never fail. The program is started through `open -a <bundle>` rather than
//! the bundle's executable, so the registration survives the binary moving
//! inside an unmoved bundle.

use crate::environment::Environment;
use crate::error::CoreError;
use crate::types::{JobLabel, LaunchAgent};

/// Identifier substituted when the application has none (e.g. dev builds).
pub const FALLBACK_APP_ID: &str = "com.example.MyApp";

pub const LABEL_SUFFIX: &str = ".openatlogin";

pub const OPEN_EXECUTABLE: &str = "/usr/bin/open";

/// Restricts the job to GUI login sessions.
pub const AQUA_SESSION: &str = "Aqua";

/// `<app-id>.openatlogin`, falling back to [`FALLBACK_APP_ID`] when the
/// identifier is missing or not a valid bundle identifier.
///
/// The label becomes a file name under the LaunchAgents dir and a launchd
/// service name, so anything that could carry a path component is rejected.
pub fn build_identity(env: &impl Environment) -> JobLabel {
    let app_id = env
        .application_identifier()
        .map(|id| id.trim().to_string())
        .filter(|id| is_bundle_identifier(id))
        .unwrap_or_else(|| FALLBACK_APP_ID.to_string());
    JobLabel(format!("{app_id}{LABEL_SUFFIX}"))
}

/// ASCII alphanumerics and `-`, in non-empty `.`-separated components.
pub fn is_bundle_identifier(id: &str) -> bool {
    !id.is_empty()
        && id.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

pub fn build_descriptor(env: &impl Environment) -> LaunchAgent {
    LaunchAgent {
        label: build_identity(env),
        program_arguments: vec![
            OPEN_EXECUTABLE.to_string(),
            "-a".to_string(),
            env.application_bundle_path().display().to_string(),
        ],
        run_at_load: true,
        limit_load_to_session_type: AQUA_SESSION.to_string(),
    }
}

impl LaunchAgent {
    /// Encode as an XML property list.
    pub fn to_xml(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, self)?;
        Ok(buf)
    }

    /// Decode from property list bytes (XML or binary).
    pub fn from_xml(bytes: &[u8]) -> Result<Self, CoreError> {
        Ok(plist::from_bytes(bytes)?)
    }
}

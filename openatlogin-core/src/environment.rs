//! Ambient host lookups, behind a trait so builders and the controller can be
//! driven from fixed values in tests.

use std::path::{Path, PathBuf};

use plist::Value;

use crate::error::{io_err, CoreError};
use crate::paths::launch_agents_dir;

/// What the descriptor builder and registration controller need to know about
/// the running application and the logged-in user.
pub trait Environment {
    /// Numeric id of the current user; selects the `gui/<uid>` domain.
    fn current_user_id(&self) -> u32;

    /// Bundle identifier of the running application, if it has one.
    fn application_identifier(&self) -> Option<String>;

    /// On-disk path of the application bundle (or bare executable).
    fn application_bundle_path(&self) -> PathBuf;

    /// `~/Library/LaunchAgents` for the current user.
    fn per_user_agent_dir(&self) -> PathBuf;
}

/// Environment values resolved once, either from the host or supplied explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnvironment {
    pub uid: u32,
    pub identifier: Option<String>,
    pub bundle_path: PathBuf,
    pub agent_dir: PathBuf,
}

impl HostEnvironment {
    /// Resolve the environment of the current process.
    ///
    /// The bundle is the nearest `*.app` ancestor of the running executable;
    /// outside a bundle the executable itself stands in and no identifier is
    /// available.
    pub fn detect() -> Result<Self, CoreError> {
        let home = dirs::home_dir().ok_or(CoreError::HomeNotFound)?;
        let exe = std::env::current_exe().map_err(|e| io_err("current_exe", e))?;
        let bundle_path = enclosing_bundle(&exe).unwrap_or(exe);
        let identifier = read_bundle_identifier(&bundle_path);
        Ok(Self::for_home(&home, current_uid(), identifier, bundle_path))
    }

    /// Explicit construction rooted at `home`.
    pub fn for_home(
        home: &Path,
        uid: u32,
        identifier: Option<String>,
        bundle_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            uid,
            identifier,
            bundle_path: bundle_path.into(),
            agent_dir: launch_agents_dir(home),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_bundle_path(mut self, bundle_path: impl Into<PathBuf>) -> Self {
        self.bundle_path = bundle_path.into();
        self
    }
}

impl Environment for HostEnvironment {
    fn current_user_id(&self) -> u32 {
        self.uid
    }

    fn application_identifier(&self) -> Option<String> {
        self.identifier.clone()
    }

    fn application_bundle_path(&self) -> PathBuf {
        self.bundle_path.clone()
    }

    fn per_user_agent_dir(&self) -> PathBuf {
        self.agent_dir.clone()
    }
}

/// Nearest ancestor of `exe` (inclusive) whose file name ends in `.app`.
pub fn enclosing_bundle(exe: &Path) -> Option<PathBuf> {
    exe.ancestors()
        .find(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("app"))
                .unwrap_or(false)
        })
        .map(Path::to_path_buf)
}

/// `CFBundleIdentifier` from `<bundle>/Contents/Info.plist`.
///
/// Any failure (missing file, malformed plist, missing or non-string key)
/// yields `None`.
pub fn read_bundle_identifier(bundle: &Path) -> Option<String> {
    let info = bundle.join("Contents").join("Info.plist");
    if !info.is_file() {
        return None;
    }
    let value = Value::from_file(&info).ok()?;
    value
        .as_dictionary()?
        .get("CFBundleIdentifier")
        .and_then(Value::as_string)
        .map(str::to_owned)
}

#[cfg(unix)]
fn current_uid() -> u32 {
    // SAFETY: getuid(2) has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enclosing_bundle_finds_app_ancestor() {
        let exe = Path::new("/Applications/MyApp.app/Contents/MacOS/MyApp");
        assert_eq!(
            enclosing_bundle(exe),
            Some(PathBuf::from("/Applications/MyApp.app"))
        );
    }

    #[test]
    fn enclosing_bundle_is_none_for_bare_binary() {
        assert_eq!(enclosing_bundle(Path::new("/usr/local/bin/myapp")), None);
    }

    #[test]
    fn reads_identifier_from_info_plist() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bundle = tmp.path().join("MyApp.app");
        let contents = bundle.join("Contents");
        std::fs::create_dir_all(&contents).unwrap();

        let mut dict = plist::Dictionary::new();
        dict.insert(
            "CFBundleIdentifier".to_string(),
            Value::String("com.example.MyApp".to_string()),
        );
        Value::Dictionary(dict)
            .to_file_xml(contents.join("Info.plist"))
            .unwrap();

        assert_eq!(
            read_bundle_identifier(&bundle).as_deref(),
            Some("com.example.MyApp")
        );
    }

    #[test]
    fn missing_or_corrupt_info_plist_yields_none() {
        let tmp = tempfile::TempDir::new().unwrap();
        let bundle = tmp.path().join("Broken.app");
        assert_eq!(read_bundle_identifier(&bundle), None);

        let contents = bundle.join("Contents");
        std::fs::create_dir_all(&contents).unwrap();
        std::fs::write(contents.join("Info.plist"), b"not a plist").unwrap();
        assert_eq!(read_bundle_identifier(&bundle), None);
    }

    #[test]
    fn detect_resolves_bare_test_binary() {
        let exe = std::env::current_exe().unwrap();
        if enclosing_bundle(&exe).is_some() || dirs::home_dir().is_none() {
            return;
        }

        let env = HostEnvironment::detect().expect("detect with HOME set");
        assert_eq!(env.application_bundle_path(), exe);
        assert_eq!(env.application_identifier(), None);
        assert_eq!(
            env.per_user_agent_dir(),
            launch_agents_dir(&dirs::home_dir().unwrap())
        );
    }

    #[test]
    fn for_home_places_agent_dir_under_library() {
        let env = HostEnvironment::for_home(Path::new("/Users/tester"), 501, None, "/x.app");
        assert_eq!(
            env.per_user_agent_dir(),
            PathBuf::from("/Users/tester/Library/LaunchAgents")
        );
        assert_eq!(env.current_user_id(), 501);
        assert_eq!(env.application_identifier(), None);
    }
}

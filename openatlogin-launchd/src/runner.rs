use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::sync::Arc;

use tracing::{debug, warn};

pub const LAUNCHCTL_PATH: &str = "/bin/launchctl";

/// Exit status reported when the executable could not be spawned at all.
pub const SPAWN_FAILURE_STATUS: i32 = 127;

/// Runs an external program to completion and reports its exit status.
///
/// Implementations never fail: a program that cannot be started reports
/// [`SPAWN_FAILURE_STATUS`].
pub trait CommandRunner {
    fn run(&self, program: &Path, args: &[String]) -> i32;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &Path, args: &[String]) -> i32 {
        (**self).run(program, args)
    }
}

impl<T: CommandRunner + ?Sized> CommandRunner for Arc<T> {
    fn run(&self, program: &Path, args: &[String]) -> i32 {
        (**self).run(program, args)
    }
}

/// Spawns a real child process and blocks until it exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(&self, program: &Path, args: &[String]) -> i32 {
        debug!("exec: {} {}", program.display(), args.join(" "));

        let output = match Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                warn!("failed to spawn {}: {err}", program.display());
                return SPAWN_FAILURE_STATUS;
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stdout.trim().is_empty() {
            debug!("stdout: {}", stdout.trim());
        }
        if !stderr.trim().is_empty() {
            debug!("stderr: {}", stderr.trim());
        }

        exit_code(output.status)
    }
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(SPAWN_FAILURE_STATUS)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(SPAWN_FAILURE_STATUS)
}

/// The three `launchctl` subcommands the controller issues.
#[derive(Debug, Clone)]
pub struct Launchctl<R> {
    runner: R,
    executable: PathBuf,
}

impl Launchctl<ProcessRunner> {
    pub fn system() -> Self {
        Self::new(ProcessRunner)
    }
}

impl<R: CommandRunner> Launchctl<R> {
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            executable: PathBuf::from(LAUNCHCTL_PATH),
        }
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// `launchctl bootstrap <domain> <descriptor>`
    pub fn bootstrap(&self, domain: &str, descriptor: &Path) -> i32 {
        self.run(vec![
            "bootstrap".to_string(),
            domain.to_string(),
            descriptor.display().to_string(),
        ])
    }

    /// `launchctl kickstart -k <domain>/<label>`
    pub fn kickstart_restart(&self, target: &str) -> i32 {
        self.run(vec![
            "kickstart".to_string(),
            "-k".to_string(),
            target.to_string(),
        ])
    }

    /// `launchctl bootout <domain>/<label>`
    pub fn bootout(&self, target: &str) -> i32 {
        self.run(vec!["bootout".to_string(), target.to_string()])
    }

    fn run(&self, args: Vec<String>) -> i32 {
        self.runner.run(&self.executable, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(PathBuf, Vec<String>)>>);

    impl CommandRunner for Recorder {
        fn run(&self, program: &Path, args: &[String]) -> i32 {
            self.0
                .lock()
                .unwrap()
                .push((program.to_path_buf(), args.to_vec()));
            0
        }
    }

    #[test]
    fn builds_launchctl_argument_lists() {
        let recorder = Recorder::default();
        let launchctl = Launchctl::new(&recorder);

        launchctl.bootstrap("gui/501", Path::new("/tmp/a.plist"));
        launchctl.kickstart_restart("gui/501/a");
        launchctl.bootout("gui/501/a");

        let calls = recorder.0.lock().unwrap();
        assert!(calls.iter().all(|(p, _)| p == Path::new("/bin/launchctl")));
        let args: Vec<Vec<&str>> = calls
            .iter()
            .map(|(_, a)| a.iter().map(String::as_str).collect())
            .collect();
        assert_eq!(
            args,
            vec![
                vec!["bootstrap", "gui/501", "/tmp/a.plist"],
                vec!["kickstart", "-k", "gui/501/a"],
                vec!["bootout", "gui/501/a"],
            ]
        );
    }

    #[test]
    fn missing_executable_reports_sentinel() {
        let status = ProcessRunner.run(
            Path::new("/nonexistent/openatlogin/launchctl"),
            &["bootout".to_string()],
        );
        assert_eq!(status, SPAWN_FAILURE_STATUS);
    }

    #[cfg(unix)]
    #[test]
    fn real_exit_codes_pass_through() {
        let sh = Path::new("/bin/sh");
        assert_eq!(ProcessRunner.run(sh, &["-c".to_string(), "exit 0".to_string()]), 0);
        assert_eq!(ProcessRunner.run(sh, &["-c".to_string(), "exit 5".to_string()]), 5);
    }

    #[cfg(unix)]
    #[test]
    fn signal_termination_is_nonzero() {
        let sh = Path::new("/bin/sh");
        let status = ProcessRunner.run(sh, &["-c".to_string(), "kill -9 $$".to_string()]);
        assert_eq!(status, 128 + 9);
    }
}

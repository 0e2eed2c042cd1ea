//! Keeps the on-disk LaunchAgent and launchd's registration in line with the
//! caller's intent.
//!
//! Every sub-step is attempted regardless of earlier failures, and no error
//! crosses the `enable` / `disable` boundary. Each step's outcome is recorded
//! in the returned report instead. launchd is never queried: every call
//! re-asserts the desired state from scratch.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use openatlogin_core::error::io_err;
use openatlogin_core::paths::{descriptor_path, service_domain, service_target};
use openatlogin_core::{build_descriptor, build_identity, CoreError, Environment, JobLabel, LaunchAgent};

use crate::runner::{CommandRunner, Launchctl, SPAWN_FAILURE_STATUS};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StepOutcome {
    Done,
    /// Nothing to do (directory already present, file already absent).
    Skipped,
    Failed { reason: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }

    fn failed(reason: impl Into<String>) -> Self {
        StepOutcome::Failed {
            reason: reason.into(),
        }
    }
}

/// One `launchctl` invocation. `status` is `None` when the command never ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandStep {
    pub status: Option<i32>,
    pub outcome: StepOutcome,
}

impl CommandStep {
    fn from_status(command: &str, status: i32) -> Self {
        let outcome = match status {
            0 => StepOutcome::Done,
            SPAWN_FAILURE_STATUS => {
                StepOutcome::failed(format!("launchctl {command}: could not be run (status {status})"))
            }
            _ => StepOutcome::failed(format!("launchctl {command} exited with status {status}")),
        };
        Self {
            status: Some(status),
            outcome,
        }
    }

    fn not_run(reason: &str) -> Self {
        Self {
            status: None,
            outcome: StepOutcome::failed(reason),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.status == Some(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnableReport {
    pub label: JobLabel,
    pub descriptor_path: PathBuf,
    pub create_dir: StepOutcome,
    pub write_descriptor: StepOutcome,
    pub bootstrap: CommandStep,
    /// Present only when `bootstrap` reported non-zero.
    pub kickstart: Option<CommandStep>,
}

impl EnableReport {
    /// The descriptor is on disk and either bootstrap or the kickstart
    /// fallback succeeded.
    pub fn is_clean(&self) -> bool {
        let registered = self.bootstrap.succeeded()
            || self.kickstart.as_ref().is_some_and(CommandStep::succeeded);
        !self.create_dir.is_failure() && !self.write_descriptor.is_failure() && registered
    }

    pub(crate) fn aborted(label: JobLabel, descriptor_path: PathBuf, reason: &str) -> Self {
        Self {
            label,
            descriptor_path,
            create_dir: StepOutcome::failed(reason),
            write_descriptor: StepOutcome::failed(reason),
            bootstrap: CommandStep::not_run(reason),
            kickstart: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisableReport {
    pub label: JobLabel,
    pub descriptor_path: PathBuf,
    /// Non-zero is expected when the job was not loaded.
    pub bootout: CommandStep,
    pub remove_descriptor: StepOutcome,
}

impl DisableReport {
    /// The descriptor is gone. A failed `bootout` is not counted: launchd
    /// reports non-zero for jobs that were never loaded.
    pub fn is_clean(&self) -> bool {
        !self.remove_descriptor.is_failure()
    }

    pub(crate) fn aborted(label: JobLabel, descriptor_path: PathBuf, reason: &str) -> Self {
        Self {
            label,
            descriptor_path,
            bootout: CommandStep::not_run(reason),
            remove_descriptor: StepOutcome::failed(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Writes/removes the descriptor and drives `launchctl` for one application.
///
/// Holds no state beyond its collaborators; identity, path and domain are
/// recomputed from the [`Environment`] on every call. Concurrent `enable` /
/// `disable` calls for the same label are not serialized here.
#[derive(Debug)]
pub struct RegistrationController<E, R> {
    env: E,
    launchctl: Launchctl<R>,
}

impl<E: Environment, R: CommandRunner> RegistrationController<E, R> {
    pub fn new(env: E, launchctl: Launchctl<R>) -> Self {
        Self { env, launchctl }
    }

    pub fn identity(&self) -> JobLabel {
        build_identity(&self.env)
    }

    pub fn descriptor(&self) -> LaunchAgent {
        build_descriptor(&self.env)
    }

    pub fn descriptor_path(&self) -> PathBuf {
        descriptor_path(&self.env.per_user_agent_dir(), &self.identity())
    }

    pub fn domain(&self) -> String {
        service_domain(self.env.current_user_id())
    }

    pub fn launchctl(&self) -> &Launchctl<R> {
        &self.launchctl
    }

    /// Write the descriptor and register it, falling back to
    /// `kickstart -k` when `bootstrap` is rejected (usually: already loaded).
    pub fn enable(&self) -> EnableReport {
        let agent = self.descriptor();
        let label = agent.label.clone();
        let dir = self.env.per_user_agent_dir();
        let path = descriptor_path(&dir, &label);
        let domain = self.domain();

        let create_dir = if dir.exists() {
            StepOutcome::Skipped
        } else {
            outcome(
                "create LaunchAgents dir",
                fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e)),
            )
        };

        let write_descriptor = outcome("write descriptor", write_atomically(&path, &agent));
        if !write_descriptor.is_failure() {
            info!("wrote: {}", path.display());
        }

        let bootstrap = CommandStep::from_status("bootstrap", self.launchctl.bootstrap(&domain, &path));
        let kickstart = if bootstrap.succeeded() {
            info!("bootstrapped {label} into {domain}");
            None
        } else {
            warn!("bootstrap of {label} rejected; falling back to kickstart");
            let target = service_target(&domain, &label);
            let step = CommandStep::from_status("kickstart", self.launchctl.kickstart_restart(&target));
            match &step.outcome {
                StepOutcome::Failed { reason } => warn!("{reason}"),
                _ => info!("kickstarted {target}"),
            }
            Some(step)
        };

        EnableReport {
            label,
            descriptor_path: path,
            create_dir,
            write_descriptor,
            bootstrap,
            kickstart,
        }
    }

    /// Deregister the job and delete its descriptor. Missing registration and
    /// a missing file are both normal.
    pub fn disable(&self) -> DisableReport {
        let label = self.identity();
        let path = self.descriptor_path();
        let target = service_target(&self.domain(), &label);

        let bootout = CommandStep::from_status("bootout", self.launchctl.bootout(&target));
        if bootout.succeeded() {
            info!("booted out {target}");
        }

        let remove_descriptor = match fs::remove_file(&path) {
            Ok(()) => {
                info!("removed: {}", path.display());
                StepOutcome::Done
            }
            Err(e) if e.kind() == ErrorKind::NotFound => StepOutcome::Skipped,
            Err(e) => outcome("remove descriptor", Err(io_err(&path, e))),
        };

        DisableReport {
            label,
            descriptor_path: path,
            bootout,
            remove_descriptor,
        }
    }
}

fn outcome(step: &str, result: Result<(), CoreError>) -> StepOutcome {
    match result {
        Ok(()) => StepOutcome::Done,
        Err(err) => {
            warn!("{step} failed: {err}");
            StepOutcome::failed(err.to_string())
        }
    }
}

/// Encode to `<path>.openatlogin.tmp`, then rename over `path`.
fn write_atomically(path: &Path, agent: &LaunchAgent) -> Result<(), CoreError> {
    let xml = agent.to_xml()?;
    let tmp = tmp_path(path);
    fs::write(&tmp, xml).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".openatlogin.tmp");
    PathBuf::from(tmp)
}

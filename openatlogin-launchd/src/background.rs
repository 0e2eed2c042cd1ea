//! Off-thread execution for toggle handlers.
//!
//! `launchctl` blocks until it exits, so UI-facing callers hand the work to
//! tokio's blocking pool. Callers still own ordering: two overlapping calls
//! for the same label may interleave their file writes and launchctl commands.

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use openatlogin_core::Environment;

use crate::controller::{DisableReport, EnableReport, RegistrationController};
use crate::runner::CommandRunner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Enable,
    Disable,
}

impl From<bool> for Intent {
    fn from(enabled: bool) -> Self {
        if enabled {
            Intent::Enable
        } else {
            Intent::Disable
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum ToggleReport {
    Enabled(EnableReport),
    Disabled(DisableReport),
}

impl ToggleReport {
    pub fn is_clean(&self) -> bool {
        match self {
            ToggleReport::Enabled(report) => report.is_clean(),
            ToggleReport::Disabled(report) => report.is_clean(),
        }
    }
}

/// Run `enable` or `disable` on the blocking pool and wait for its report.
///
/// A worker that panics or is cancelled yields a report with every step
/// marked failed; nothing is propagated to the caller.
pub async fn apply_in_background<E, R>(
    controller: Arc<RegistrationController<E, R>>,
    intent: Intent,
) -> ToggleReport
where
    E: Environment + Send + Sync + 'static,
    R: CommandRunner + Send + Sync + 'static,
{
    let worker = Arc::clone(&controller);
    let joined = tokio::task::spawn_blocking(move || match intent {
        Intent::Enable => ToggleReport::Enabled(worker.enable()),
        Intent::Disable => ToggleReport::Disabled(worker.disable()),
    })
    .await;

    match joined {
        Ok(report) => report,
        Err(err) => {
            let reason = format!("registration worker failed: {err}");
            warn!("{reason}");
            let label = controller.identity();
            let path = controller.descriptor_path();
            match intent {
                Intent::Enable => ToggleReport::Enabled(EnableReport::aborted(label, path, &reason)),
                Intent::Disable => {
                    ToggleReport::Disabled(DisableReport::aborted(label, path, &reason))
                }
            }
        }
    }
}

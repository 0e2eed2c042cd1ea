//! openatlogin — register an app bundle to open at login via a launchd LaunchAgent.
//!
//! # Usage
//!
//! ```text
//! openatlogin enable   [--app-id <id>] [--bundle-path <path>] [--launchctl <path>] [--json]
//! openatlogin disable  [--app-id <id>] [--launchctl <path>] [--json]
//! openatlogin show     [--app-id <id>] [--bundle-path <path>]
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use openatlogin_core::HostEnvironment;
use openatlogin_launchd::{Launchctl, ProcessRunner, RegistrationController, LAUNCHCTL_PATH};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "openatlogin",
    version,
    about = "Open an application at login through a per-user launchd agent",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    env: EnvArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the LaunchAgent and bootstrap it into the GUI domain.
    Enable,

    /// Boot out the LaunchAgent and delete its plist.
    Disable,

    /// Print the label, paths and plist without touching disk or launchd.
    Show,
}

/// Overrides for values normally detected from the running process.
#[derive(Args, Debug)]
pub struct EnvArgs {
    /// Bundle identifier used to build the job label.
    #[arg(long, global = true, env = "OPENATLOGIN_APP_ID")]
    pub app_id: Option<String>,

    /// Application bundle passed to `open -a`.
    #[arg(long, global = true, env = "OPENATLOGIN_BUNDLE_PATH")]
    pub bundle_path: Option<PathBuf>,

    /// launchctl executable.
    #[arg(long, global = true, env = "OPENATLOGIN_LAUNCHCTL", default_value = LAUNCHCTL_PATH)]
    pub launchctl: PathBuf,

    /// Emit the step report as JSON.
    #[arg(long, global = true)]
    pub json: bool,
}

pub type Controller = RegistrationController<HostEnvironment, ProcessRunner>;

impl EnvArgs {
    fn controller(&self) -> Result<Controller> {
        let mut env = HostEnvironment::detect().context("failed to resolve host environment")?;
        if let Some(id) = &self.app_id {
            env = env.with_identifier(id.clone());
        }
        if let Some(path) = &self.bundle_path {
            env = env.with_bundle_path(path.clone());
        }
        let launchctl = Launchctl::system().with_executable(self.launchctl.clone());
        Ok(RegistrationController::new(env, launchctl))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let controller = cli.env.controller()?;
    match cli.command {
        Commands::Enable => commands::toggle::run(controller, true, cli.env.json),
        Commands::Disable => commands::toggle::run(controller, false, cli.env.json),
        Commands::Show => commands::show::run(&controller),
    }
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

//! `openatlogin show` — dry view of what `enable` would write and target.

use anyhow::{Context, Result};
use colored::Colorize;

use openatlogin_core::paths::service_target;

use crate::Controller;

pub fn run(controller: &Controller) -> Result<()> {
    let label = controller.identity();
    let domain = controller.domain();
    let xml = controller
        .descriptor()
        .to_xml()
        .context("failed to encode LaunchAgent plist")?;

    println!("{:<11}{label}", "label:".bold());
    println!("{:<11}{}", "plist:".bold(), controller.descriptor_path().display());
    println!("{:<11}{domain}", "domain:".bold());
    println!("{:<11}{}", "service:".bold(), service_target(&domain, &label));
    println!(
        "{:<11}{}",
        "launchctl:".bold(),
        controller.launchctl().executable().display()
    );
    println!();
    print!("{}", String::from_utf8_lossy(&xml));
    Ok(())
}

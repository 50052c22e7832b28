use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::common::exec::{Cmd, CommandRunner};

/// The unit that runs the Waydroid LXC container
pub const CONTAINER_UNIT: &str = "waydroid-container.service";

/// runit service directory name on Void
pub const RUNIT_SERVICE: &str = "waydroid-container";

/// Systemd service manager for the few operations the installer needs
pub struct SystemdManager<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> SystemdManager<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    fn systemctl(&self, args: &[&str]) -> Cmd {
        Cmd::new("systemctl").args(args.iter().copied())
    }

    /// Enable a unit and start it immediately
    pub fn enable_now(&self, unit: &str) -> Result<()> {
        self.runner
            .run(&self.systemctl(&["enable", "--now", unit]))
            .with_context(|| format!("Failed to enable service '{}'", unit))
    }

    pub fn stop(&self, unit: &str) -> Result<()> {
        self.runner
            .run(&self.systemctl(&["stop", unit]))
            .with_context(|| format!("Failed to stop service '{}'", unit))
    }

    pub fn disable(&self, unit: &str) -> Result<()> {
        self.runner
            .run(&self.systemctl(&["disable", unit]))
            .with_context(|| format!("Failed to disable service '{}'", unit))
    }

    pub fn reload(&self, unit: &str) -> Result<()> {
        self.runner
            .run(&self.systemctl(&["reload", unit]))
            .with_context(|| format!("Failed to reload service '{}'", unit))
    }

    /// Check whether systemd knows about a unit file
    pub fn is_registered(&self, unit: &str) -> bool {
        self.runner
            .read(&self.systemctl(&["list-unit-files", "--no-legend", unit]))
            .map(|output| output.lines().any(|line| line.starts_with(unit)))
            .unwrap_or(false)
    }
}

const RUNIT_SUPERVISED_DIR: &str = "/var/service";

/// Link runit supervises for `service`; removing it stops and disables it.
pub fn runit_service_link(service: &str) -> PathBuf {
    PathBuf::from(RUNIT_SUPERVISED_DIR).join(service)
}

/// Enable a runit service by linking it into the supervised directory
pub fn enable_runit_service(runner: &dyn CommandRunner, service: &str) -> Result<()> {
    runner
        .run(
            &Cmd::new("ln")
                .arg("-sf")
                .arg(format!("/etc/sv/{}", service))
                .arg(format!("{}/", RUNIT_SUPERVISED_DIR)),
        )
        .with_context(|| format!("Failed to enable runit service '{}'", service))
}

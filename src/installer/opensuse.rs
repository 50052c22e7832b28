//! openSUSE Tumbleweed, Slowroll and Leap.
//!
//! Waydroid comes from an OBS home repository whose path depends on the
//! sub-variant. The kernel needs `psi=1`, and AppArmor has to let dnsmasq
//! into the container's runtime directory.

use std::fmt;
use std::path::Path;

use super::waydroid::{self, Firewall};
use super::{InstallContext, InstallError, InstallOutcome, step_failed};
use crate::common::distro::{OS_RELEASE, os_release_value};
use crate::common::exec::Cmd;
use crate::common::host::Host;
use crate::common::package::PACKAGE;
use crate::common::paths::APPARMOR_DNSMASQ;
use crate::common::systemd::SystemdManager;

const OBS_PROJECT: &str = "home:runa-chin:Waydroid";
const APPARMOR_RULES: &str = "@{run}/waydroid-lxc/ r,\n@{run}/waydroid-lxc/* rw,\n";

const REBOOT_NOTE: &str = "IMPORTANT: REBOOT REQUIRED\n\
openSUSE needs a reboot for the kernel parameter change (psi=1).\n\
After reboot, Waydroid will be ready to use.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuseVariant {
    Tumbleweed,
    Slowroll,
    Leap(String),
}

impl SuseVariant {
    /// Rolling releases are named in PRETTY_NAME; Leap is a 15.x VERSION_ID.
    /// Anything unrecognized is treated as Tumbleweed.
    pub fn detect(host: &dyn Host) -> Self {
        let Some(content) = host.read_file(Path::new(OS_RELEASE)) else {
            return Self::Tumbleweed;
        };

        let pretty = os_release_value(&content, "PRETTY_NAME").unwrap_or_default();
        if pretty.contains("Tumbleweed") {
            return Self::Tumbleweed;
        }
        if pretty.contains("Slowroll") {
            return Self::Slowroll;
        }

        match os_release_value(&content, "VERSION_ID") {
            Some(version) if version.starts_with("15") => Self::Leap(version),
            _ => Self::Tumbleweed,
        }
    }

    fn repo_dir(&self) -> String {
        match self {
            Self::Tumbleweed => "openSUSE_Tumbleweed".to_string(),
            Self::Slowroll => "openSUSE_Slowroll".to_string(),
            Self::Leap(version) => format!("openSUSE_Leap_{}", version),
        }
    }

    pub fn repo_url(&self) -> String {
        format!(
            "https://download.opensuse.org/repositories/{project}/{dir}/{project}.repo",
            project = OBS_PROJECT,
            dir = self.repo_dir()
        )
    }
}

impl fmt::Display for SuseVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tumbleweed => write!(f, "Tumbleweed"),
            Self::Slowroll => write!(f, "Slowroll"),
            Self::Leap(version) => write!(f, "Leap {}", version),
        }
    }
}

fn zypper<const N: usize>(args: [&str; N]) -> Cmd {
    Cmd::new("zypper").args(args)
}

pub fn install(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    let variant = SuseVariant::detect(ctx.host);
    ctx.note(&format!("Detected version: {}", variant));

    ctx.step("Update system", zypper(["dup", "-y"]))?;
    ctx.step(
        "Add Waydroid repository",
        Cmd::new("zypper")
            .args(["addrepo", "-f"])
            .arg(variant.repo_url())
            .arg("waydroid"),
    )?;
    ctx.step("Refresh repositories", zypper(["refresh"]))?;

    configure_kernel(ctx)?;

    ctx.step("Install Waydroid", zypper(["install", "-y", PACKAGE]))?;

    configure_apparmor(ctx)?;

    waydroid::initialize(ctx, false)?;
    waydroid::enable_service(ctx)?;
    waydroid::configure_firewall(
        ctx,
        Firewall::Firewalld {
            bind_interface: false,
        },
    );

    Ok(InstallOutcome::reboot_required(REBOOT_NOTE))
}

/// Add `psi=1` to the running kernel's boot entry.
fn configure_kernel(ctx: &InstallContext) -> Result<(), InstallError> {
    ctx.step("Install grubby", zypper(["install", "-y", "grubby"]))?;

    let kernel = ctx
        .runner
        .read(&Cmd::new("uname").arg("-r"))
        .map_err(|e| step_failed("Detect running kernel", e))?;

    ctx.step(
        "Configure kernel parameters",
        Cmd::new("grubby")
            .arg(format!("--update-kernel=/boot/vmlinuz-{}", kernel.trim()))
            .arg("--args=psi=1"),
    )
}

fn configure_apparmor(ctx: &InstallContext) -> Result<(), InstallError> {
    ctx.note(":: Configure AppArmor");
    ctx.runner
        .write_file(Path::new(APPARMOR_DNSMASQ), APPARMOR_RULES, None)
        .map_err(|e| step_failed("Write AppArmor profile", e))?;
    SystemdManager::new(ctx.runner)
        .reload("apparmor")
        .map_err(|e| step_failed("Reload AppArmor", e))
}

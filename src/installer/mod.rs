//! Install flow: pre-flight checks, strategy selection and dispatch.
//!
//! Each strategy is a linear list of steps. A required step that fails
//! aborts the rest of its strategy; nothing is rolled back, so the system
//! may be left half-configured, exactly as the package manager left it.

use thiserror::Error;

use crate::common::config::InstallerConfig;
use crate::common::distro::Distribution;
use crate::common::exec::{Cmd, CommandRunner};
use crate::common::host::Host;
use crate::common::prompt::ConfirmationGate;
use crate::profile::SystemProfile;
use crate::ui::prelude::*;

mod arch;
mod debian;
mod fedora;
mod nixos;
mod opensuse;
mod void;
mod waydroid;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("This operation requires root privileges. Please run with sudo or as root.")]
    NotRoot,
    #[error("Unsupported distribution: {0}")]
    UnsupportedDistribution(Distribution),
    #[error("Failed to {step}: {detail}")]
    StepFailed { step: String, detail: String },
    #[error("Could not detect distribution codename")]
    MissingCodename,
    #[error("No AUR helper found. Install yay or paru.")]
    NoAurHelper,
    #[error("{0} cancelled")]
    Cancelled(&'static str),
}

/// Result of one install or uninstall attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOutcome {
    pub success: bool,
    /// Why it failed, or what the user has to do next.
    pub reason: Option<String>,
    pub reboot_required: bool,
}

impl InstallOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            reason: None,
            reboot_required: false,
        }
    }

    /// Succeeded, but the user has to follow up manually.
    pub fn success_with_note(note: impl Into<String>) -> Self {
        Self {
            reason: Some(note.into()),
            ..Self::success()
        }
    }

    /// Succeeded, and nothing works until the machine is rebooted.
    pub fn reboot_required(note: impl Into<String>) -> Self {
        Self {
            success: true,
            reason: Some(note.into()),
            reboot_required: true,
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            reason: Some(reason.into()),
            reboot_required: false,
        }
    }
}

impl From<InstallError> for InstallOutcome {
    fn from(err: InstallError) -> Self {
        Self::failure(err.to_string())
    }
}

/// The external collaborators every flow talks to.
pub struct Backend<'a> {
    pub host: &'a dyn Host,
    pub runner: &'a dyn CommandRunner,
    pub gate: &'a dyn ConfirmationGate,
    pub config: &'a InstallerConfig,
}

/// Everything a strategy sees while it runs.
pub struct InstallContext<'a> {
    pub profile: &'a SystemProfile,
    pub host: &'a dyn Host,
    pub runner: &'a dyn CommandRunner,
    pub gate: &'a dyn ConfirmationGate,
    pub config: &'a InstallerConfig,
    pub unattended: bool,
}

impl InstallContext<'_> {
    /// Run one required step. Failure ends the strategy.
    pub fn step(&self, label: &str, cmd: Cmd) -> Result<(), InstallError> {
        emit(Level::Info, "install.step", &format!(":: {}", label), None);
        self.runner.run(&cmd).map_err(|e| step_failed(label, e))
    }

    /// Ask the user, or skip the question and take `unattended_answer`.
    pub fn confirm_or(&self, prompt: &str, unattended_answer: bool) -> bool {
        if self.unattended {
            unattended_answer
        } else {
            self.gate.confirm(prompt)
        }
    }

    pub fn note(&self, message: &str) {
        emit(Level::Info, "install.note", message, None);
    }

    pub fn warn(&self, message: &str) {
        emit(Level::Warn, "install.warning", message, None);
    }
}

pub(crate) fn step_failed(label: &str, err: anyhow::Error) -> InstallError {
    InstallError::StepFailed {
        step: label.to_lowercase(),
        detail: format!("{:#}", err),
    }
}

/// One installation strategy per distribution family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Arch,
    Debian,
    Fedora,
    OpenSuse,
    Void,
    NixOs,
}

impl Strategy {
    pub fn for_distribution(distribution: Distribution) -> Option<Self> {
        match distribution {
            Distribution::Arch | Distribution::Manjaro => Some(Self::Arch),
            Distribution::Debian | Distribution::Ubuntu => Some(Self::Debian),
            Distribution::Fedora | Distribution::RHEL | Distribution::CentOS => Some(Self::Fedora),
            Distribution::OpenSUSE => Some(Self::OpenSuse),
            Distribution::Void => Some(Self::Void),
            Distribution::NixOS => Some(Self::NixOs),
            Distribution::Unknown | Distribution::PopOS | Distribution::LinuxMint => None,
        }
    }

    fn run(self, ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
        match self {
            Self::Arch => arch::install(ctx),
            Self::Debian => debian::install(ctx),
            Self::Fedora => fedora::install(ctx),
            Self::OpenSuse => opensuse::install(ctx),
            Self::Void => void::install(ctx),
            Self::NixOs => nixos::install(ctx),
        }
    }
}

/// Pick the strategy for the profile and run it. Unknown or unsupported
/// distributions fail without running anything.
pub fn dispatch(backend: &Backend, profile: &SystemProfile, unattended: bool) -> InstallOutcome {
    let Some(strategy) = Strategy::for_distribution(profile.distribution) else {
        return InstallError::UnsupportedDistribution(profile.distribution).into();
    };

    emit(
        Level::Info,
        "install.strategy",
        &format!("Installing Waydroid on {}...", profile.distribution),
        None,
    );

    let ctx = InstallContext {
        profile,
        host: backend.host,
        runner: backend.runner,
        gate: backend.gate,
        config: backend.config,
        unattended,
    };

    strategy.run(&ctx).unwrap_or_else(InstallOutcome::from)
}

/// The whole install flow as run from the command line.
pub fn install(backend: &Backend, profile: &SystemProfile, unattended: bool) -> InstallOutcome {
    emit(Level::Info, "install.banner", "=== Waydroid Installer ===", None);

    let outcome = match preflight(backend, profile, unattended) {
        Ok(()) => dispatch(backend, profile, unattended),
        Err(e) => e.into(),
    };

    report(&outcome);
    outcome
}

fn preflight(
    backend: &Backend,
    profile: &SystemProfile,
    unattended: bool,
) -> Result<(), InstallError> {
    if !profile.is_root {
        return Err(InstallError::NotRoot);
    }

    profile.print_summary();

    if Strategy::for_distribution(profile.distribution).is_none() {
        return Err(InstallError::UnsupportedDistribution(profile.distribution));
    }

    if !profile.session_type.is_wayland() {
        emit(
            Level::Warn,
            "install.not_wayland",
            "You are not in a Wayland session. Waydroid works best in Wayland.",
            None,
        );
        if !unattended && !backend.gate.confirm("Continue anyway?") {
            return Err(InstallError::Cancelled("Installation"));
        }
    }

    if !unattended {
        emit(
            Level::Info,
            "install.confirm",
            "This will install Waydroid on your system.",
            None,
        );
        if !backend.gate.confirm("Continue with installation?") {
            return Err(InstallError::Cancelled("Installation"));
        }
    }

    Ok(())
}

fn report(outcome: &InstallOutcome) {
    separator(true);
    if !outcome.success {
        if let Some(reason) = &outcome.reason {
            emit(Level::Error, "install.failed", &format!("Error: {}", reason), None);
        }
        emit(Level::Error, "install.failed", "=== Installation failed ===", None);
        return;
    }

    emit(
        Level::Success,
        "install.done",
        "=== Installation completed successfully ===",
        None,
    );
    match &outcome.reason {
        Some(note) if outcome.reboot_required => {
            emit(Level::Warn, "install.reboot", note, None);
        }
        Some(note) => emit(Level::Info, "install.next", note, None),
        None => emit(
            Level::Info,
            "install.next",
            "You can now start Waydroid with:\n  waydroid session start\n  waydroid show-full-ui",
            None,
        ),
    }
}

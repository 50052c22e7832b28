//! Removal flow.
//!
//! Services are stopped before the package goes away, since removing the
//! package also removes the unit. Every phase runs regardless of how the
//! previous one went; only the package removal decides the outcome.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::common::exec::Cmd;
use crate::common::package::PACKAGE;
use crate::common::paths::{BINDER_DKMS_SOURCES, SYSTEM_PATHS, USER_PATHS};
use crate::common::systemd::{CONTAINER_UNIT, RUNIT_SERVICE, SystemdManager, runit_service_link};
use crate::installer::{Backend, InstallError, InstallOutcome};
use crate::profile::SystemProfile;
use crate::ui::prelude::*;

pub const CONFIRM_PROMPT: &str = "Are you sure you want to continue?";

/// Per-phase result of one uninstall run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UninstallReport {
    pub services_stopped: bool,
    pub package_removed: bool,
    pub config_removed: bool,
    pub modules_removed: bool,
}

pub fn uninstall(backend: &Backend, profile: &SystemProfile, unattended: bool) -> InstallOutcome {
    emit(Level::Info, "uninstall.banner", "=== Waydroid Uninstaller ===", None);

    if !profile.is_root {
        return finish(InstallError::NotRoot.into());
    }

    if !unattended {
        emit(
            Level::Warn,
            "uninstall.confirm",
            "This will completely remove Waydroid from your system.\nThis action cannot be undone!",
            None,
        );
        if !backend.gate.confirm_with_default(CONFIRM_PROMPT, false) {
            return finish(InstallError::Cancelled("Uninstallation").into());
        }
    }

    emit(Level::Info, "uninstall.start", "Starting uninstallation...", None);
    let report = run_phases(backend, profile);

    let outcome = if report.package_removed {
        InstallOutcome::reboot_required("You may need to reboot for all changes to take effect.")
    } else {
        InstallOutcome::failure(format!(
            "Failed to remove package with {}",
            profile.package_manager
        ))
    };
    finish(outcome)
}

/// Run all four phases in order. None of them aborts the others.
pub fn run_phases(backend: &Backend, profile: &SystemProfile) -> UninstallReport {
    phase(1, "Stopping services...");
    let services_stopped = stop_services(backend);
    if !services_stopped {
        warn("Warning: Failed to stop some services");
    }

    phase(2, "Removing package...");
    let package_removed = remove_package(backend, profile);

    phase(3, "Removing configuration files...");
    let config_removed = remove_config_files(backend);
    if !config_removed {
        warn("Warning: Failed to remove some configuration files");
    }

    phase(4, "Removing kernel modules...");
    let modules_removed = remove_kernel_modules(backend);

    let report = UninstallReport {
        services_stopped,
        package_removed,
        config_removed,
        modules_removed,
    };
    emit(
        Level::Debug,
        "uninstall.report",
        &format!("{:?}", report),
        serde_json::to_value(report).ok(),
    );
    report
}

fn phase(index: usize, message: &str) {
    emit(Level::Info, "uninstall.phase", &format!("{}. {}", index, message), None);
}

fn warn(message: &str) {
    emit(Level::Warn, "uninstall.warning", message, None);
}

fn try_run(backend: &Backend, cmd: &Cmd) -> bool {
    match backend.runner.run(cmd) {
        Ok(()) => true,
        Err(e) => {
            warn(&format!("Warning: {:#}", e));
            false
        }
    }
}

fn stop_services(backend: &Backend) -> bool {
    let mut success = true;

    // pgrep exits non-zero when nothing matches
    let running = backend
        .runner
        .read(&Cmd::new("pgrep").args(["-f", "waydroid-container"]))
        .is_ok();
    if running {
        success &= try_run(backend, &Cmd::new("waydroid").args(["container", "stop"]));
    }

    let systemd = SystemdManager::new(backend.runner);
    if systemd.is_registered(CONTAINER_UNIT) {
        for result in [systemd.stop(CONTAINER_UNIT), systemd.disable(CONTAINER_UNIT)] {
            if let Err(e) = result {
                warn(&format!("Warning: {:#}", e));
                success = false;
            }
        }
    }

    // runit (Void): dropping the supervision link stops the service
    let runit_link = runit_service_link(RUNIT_SERVICE);
    if backend.host.file_exists(&runit_link) {
        success &= remove(backend, &runit_link);
    }

    success
}

fn remove_package(backend: &Backend, profile: &SystemProfile) -> bool {
    let Some(cmd) = profile.package_manager.remove_command(PACKAGE) else {
        emit(
            Level::Error,
            "uninstall.no_package_manager",
            &format!(
                "Error: No removal command for package manager {}",
                profile.package_manager
            ),
            None,
        );
        return false;
    };

    match backend.runner.run(&cmd) {
        Ok(()) => true,
        Err(e) => {
            emit(
                Level::Error,
                "uninstall.package_failed",
                &format!("Error: Failed to remove package: {:#}", e),
                None,
            );
            false
        }
    }
}

fn remove(backend: &Backend, path: &Path) -> bool {
    match backend.runner.remove_path(path) {
        Ok(()) => true,
        Err(e) => {
            warn(&format!("Warning: Failed to remove {}: {:#}", path.display(), e));
            false
        }
    }
}

/// System paths count towards the phase result; per-user leftovers are
/// removed best-effort.
fn remove_config_files(backend: &Backend) -> bool {
    let mut success = true;
    for path in SYSTEM_PATHS.iter().map(Path::new) {
        if backend.host.file_exists(path) {
            success &= remove(backend, path);
        }
    }

    if let Some(home) = backend.host.home_dir() {
        for path in user_paths(backend, &home) {
            remove(backend, &path);
        }
    }

    success
}

fn user_paths(backend: &Backend, home: &Path) -> Vec<PathBuf> {
    USER_PATHS
        .iter()
        .flat_map(|relative| backend.host.glob(&home.join(relative).to_string_lossy()))
        .collect()
}

fn remove_kernel_modules(backend: &Backend) -> bool {
    let sources = backend.host.glob(BINDER_DKMS_SOURCES);
    if sources.is_empty() {
        emit(
            Level::Info,
            "uninstall.no_modules",
            "No kernel modules to remove",
            None,
        );
        return true;
    }

    let success = try_run(
        backend,
        &Cmd::new("dkms").args(["remove", "binder_linux", "--all"]),
    );
    for source in &sources {
        remove(backend, source);
    }
    success
}

fn finish(outcome: InstallOutcome) -> InstallOutcome {
    separator(true);
    if outcome.success {
        emit(
            Level::Success,
            "uninstall.done",
            "=== Uninstallation completed ===",
            None,
        );
        if let Some(note) = &outcome.reason {
            emit(Level::Info, "uninstall.reboot", note, None);
        }
    } else {
        if let Some(reason) = &outcome.reason {
            emit(Level::Error, "uninstall.failed", &format!("Error: {}", reason), None);
        }
        emit(
            Level::Error,
            "uninstall.failed",
            "=== Uninstallation failed ===",
            None,
        );
    }
    outcome
}

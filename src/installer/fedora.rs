//! Fedora, RHEL and CentOS, including the rpm-ostree based variants
//! (Silverblue, Kinoite).

use super::waydroid::{self, Firewall};
use super::{InstallContext, InstallError, InstallOutcome};
use crate::common::exec::Cmd;
use crate::common::package::{PACKAGE, PackageManager};

const OTA_HINT: &str = "If Waydroid asks for OTA channels, use:\n  \
System OTA: https://ota.waydro.id/system\n  \
Vendor OTA: https://ota.waydro.id/vendor";

const REBOOT_NOTE: &str = "REBOOT REQUIRED to apply the rpm-ostree deployment.\n\
After reboot, run:\n  \
sudo waydroid init\n  \
sudo systemctl enable --now waydroid-container.service";

pub fn install(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    if is_immutable(ctx) {
        ctx.note("Detected immutable Fedora variant (Silverblue/Kinoite)");
        install_immutable(ctx)
    } else {
        install_regular(ctx)
    }
}

/// An ostree-managed system: `rpm-ostree` is installed and reports a
/// deployment.
fn is_immutable(ctx: &InstallContext) -> bool {
    ctx.host.has_program("rpm-ostree")
        && ctx
            .runner
            .read(&Cmd::new("rpm-ostree").arg("status"))
            .is_ok_and(|status| status.contains("ostree"))
}

/// Layer the package; the container can only be set up after a reboot.
fn install_immutable(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    ctx.step(
        "Install Waydroid with rpm-ostree",
        Cmd::new("rpm-ostree").args(["install", PACKAGE]),
    )?;
    Ok(InstallOutcome::reboot_required(REBOOT_NOTE))
}

fn install_regular(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    let program = match ctx.profile.package_manager {
        PackageManager::Yum => "yum",
        _ => "dnf",
    };

    ctx.step("Update system", Cmd::new(program).args(["update", "-y"]))?;
    ctx.step(
        "Install Waydroid",
        Cmd::new(program).args(["install", "-y", PACKAGE]),
    )?;

    let gapps = waydroid::wants_gapps(ctx);
    waydroid::initialize(ctx, gapps)?;
    waydroid::enable_service(ctx)?;
    waydroid::configure_firewall(
        ctx,
        Firewall::Firewalld {
            bind_interface: true,
        },
    );

    Ok(InstallOutcome::success_with_note(OTA_HINT))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::InstallerConfig;
    use crate::common::distro::Distribution;
    use crate::installer::test_support::{context, profile};
    use crate::testing::{FakeHost, ForbiddenGate, RecordingRunner};

    #[test]
    fn test_regular_fedora() {
        let p = profile(Distribution::Fedora, "40");
        let host = FakeHost::new().with_programs(&["firewall-cmd"]);
        let runner = RecordingRunner::new();
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        let outcome = install(&ctx).unwrap();
        assert!(outcome.success);
        assert!(!outcome.reboot_required);
        assert!(outcome.reason.unwrap().contains("https://ota.waydro.id/system"));

        let commands = runner.commands();
        assert_eq!(
            &commands[..4],
            &[
                "dnf update -y",
                "dnf install -y waydroid",
                "waydroid init",
                "systemctl enable --now waydroid-container.service",
            ]
        );
        assert_eq!(commands.last().map(String::as_str), Some("firewall-cmd --reload"));
        assert!(runner.ran("firewall-cmd --permanent --zone=trusted --add-interface=waydroid0"));
    }

    #[test]
    fn test_yum_hosts_use_yum() {
        let mut p = profile(Distribution::CentOS, "7");
        p.package_manager = PackageManager::Yum;
        let host = FakeHost::new();
        let runner = RecordingRunner::new();
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        install(&ctx).unwrap();
        assert!(runner.ran("yum update -y"));
        assert!(runner.ran("yum install -y waydroid"));
        assert!(!runner.ran("dnf"));
    }

    #[test]
    fn test_immutable_variant_only_layers_the_package() {
        let p = profile(Distribution::Fedora, "40");
        let host = FakeHost::new().with_programs(&["rpm-ostree", "firewall-cmd"]);
        let runner = RecordingRunner::new().with_output(
            "rpm-ostree status",
            "State: idle\nDeployments:\n* fedora:fedora/40/x86_64/silverblue\n  ostree-image-signed",
        );
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        let outcome = install(&ctx).unwrap();
        assert!(outcome.success);
        assert!(outcome.reboot_required);
        let note = outcome.reason.unwrap();
        assert!(note.contains("REBOOT REQUIRED"));
        assert!(note.contains("sudo systemctl enable --now waydroid-container.service"));

        assert_eq!(runner.commands(), vec!["rpm-ostree install waydroid"]);
        assert!(!runner.ran("dnf"));
        assert!(!runner.ran("systemctl"));
    }

    #[test]
    fn test_rpm_ostree_without_deployment_is_regular() {
        let p = profile(Distribution::Fedora, "40");
        let host = FakeHost::new().with_programs(&["rpm-ostree"]);
        let runner = RecordingRunner::new().with_output("rpm-ostree status", "error: not booted\n");
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        install(&ctx).unwrap();
        assert!(runner.ran("dnf install -y waydroid"));
        assert!(!runner.ran("rpm-ostree"));
    }

    #[test]
    fn test_failed_layering_is_fatal() {
        let p = profile(Distribution::Fedora, "40");
        let host = FakeHost::new().with_programs(&["rpm-ostree"]);
        let runner = RecordingRunner::new()
            .with_output("rpm-ostree status", "ostree://fedora")
            .failing_on("rpm-ostree install");
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        let err = install(&ctx).unwrap_err();
        assert!(err.to_string().starts_with("Failed to install waydroid with rpm-ostree"));
    }
}

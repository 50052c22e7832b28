//! Debian and Ubuntu (plus Ubuntu derivatives).
//!
//! Waydroid is not in the distribution archives, so the strategy resolves
//! the release codename and adds repo.waydro.id before installing.

use std::path::Path;

use super::waydroid::{self, Firewall};
use super::{InstallContext, InstallError, InstallOutcome, step_failed};
use crate::common::distro::{Distribution, OS_RELEASE, os_release_value};
use crate::common::exec::{Cmd, CommandRunner};
use crate::common::host::Host;
use crate::common::package::PACKAGE;
use crate::profile::SystemProfile;

const REPO_URL: &str = "https://repo.waydro.id";
const KEYRING: &str = "/usr/share/keyrings/waydroid.gpg";
const SOURCE_LIST: &str = "/etc/apt/sources.list.d/waydroid.list";

/// Ubuntu releases known to the last-resort lookup. Anything else resolves
/// to the first entry.
const UBUNTU_CODENAMES: &[(&str, &str)] = &[
    ("22.04", "jammy"),
    ("20.04", "focal"),
    ("18.04", "bionic"),
];

pub fn install(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    let codename = resolve_codename(ctx.host, ctx.runner, ctx.profile)
        .ok_or(InstallError::MissingCodename)?;
    ctx.note(&format!("Detected codename: {}", codename));

    ctx.step("Update package lists", apt(["update"]))?;
    ctx.step("Upgrade system", apt(["upgrade", "-y"]))?;
    ctx.step(
        "Install prerequisites",
        apt(["install", "-y", "curl", "ca-certificates", "software-properties-common"]),
    )?;

    add_repository(ctx, &codename)?;

    ctx.step("Refresh package lists", apt(["update"]))?;
    ctx.step("Install Waydroid", apt(["install", "-y", PACKAGE]))?;

    let gapps = waydroid::wants_gapps(ctx);
    waydroid::initialize(ctx, gapps)?;
    waydroid::enable_service(ctx)?;
    waydroid::configure_firewall(ctx, Firewall::Ufw);

    Ok(InstallOutcome::success())
}

fn apt<const N: usize>(args: [&str; N]) -> Cmd {
    Cmd::new("apt").args(args)
}

/// Release codename, from the most to the least reliable source:
/// `lsb_release`, `VERSION_CODENAME` in os-release, then the Ubuntu table.
pub fn resolve_codename(
    host: &dyn Host,
    runner: &dyn CommandRunner,
    profile: &SystemProfile,
) -> Option<String> {
    if host.has_program("lsb_release")
        && let Ok(out) = runner.read(&Cmd::new("lsb_release").arg("-cs"))
        && !out.trim().is_empty()
    {
        return Some(out.trim().to_string());
    }

    if let Some(codename) = host
        .read_file(Path::new(OS_RELEASE))
        .and_then(|content| os_release_value(&content, "VERSION_CODENAME"))
        .filter(|c| !c.is_empty())
    {
        return Some(codename);
    }

    if profile.distribution == Distribution::Ubuntu && !profile.version.is_empty() {
        return Some(ubuntu_codename(&profile.version).to_string());
    }

    None
}

fn ubuntu_codename(version: &str) -> &'static str {
    UBUNTU_CODENAMES
        .iter()
        .find(|(v, _)| *v == version)
        .map(|(_, codename)| *codename)
        .unwrap_or(UBUNTU_CODENAMES[0].1)
}

/// The repository's own bootstrap script first; if that fails, set up the
/// keyring and source list by hand.
fn add_repository(ctx: &InstallContext, codename: &str) -> Result<(), InstallError> {
    ctx.note(":: Add Waydroid repository");
    let bootstrap = ctx
        .runner
        .read(&Cmd::new("curl").args(["-fsSL", REPO_URL]))
        .and_then(|script| {
            ctx.runner
                .run_with_input(&Cmd::new("bash").args(["-s", codename]), &script)
        });

    match bootstrap {
        Ok(()) => Ok(()),
        Err(e) => {
            ctx.warn(&format!(
                "Official method failed ({:#}), trying alternative...",
                e
            ));
            add_repository_manually(ctx, codename)
        }
    }
}

fn add_repository_manually(ctx: &InstallContext, codename: &str) -> Result<(), InstallError> {
    ctx.step("Install gnupg", apt(["install", "-y", "gnupg"]))?;
    ctx.step(
        "Download repository key",
        Cmd::new("curl")
            .args(["-fsSL"])
            .arg(format!("{}/waydroid.gpg", REPO_URL))
            .args(["-o", KEYRING]),
    )?;

    let source = format!(
        "deb [signed-by={}] {}/ {} main\n",
        KEYRING, REPO_URL, codename
    );
    ctx.runner
        .write_file(Path::new(SOURCE_LIST), &source, None)
        .map_err(|e| step_failed("Write repository list", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::InstallerConfig;
    use crate::installer::test_support::{context, profile};
    use crate::testing::{FakeHost, ForbiddenGate, RecordingRunner};

    #[test]
    fn test_codename_from_lsb_release() {
        let host = FakeHost::new()
            .with_programs(&["lsb_release"])
            .with_file(OS_RELEASE, "VERSION_CODENAME=focal\n");
        let runner = RecordingRunner::new().with_output("lsb_release -cs", "noble\n");
        let p = profile(Distribution::Ubuntu, "24.04");
        assert_eq!(resolve_codename(&host, &runner, &p).as_deref(), Some("noble"));
    }

    #[test]
    fn test_codename_from_os_release() {
        // lsb_release present but printing nothing
        let host = FakeHost::new()
            .with_programs(&["lsb_release"])
            .with_file(OS_RELEASE, "ID=debian\nVERSION_CODENAME=bookworm\n");
        let runner = RecordingRunner::new().with_output("lsb_release -cs", "");
        let p = profile(Distribution::Debian, "12");
        assert_eq!(resolve_codename(&host, &runner, &p).as_deref(), Some("bookworm"));
    }

    #[test]
    fn test_codename_table_fallback() {
        let host = FakeHost::new().with_file(OS_RELEASE, "ID=ubuntu\nVERSION_ID=\"22.04\"\n");
        let runner = RecordingRunner::new();
        let p = profile(Distribution::Ubuntu, "22.04");
        assert_eq!(resolve_codename(&host, &runner, &p).as_deref(), Some("jammy"));
        assert!(runner.reads().is_empty(), "lsb_release is not installed");

        let p = profile(Distribution::Ubuntu, "20.04");
        assert_eq!(resolve_codename(&host, &runner, &p).as_deref(), Some("focal"));
        let p = profile(Distribution::Ubuntu, "18.04");
        assert_eq!(resolve_codename(&host, &runner, &p).as_deref(), Some("bionic"));
    }

    #[test]
    fn test_unlisted_ubuntu_version_defaults_to_jammy() {
        // Known limitation: newer releases still map to jammy
        let host = FakeHost::new();
        let runner = RecordingRunner::new();
        let p = profile(Distribution::Ubuntu, "24.04");
        assert_eq!(resolve_codename(&host, &runner, &p).as_deref(), Some("jammy"));
    }

    #[test]
    fn test_debian_without_any_source_has_no_codename() {
        let host = FakeHost::new();
        let runner = RecordingRunner::new();
        assert_eq!(resolve_codename(&host, &runner, &profile(Distribution::Debian, "12")), None);
        assert_eq!(resolve_codename(&host, &runner, &profile(Distribution::Ubuntu, "")), None);
    }

    #[test]
    fn test_missing_codename_aborts_before_any_command() {
        let p = profile(Distribution::Debian, "");
        let host = FakeHost::new();
        let runner = RecordingRunner::new();
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        assert!(matches!(install(&ctx), Err(InstallError::MissingCodename)));
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn test_bootstrap_script_is_piped_with_codename() {
        let p = profile(Distribution::Ubuntu, "22.04");
        let host = FakeHost::new();
        let runner = RecordingRunner::new().with_output("curl -fsSL https://repo.waydro.id", "#!/bin/bash\n");
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        assert!(install(&ctx).unwrap().success);
        assert_eq!(
            runner.commands(),
            vec![
                "apt update",
                "apt upgrade -y",
                "apt install -y curl ca-certificates software-properties-common",
                "bash -s jammy",
                "apt update",
                "apt install -y waydroid",
                "waydroid init",
                "systemctl enable --now waydroid-container.service",
            ]
        );
        assert!(runner.writes().is_empty());
    }

    #[test]
    fn test_manual_repository_fallback() {
        let p = profile(Distribution::Ubuntu, "22.04");
        let host = FakeHost::new();
        // Download works, but the script fails
        let runner = RecordingRunner::new()
            .with_output("curl -fsSL https://repo.waydro.id", "exit 1\n")
            .failing_on("bash -s");
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        assert!(install(&ctx).unwrap().success);
        assert!(runner.ran("apt install -y gnupg"));
        assert!(runner.ran(
            "curl -fsSL https://repo.waydro.id/waydroid.gpg -o /usr/share/keyrings/waydroid.gpg"
        ));
        let writes = runner.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].0, Path::new(SOURCE_LIST));
        assert_eq!(
            writes[0].1,
            "deb [signed-by=/usr/share/keyrings/waydroid.gpg] https://repo.waydro.id/ jammy main\n"
        );
    }

    #[test]
    fn test_manual_fallback_failure_aborts_before_package_install() {
        let p = profile(Distribution::Debian, "");
        let host = FakeHost::new().with_file(OS_RELEASE, "VERSION_CODENAME=bookworm\n");
        let runner = RecordingRunner::new().failing_writes();
        let config = InstallerConfig::default();
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);

        let err = install(&ctx).unwrap_err();
        assert!(err.to_string().starts_with("Failed to write repository list"));
        assert!(!runner.ran("apt install -y waydroid"));
    }

    #[test]
    fn test_package_install_failure_is_fatal_firewall_failure_is_not() {
        let p = profile(Distribution::Ubuntu, "22.04");
        let host = FakeHost::new().with_programs(&["ufw"]);
        let config = InstallerConfig::default();

        let runner = RecordingRunner::new()
            .with_output("curl -fsSL https://repo.waydro.id", "#!/bin/bash\n")
            .failing_on("ufw");
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);
        assert!(install(&ctx).unwrap().success);

        let runner = RecordingRunner::new()
            .with_output("curl -fsSL https://repo.waydro.id", "#!/bin/bash\n")
            .failing_on("apt install -y waydroid");
        let ctx = context(&p, &host, &runner, &ForbiddenGate, &config, true);
        assert!(install(&ctx).is_err());
        assert!(!runner.ran("ufw"));
    }
}

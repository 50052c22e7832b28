use super::waydroid;
use super::{InstallContext, InstallError, InstallOutcome};
use crate::common::exec::Cmd;
use crate::common::package::{PACKAGE, detect_aur_helper};

pub fn install(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    ctx.step(
        "Update system",
        Cmd::new("pacman").args(["-Syu", "--noconfirm"]),
    )?;

    install_package(ctx)?;

    let gapps = waydroid::wants_gapps(ctx);
    waydroid::initialize(ctx, gapps)?;
    waydroid::enable_service(ctx)?;

    Ok(InstallOutcome::success())
}

/// Official repositories first, then whichever AUR helper is installed.
fn install_package(ctx: &InstallContext) -> Result<(), InstallError> {
    ctx.note(":: Install Waydroid");
    let official = Cmd::new("pacman").args(["-S", PACKAGE, "--noconfirm"]);
    if ctx.runner.run(&official).is_ok() {
        return Ok(());
    }

    ctx.note("Waydroid not in official repos, checking AUR...");
    let helper = detect_aur_helper(ctx.host).ok_or(InstallError::NoAurHelper)?;
    ctx.step(
        &format!("Install Waydroid with {}", helper),
        Cmd::new(helper).args(["-S", PACKAGE, "--noconfirm"]),
    )
}

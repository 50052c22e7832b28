use std::path::Path;

use super::waydroid;
use super::{InstallContext, InstallError, InstallOutcome, step_failed};
use crate::common::exec::Cmd;
use crate::common::package::PACKAGE;
use crate::common::systemd::{RUNIT_SERVICE, enable_runit_service};
use crate::ui::prelude::*;

const README: &str = "/usr/share/doc/waydroid/README.voidlinux";
const README_PREVIEW_LINES: usize = 5;

pub fn install(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    ctx.step("Update system", Cmd::new("xbps-install").args(["-Su", "-y"]))?;
    ctx.step(
        "Install Waydroid",
        Cmd::new("xbps-install").args(["-y", PACKAGE]),
    )?;

    show_readme(ctx);

    let gapps = waydroid::wants_gapps(ctx);
    waydroid::initialize(ctx, gapps)?;

    ctx.note("Enabling service (runit)...");
    enable_runit_service(ctx.runner, RUNIT_SERVICE)
        .map_err(|e| step_failed("Enable service", e))?;

    Ok(InstallOutcome::success())
}

/// The package ships Void-specific notes; show the head of them.
fn show_readme(ctx: &InstallContext) {
    let Some(content) = ctx.host.read_file(Path::new(README)) else {
        return;
    };

    let mut preview = content
        .lines()
        .take(README_PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    if content.lines().count() > README_PREVIEW_LINES {
        preview.push_str(&format!("\n... (more in {})", README));
    }
    ctx.note(&format!("Void Linux specific instructions found in {}", README));
    print_block("install.readme", &preview);
}

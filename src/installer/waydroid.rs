//! Steps shared by several strategies: container init, service, firewall.

use super::{InstallContext, InstallError, step_failed};
use crate::common::exec::Cmd;
use crate::common::systemd::{CONTAINER_UNIT, SystemdManager};

pub const GAPPS_PROMPT: &str = "Initialize with Google Apps (GAPPS)?";

/// Ask whether to pull the GAPPS image; unattended runs use the config.
pub fn wants_gapps(ctx: &InstallContext) -> bool {
    ctx.confirm_or(GAPPS_PROMPT, ctx.config.gapps)
}

/// Download the Android images and create the container.
pub fn initialize(ctx: &InstallContext, with_gapps: bool) -> Result<(), InstallError> {
    let init = Cmd::new("waydroid").arg("init");
    if with_gapps {
        ctx.step(
            "Initialize Waydroid with Google Apps",
            init.args(["-s", "GAPPS"]),
        )
    } else {
        ctx.step("Initialize Waydroid", init)
    }
}

pub fn enable_service(ctx: &InstallContext) -> Result<(), InstallError> {
    ctx.note("Enabling service...");
    SystemdManager::new(ctx.runner)
        .enable_now(CONTAINER_UNIT)
        .map_err(|e| step_failed("Enable service", e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Firewall {
    Ufw,
    /// firewalld; `bind_interface` also puts waydroid0 in the trusted zone
    Firewalld { bind_interface: bool },
}

impl Firewall {
    fn program(&self) -> &'static str {
        match self {
            Firewall::Ufw => "ufw",
            Firewall::Firewalld { .. } => "firewall-cmd",
        }
    }

    /// Rules letting the container reach DHCP, DNS and the outside world.
    pub fn rules(&self) -> Vec<Cmd> {
        match self {
            Firewall::Ufw => vec![
                Cmd::new("ufw").args(["allow", "67/udp", "comment", "Waydroid DHCP"]),
                Cmd::new("ufw").args(["allow", "53/udp", "comment", "Waydroid DNS"]),
                Cmd::new("ufw").args(["default", "allow", "FORWARD"]),
            ],
            Firewall::Firewalld { bind_interface } => {
                let trusted = |rule: &str| {
                    Cmd::new("firewall-cmd").args(["--permanent", "--zone=trusted", rule])
                };
                let mut rules = vec![
                    trusted("--add-port=67/udp"),
                    trusted("--add-port=53/udp"),
                    trusted("--add-forward"),
                ];
                if *bind_interface {
                    rules.push(trusted("--add-interface=waydroid0"));
                }
                rules.push(Cmd::new("firewall-cmd").arg("--reload"));
                rules
            }
        }
    }
}

/// Open the firewall for the container.
///
/// Best effort: a missing or failing firewall only produces a warning and
/// never changes the install outcome. Returns whether every rule applied.
pub fn configure_firewall(ctx: &InstallContext, firewall: Firewall) -> bool {
    if !ctx.config.configure_firewall || !ctx.host.has_program(firewall.program()) {
        return true;
    }

    ctx.note("Configuring firewall...");
    let mut success = true;
    for rule in firewall.rules() {
        if let Err(e) = ctx.runner.run(&rule) {
            ctx.warn(&format!("Warning: firewall rule failed: {:#}", e));
            success = false;
        }
    }
    success
}

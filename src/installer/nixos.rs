//! NixOS is configured declaratively, so nothing is executed here. The
//! user gets a configuration guide and a small helper script instead.

use std::path::Path;

use super::{InstallContext, InstallError, InstallOutcome};
use crate::common::paths;
use crate::ui::prelude::*;

const SAVE_PROMPT: &str = "Save this guide to a file?";

const GUIDE: &str = r#"NIXOS INSTALLATION GUIDE

STEP 1: Edit /etc/nixos/configuration.nix

  # Required kernel modules
  boot.kernelModules = [ "binder" "binder-devices" "binder_linux" ];
  boot.extraModulePackages = with config.boot.kernelPackages; [ binder_linux ];
  boot.extraModprobeConfig = ''
    options binder_linux devices="binder,hwbinder,vndbinder"
  '';

  # Required PSI parameter
  boot.kernelParams = [ "psi=1" ];

  # Packet forwarding
  networking.firewall.extraCommands = ''
    iptables -A FORWARD -i waydroid0 -j ACCEPT
    iptables -A FORWARD -o waydroid0 -j ACCEPT
  '';

  # Waydroid package
  environment.systemPackages = with pkgs; [
    waydroid
  ];

  # Enable service
  virtualisation.waydroid.enable = true;

  # Optional: Google Apps
  # virtualisation.waydroid.config.packages = [ "gapps" ];

STEP 2: Rebuild system

  # Test configuration
  sudo nixos-rebuild dry-build

  # Apply changes
  sudo nixos-rebuild switch

STEP 3: Post-installation

  sudo waydroid init                # or: sudo waydroid init -s GAPPS
  sudo systemctl enable --now waydroid-container.service
  waydroid session start            # as normal user
  waydroid show-full-ui

TROUBLESHOOTING

1. Binder modules not loading:
   zcat /proc/config.gz | grep BINDER
   boot.kernelPackages = pkgs.linuxPackages_latest;

2. No internet in Waydroid:
   sudo sysctl -w net.ipv4.ip_forward=1
   sudo iptables -A FORWARD -i waydroid0 -j ACCEPT

3. Play Protect certification:
   Run inside waydroid shell:
   sudo waydroid shell
   ANDROID_RUNTIME_ROOT=/apex/com.android.runtime ANDROID_DATA=/data ANDROID_TZDATA_ROOT=/apex/com.android.tzdata ANDROID_I18N_ROOT=/apex/com.android.i18n sqlite3 /data/data/com.google.android.gsf/databases/gservices.db "select * from main where name = \"android_id\";"

RESOURCES

  NixOS Wiki:    https://nixos.wiki/wiki/Waydroid
  NixOS Options: https://search.nixos.org/options?query=waydroid
  Forum:         https://discourse.nixos.org/
"#;

const HELPER_SCRIPT: &str = r#"#!/bin/bash
# Useful commands for Waydroid on NixOS

echo "Useful commands for Waydroid on NixOS:"
echo ""
echo "1. Check service status:"
echo "   sudo systemctl status waydroid-container"
echo ""
echo "2. Start manually:"
echo "   sudo waydroid container start"
echo "   waydroid session start"
echo ""
echo "3. View logs:"
echo "   journalctl -u waydroid-container -f"
echo ""
echo "4. Update images:"
echo "   sudo waydroid upgrade"
echo ""
echo "5. Android shell:"
echo "   sudo waydroid shell"
"#;

pub fn install(ctx: &InstallContext) -> Result<InstallOutcome, InstallError> {
    ctx.note("NixOS uses declarative system configuration.");
    ctx.note("Instead of running commands, follow this guide.");
    separator(false);
    print_block("install.nixos_guide", GUIDE);
    separator(false);

    let home = paths::output_dir(ctx.host.home_dir());

    if !ctx.unattended && ctx.gate.confirm(SAVE_PROMPT) {
        save(ctx, &paths::nixos_guide(&home), GUIDE, None, "Guide saved to");
    }

    if ctx.config.nixos_helper_script {
        save(
            ctx,
            &paths::nixos_helper_script(&home),
            HELPER_SCRIPT,
            Some(0o755),
            "Helper script created:",
        );
    }

    Ok(InstallOutcome::success_with_note(
        "Edit /etc/nixos/configuration.nix as shown, then run:\n  sudo nixos-rebuild switch",
    ))
}

/// Generated files are a convenience; failing to write one only warns.
fn save(ctx: &InstallContext, path: &Path, contents: &str, mode: Option<u32>, done: &str) {
    match ctx.runner.write_file(path, contents, mode) {
        Ok(()) => ctx.note(&format!("{} {}", done, path.display())),
        Err(e) => ctx.warn(&format!("Warning: could not write {}: {:#}", path.display(), e)),
    }
}

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Centralized path management for the installer

/// Default location of the installer configuration file
pub fn config_file() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("Unable to determine user config directory")?;
    Ok(config_dir.join("waydroid-installer").join("config.toml"))
}

/// Home directory used for generated helper files, `.` when unknown
pub fn output_dir(home: Option<PathBuf>) -> PathBuf {
    home.unwrap_or_else(|| PathBuf::from("."))
}

pub fn nixos_helper_script(home: &Path) -> PathBuf {
    home.join("waydroid_nixos_helper.sh")
}

pub fn nixos_guide(home: &Path) -> PathBuf {
    home.join("waydroid_nixos_installation_guide.txt")
}

/// System paths left behind by a Waydroid installation
pub const SYSTEM_PATHS: &[&str] = &[
    "/var/lib/waydroid",
    "/var/lib/waydroid-lxc",
    "/etc/modules-load.d/waydroid.conf",
    "/etc/modprobe.d/binder_linux.conf",
    APPARMOR_DNSMASQ,
];

/// Per-user paths, relative to the home directory. May contain globs.
pub const USER_PATHS: &[&str] = &[
    "waydroid",
    ".local/share/waydroid",
    ".local/share/applications/*aydroid*",
];

pub const APPARMOR_DNSMASQ: &str = "/etc/apparmor.d/usr.sbin.dnsmasq.waydroid";

/// DKMS sources of the binder kernel module
pub const BINDER_DKMS_SOURCES: &str = "/usr/src/binder_linux-*";

//! Package manager enum and related functionality.

use serde::Serialize;

use crate::common::exec::Cmd;
use crate::common::host::Host;

/// Native package managers the installer can detect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PackageManager {
    Unknown,
    /// Pacman - Arch Linux family
    Pacman,
    /// APT - Debian/Ubuntu family
    Apt,
    /// DNF - Fedora/RHEL family
    Dnf,
    /// YUM - older RHEL/CentOS
    Yum,
    /// Zypper - OpenSUSE
    Zypper,
    /// XBPS - Void Linux
    Xbps,
    /// Nix - NixOS
    Nix,
}

/// Executables probed during detection, in priority order.
///
/// On a host with several managers installed the first entry present wins;
/// apt beats pacman, pacman beats dnf, and so on.
pub const DETECTION_ORDER: &[(&str, PackageManager)] = &[
    ("apt", PackageManager::Apt),
    ("pacman", PackageManager::Pacman),
    ("dnf", PackageManager::Dnf),
    ("yum", PackageManager::Yum),
    ("zypper", PackageManager::Zypper),
    ("xbps-install", PackageManager::Xbps),
    ("nix-env", PackageManager::Nix),
];

impl PackageManager {
    /// Detect the package manager from the executables present on the host.
    pub fn detect(host: &dyn Host) -> Self {
        Self::detect_with(|program| host.has_program(program))
    }

    /// Detection against an arbitrary "is this executable present" predicate.
    pub fn detect_with(is_present: impl Fn(&str) -> bool) -> Self {
        DETECTION_ORDER
            .iter()
            .find(|(program, _)| is_present(program))
            .map(|(_, manager)| *manager)
            .unwrap_or(Self::Unknown)
    }

    /// Command that removes `package` together with its configuration.
    ///
    /// Nix is declarative and Unknown has nothing to call, so neither has one.
    pub fn remove_command(&self, package: &str) -> Option<Cmd> {
        let cmd = match self {
            Self::Pacman => Cmd::new("pacman").args(["-Rns", package, "--noconfirm"]),
            Self::Apt => Cmd::new("apt").args(["remove", "--purge", package, "-y"]),
            Self::Dnf | Self::Yum => Cmd::new("dnf").args(["remove", package, "-y"]),
            Self::Zypper => Cmd::new("zypper").args(["remove", "-y", package]),
            Self::Xbps => Cmd::new("xbps-remove").args(["-R", "-y", package]),
            Self::Nix | Self::Unknown => return None,
        };
        Some(cmd)
    }

    /// Get a human-readable name for this package manager.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Pacman => "Pacman",
            Self::Apt => "APT",
            Self::Dnf => "DNF",
            Self::Yum => "YUM",
            Self::Zypper => "Zypper",
            Self::Xbps => "XBPS",
            Self::Nix => "Nix",
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// AUR helpers tried, in order, when a package is missing from the repos.
pub const AUR_HELPERS: &[&str] = &["yay", "paru"];

/// Detect available AUR helper.
pub fn detect_aur_helper(host: &dyn Host) -> Option<&'static str> {
    AUR_HELPERS
        .iter()
        .copied()
        .find(|helper| host.has_program(helper))
}

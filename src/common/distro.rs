use serde::Serialize;
use std::path::Path;

use crate::common::host::Host;

pub const OS_RELEASE: &str = "/etc/os-release";
pub const VOID_RELEASE: &str = "/etc/void-release";

/// Marker files probed when `/etc/os-release` gives no usable `ID=`.
/// Checked in this order, first hit wins.
const RELEASE_MARKERS: &[(&str, Distribution)] = &[
    (VOID_RELEASE, Distribution::Void),
    ("/etc/arch-release", Distribution::Arch),
    ("/etc/debian_version", Distribution::Debian),
    ("/etc/fedora-release", Distribution::Fedora),
];

/// Linux distributions the installer knows about.
///
/// Derivatives such as Manjaro or Pop!_OS are folded into their family by
/// [`Distribution::from_os_release_id`]; the extra variants stay so that a
/// profile built elsewhere can still name them and dispatch correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Distribution {
    Unknown,
    Arch,
    Debian,
    Ubuntu,
    Fedora,
    OpenSUSE,
    Void,
    NixOS,
    RHEL,
    CentOS,
    Manjaro,
    PopOS,
    LinuxMint,
}

impl Distribution {
    /// Map a raw os-release `ID` to a distribution family.
    pub fn from_os_release_id(id: &str) -> Self {
        match id {
            "arch" | "manjaro" | "endeavouros" => Self::Arch,
            "debian" => Self::Debian,
            "ubuntu" | "pop" | "linuxmint" | "elementary" | "zorin" => Self::Ubuntu,
            "fedora" | "rhel" | "centos" => Self::Fedora,
            "opensuse-tumbleweed" | "opensuse-leap" => Self::OpenSUSE,
            "nixos" => Self::NixOS,
            "void" => Self::Void,
            _ => Self::Unknown,
        }
    }

    /// Detect from os-release, then from release marker files.
    pub fn detect(host: &dyn Host) -> Self {
        let from_os_release = host
            .read_file(Path::new(OS_RELEASE))
            .and_then(|content| os_release_value(&content, "ID"))
            .map(|id| Self::from_os_release_id(&id))
            .unwrap_or(Self::Unknown);

        if from_os_release != Self::Unknown {
            return from_os_release;
        }

        RELEASE_MARKERS
            .iter()
            .find(|(path, _)| host.file_exists(Path::new(path)))
            .map(|(_, distro)| *distro)
            .unwrap_or(Self::Unknown)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Arch => "Arch Linux",
            Self::Debian => "Debian",
            Self::Ubuntu => "Ubuntu",
            Self::Fedora => "Fedora",
            Self::OpenSUSE => "openSUSE",
            Self::Void => "Void Linux",
            Self::NixOS => "NixOS",
            Self::RHEL => "RHEL",
            Self::CentOS => "CentOS",
            Self::Manjaro => "Manjaro",
            Self::PopOS => "Pop!_OS",
            Self::LinuxMint => "Linux Mint",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl std::fmt::Display for Distribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Value of `KEY=` in os-release style content, with double quotes removed.
/// The first matching line wins.
pub fn os_release_value(content: &str, key: &str) -> Option<String> {
    content.lines().find_map(|line| {
        line.strip_prefix(key)
            .and_then(|rest| rest.strip_prefix('='))
            .map(|val| val.replace('"', ""))
    })
}

/// Detect the release version string.
///
/// Void reads the second token of `/etc/void-release`; everything else reads
/// `VERSION_ID` from os-release. Missing data gives an empty string.
pub fn detect_version(host: &dyn Host, distro: Distribution) -> String {
    if distro == Distribution::Void {
        return host
            .read_file(Path::new(VOID_RELEASE))
            .and_then(|content| content.split_whitespace().nth(1).map(str::to_string))
            .unwrap_or_default();
    }

    host.read_file(Path::new(OS_RELEASE))
        .and_then(|content| os_release_value(&content, "VERSION_ID"))
        .unwrap_or_default()
}

//! Installer configuration.
//!
//! Every field has a default, so a missing file and an empty file behave the
//! same. The file only matters for choices that would otherwise need a
//! prompt, plus a couple of switches for optional steps.
//!
//! ```toml
//! # Initialize with Google Apps when running --unattended
//! gapps = true
//! # Open DHCP/DNS ports and forwarding in ufw/firewalld
//! configure_firewall = true
//! # Write ~/waydroid_nixos_helper.sh on NixOS
//! nixos_helper_script = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::common::paths;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InstallerConfig {
    /// GAPPS choice used when no prompt can be shown
    pub gapps: bool,
    pub configure_firewall: bool,
    pub nixos_helper_script: bool,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            gapps: false,
            configure_firewall: true,
            nixos_helper_script: true,
        }
    }
}

impl InstallerConfig {
    /// Load from an explicit path, or from the default location.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => {
                let path = paths::config_file()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

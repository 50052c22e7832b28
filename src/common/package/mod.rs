//! Package manager detection and the package the installer manages.

mod manager;

pub use manager::{PackageManager, detect_aur_helper};

/// Name of the managed package in every distribution repository.
pub const PACKAGE: &str = "waydroid";

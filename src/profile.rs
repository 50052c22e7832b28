use comfy_table::{Table, presets::UTF8_FULL};
use serde::Serialize;

use crate::common::display_server::SessionType;
use crate::common::distro::{self, Distribution};
use crate::common::host::Host;
use crate::common::package::PackageManager;
use crate::ui::prelude::*;

/// Snapshot of the host, taken once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemProfile {
    pub distribution: Distribution,
    pub package_manager: PackageManager,
    pub version: String,
    pub architecture: String,
    pub session_type: SessionType,
    pub is_root: bool,
}

impl SystemProfile {
    /// Probe the host. Never fails; missing signals become `Unknown` or empty.
    pub fn detect(host: &dyn Host) -> Self {
        let distribution = Distribution::detect(host);
        let profile = Self {
            distribution,
            package_manager: PackageManager::detect(host),
            version: distro::detect_version(host, distribution),
            architecture: host.machine().unwrap_or_else(|| "unknown".to_string()),
            session_type: SessionType::detect(host),
            is_root: host.is_root(),
        };

        if !profile.distribution.is_known() {
            emit(
                Level::Debug,
                "probe.indeterminate",
                "No distribution signal matched; reporting Unknown",
                None,
            );
        }
        profile
    }

    /// Distribution name followed by the version, when there is one.
    pub fn describe(&self) -> String {
        if self.version.is_empty() {
            self.distribution.name().to_string()
        } else {
            format!("{} {}", self.distribution.name(), self.version)
        }
    }

    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Distribution", self.describe()),
            ("Package manager", self.package_manager.to_string()),
            ("Architecture", self.architecture.clone()),
            ("Session", self.session_type.to_string()),
            (
                "Running as root",
                if self.is_root { "Yes" } else { "No" }.to_string(),
            ),
        ]
    }

    /// Indented summary printed before installing.
    pub fn print_summary(&self) {
        emit(Level::Info, "profile.summary", "System Information:", None);
        for (key, value) in self.rows() {
            emit(Level::Info, "profile.summary", &format!("  {}: {}", key, value), None);
        }
    }

    /// Full report for `--info`.
    pub fn print_info(&self) {
        if get_output_format() == OutputFormat::Json {
            if let Ok(json) = serde_json::to_string_pretty(self) {
                println!("{}", json);
            }
            return;
        }

        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        table.set_header(vec!["System Information", ""]);
        for (key, value) in self.rows() {
            table.add_row(vec![key.to_string(), value]);
        }
        println!("{table}");
    }
}

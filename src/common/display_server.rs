use serde::Serialize;

use crate::common::host::Host;

/// Graphical session types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Wayland,
    X11,
    Unknown,
}

impl SessionType {
    /// Detect the current session type from the environment
    pub fn detect(host: &dyn Host) -> Self {
        // An explicit session type wins, whatever it says
        if let Some(session_type) = host.env_var("XDG_SESSION_TYPE") {
            return match session_type.to_lowercase().as_str() {
                "wayland" => SessionType::Wayland,
                "x11" => SessionType::X11,
                _ => SessionType::Unknown,
            };
        }

        if host.env_var("WAYLAND_DISPLAY").is_some() {
            return SessionType::Wayland;
        }

        if host.env_var("DISPLAY").is_some() {
            return SessionType::X11;
        }

        SessionType::Unknown
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionType::Wayland => "wayland",
            SessionType::X11 => "x11",
            SessionType::Unknown => "unknown",
        }
    }

    pub fn is_wayland(&self) -> bool {
        matches!(self, SessionType::Wayland)
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub mod config;
pub mod display_server;
pub mod distro;
pub mod exec;
pub mod host;
pub mod package;
pub mod paths;
pub mod prompt;
pub mod systemd;

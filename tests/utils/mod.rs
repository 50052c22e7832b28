use anyhow::Result;
use std::path::Path;
use std::process::Command;

pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run the installer binary with `args`, never attached to a terminal.
pub fn run_installer(args: &[&str]) -> Result<CommandOutput> {
    run_installer_with_env(args, &[])
}

/// Like [`run_installer`], with extra environment variables.
pub fn run_installer_with_env(args: &[&str], envs: &[(&str, &Path)]) -> Result<CommandOutput> {
    let output = Command::new(env!("CARGO_BIN_EXE_waydroid-installer"))
        .args(args)
        .envs(envs.iter().copied())
        .env("NO_COLOR", "1")
        .stdin(std::process::Stdio::null())
        .output()?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code().unwrap_or(-1),
    })
}

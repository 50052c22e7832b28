//! Structured external command execution.
//!
//! Every package-manager, service-manager and firewall call goes through a
//! [`CommandRunner`]. Commands are argument vectors ([`Cmd`]); nothing is
//! ever interpolated into a shell string.

use anyhow::{Context, Result};
use duct::cmd;
use std::fmt;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::ui::prelude::*;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
}

impl Cmd {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let words = std::iter::once(&self.program).chain(self.args.iter());
        write!(f, "{}", shell_words::join(words))
    }
}

/// Side-effecting operations against the host.
///
/// `read` is for queries (`lsb_release -cs`, `rpm-ostree status`, ...) and
/// always executes, even in dry-run mode.
pub trait CommandRunner {
    /// Run a command with inherited stdio; non-zero exit is an error.
    fn run(&self, cmd: &Cmd) -> Result<()>;

    /// Run a command feeding `input` on stdin.
    fn run_with_input(&self, cmd: &Cmd, input: &str) -> Result<()>;

    /// Run a command and capture its stdout; non-zero exit is an error.
    fn read(&self, cmd: &Cmd) -> Result<String>;

    /// Write a whole file, optionally setting its permission bits.
    fn write_file(&self, path: &Path, contents: &str, mode: Option<u32>) -> Result<()>;

    /// Remove a file or a directory tree.
    fn remove_path(&self, path: &Path) -> Result<()>;
}

/// Runs commands on the real system, or only prints them in dry-run mode.
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    pub dry_run: bool,
}

impl SystemRunner {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    fn print_dry_run(&self, action: &str) {
        emit(
            Level::Info,
            "exec.dry_run",
            &format!("[DRY RUN] {}", action),
            None,
        );
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &Cmd) -> Result<()> {
        if self.dry_run {
            self.print_dry_run(&command.to_string());
            return Ok(());
        }
        emit(Level::Debug, "exec.run", &format!("$ {}", command), None);
        cmd(command.program(), command.get_args())
            .run()
            .with_context(|| format!("Command failed: {}", command))?;
        Ok(())
    }

    fn run_with_input(&self, command: &Cmd, input: &str) -> Result<()> {
        if self.dry_run {
            self.print_dry_run(&format!("<{} bytes on stdin> | {}", input.len(), command));
            return Ok(());
        }
        emit(Level::Debug, "exec.run", &format!("$ {} (stdin)", command), None);
        cmd(command.program(), command.get_args())
            .stdin_bytes(input.as_bytes().to_vec())
            .run()
            .with_context(|| format!("Command failed: {}", command))?;
        Ok(())
    }

    fn read(&self, command: &Cmd) -> Result<String> {
        emit(Level::Debug, "exec.read", &format!("$ {}", command), None);
        cmd(command.program(), command.get_args())
            .stderr_null()
            .read()
            .with_context(|| format!("Command failed: {}", command))
    }

    fn write_file(&self, path: &Path, contents: &str, mode: Option<u32>) -> Result<()> {
        if self.dry_run {
            self.print_dry_run(&format!("write {} ({} bytes)", path.display(), contents.len()));
            return Ok(());
        }
        fs::write(path, contents).with_context(|| format!("writing {}", path.display()))?;
        if let Some(mode) = mode {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(())
    }

    fn remove_path(&self, path: &Path) -> Result<()> {
        if self.dry_run {
            self.print_dry_run(&format!("rm -rf {}", path.display()));
            return Ok(());
        }
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("inspecting {}", path.display()))?;
        if meta.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
        .with_context(|| format!("removing {}", path.display()))
    }
}

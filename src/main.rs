mod common;
mod installer;
mod profile;
#[cfg(test)]
mod testing;
mod ui;
mod uninstaller;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, ValueHint};

use crate::common::config::InstallerConfig;
use crate::common::exec::SystemRunner;
use crate::common::host::LiveHost;
use crate::common::prompt::TerminalGate;
use crate::installer::{Backend, InstallOutcome};
use crate::profile::SystemProfile;
use crate::ui::prelude::*;

/// Multi-distro installer for the Waydroid Android container
#[derive(Parser, Debug)]
#[command(
    name = "waydroid-installer",
    author,
    version,
    about,
    long_about = None,
    after_help = "Supported distributions:\n  Arch Linux, Manjaro, Void Linux, Debian, Ubuntu,\n  Fedora, RHEL, CentOS, openSUSE, NixOS\n\nExamples:\n  sudo waydroid-installer --install\n  sudo waydroid-installer --uninstall\n  sudo waydroid-installer --install --unattended"
)]
struct Cli {
    /// Install Waydroid
    #[arg(short, long)]
    install: bool,

    /// Uninstall Waydroid completely
    #[arg(short, long)]
    uninstall: bool,

    /// Run without any prompts
    #[arg(long)]
    unattended: bool,

    /// Show detected system information and exit
    #[arg(long)]
    info: bool,

    /// Output events (and --info) as JSON
    #[arg(long)]
    json: bool,

    /// Print commands and file writes instead of performing them
    #[arg(long)]
    dry_run: bool,

    /// Configuration file (defaults to ~/.config/waydroid-installer/config.toml)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Print debug events
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Install,
    Uninstall,
    Exit,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    ui::init(format, !cli.json);
    ui::set_debug_mode(cli.debug);

    let host = LiveHost;
    let profile = SystemProfile::detect(&host);

    if cli.info {
        profile.print_info();
        return ExitCode::SUCCESS;
    }

    let config = match InstallerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            emit(Level::Error, "config.invalid", &format!("Error: {:#}", e), None);
            return ExitCode::FAILURE;
        }
    };
    emit(
        Level::Debug,
        "config.loaded",
        &format!("{:?}", config),
        None,
    );

    let action = if cli.install {
        Action::Install
    } else if cli.uninstall {
        Action::Uninstall
    } else {
        match choose_action() {
            Ok(action) => action,
            Err(e) => {
                emit(Level::Error, "menu.failed", &format!("Error: {:#}", e), None);
                return ExitCode::FAILURE;
            }
        }
    };

    let runner = SystemRunner::new(cli.dry_run);
    let backend = Backend {
        host: &host,
        runner: &runner,
        gate: &TerminalGate,
        config: &config,
    };

    let outcome = match action {
        Action::Install => installer::install(&backend, &profile, cli.unattended),
        Action::Uninstall => uninstaller::uninstall(&backend, &profile, cli.unattended),
        Action::Exit => return ExitCode::SUCCESS,
    };

    ExitCode::from(exit_status(&outcome))
}

/// Interactive menu shown when no action flag was given.
fn choose_action() -> anyhow::Result<Action> {
    const CHOICES: [(&str, Action); 3] = [
        ("Install Waydroid", Action::Install),
        ("Uninstall Waydroid", Action::Uninstall),
        ("Exit", Action::Exit),
    ];

    emit(Level::Info, "menu.title", "Waydroid Installer", None);
    let labels: Vec<&str> = CHOICES.iter().map(|(label, _)| *label).collect();
    let selection = dialoguer::Select::new()
        .with_prompt("Choose an option")
        .items(&labels)
        .default(0)
        .interact_opt()
        .context("Failed to show selection dialog")?;

    Ok(selection
        .and_then(|index| CHOICES.get(index))
        .map(|(_, action)| *action)
        .unwrap_or(Action::Exit))
}

fn exit_status(outcome: &InstallOutcome) -> u8 {
    if outcome.success { 0 } else { 1 }
}

//! Yes/no confirmation gate.
//!
//! Unattended runs never reach a gate: every call site checks the
//! unattended flag itself and skips the question entirely.

use dialoguer::Confirm;

use crate::ui::prelude::*;

pub trait ConfirmationGate {
    /// Ask a yes/no question; an empty answer picks `default`.
    fn confirm_with_default(&self, prompt: &str, default: bool) -> bool;

    /// Ask a yes/no question that defaults to yes.
    fn confirm(&self, prompt: &str) -> bool {
        self.confirm_with_default(prompt, true)
    }
}

/// Terminal prompt backed by dialoguer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalGate;

impl ConfirmationGate for TerminalGate {
    fn confirm_with_default(&self, prompt: &str, default: bool) -> bool {
        match Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                // No usable terminal: treat as a refusal
                emit(
                    Level::Warn,
                    "prompt.failed",
                    &format!("Could not read an answer ({}); assuming no", e),
                    None,
                );
                false
            }
        }
    }
}

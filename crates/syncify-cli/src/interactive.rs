//! Interactive prompts for CLI commands
//!
//! Uses dialoguer for terminal-based confirmation and selection.

use colored::Colorize;
use dialoguer::{Confirm, Select};
use syncify_core::UserSurface;
use syncify_fs::NormalizedPath;

/// [`UserSurface`] that asks on the terminal.
///
/// A prompt that fails (closed stdin, no terminal) counts as the user
/// declining.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSurface;

impl UserSurface for TerminalSurface {
    fn await_resolution(&self, path: &NormalizedPath, scratch: &NormalizedPath) -> bool {
        println!();
        println!(
            "{} Merge conflict in {}",
            "CONFLICT".yellow().bold(),
            path.as_str().cyan()
        );
        println!("   Edit {} and remove the conflict markers.", scratch.as_str().cyan());
        Confirm::new()
            .with_prompt("Is the conflict resolved?")
            .default(true)
            .interact()
            .unwrap_or(false)
    }

    fn confirm_reload(&self) -> bool {
        let reload = Confirm::new()
            .with_prompt("Extensions were removed. Reload the editor now?")
            .default(true)
            .interact()
            .unwrap_or(false);
        if reload {
            println!(
                "{} Run {} in the editor to finish.",
                "=>".blue().bold(),
                "Developer: Reload Window".cyan()
            );
        }
        reload
    }

    fn select_profile(&self, names: &[String]) -> Option<String> {
        let index = Select::new()
            .with_prompt("Switch to profile")
            .items(names)
            .default(0)
            .interact_opt()
            .ok()
            .flatten()?;
        names.get(index).cloned()
    }

    fn status(&self, message: &str) {
        println!("{} {}", "=>".blue().bold(), message);
    }
}

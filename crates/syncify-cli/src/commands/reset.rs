//! Reset command implementation

use colored::Colorize;
use dialoguer::Confirm;

use crate::context::AppContext;
use crate::error::{CliError, Result};

/// Restore the local settings to their defaults. The synced working tree
/// is left on disk.
pub fn run_reset(app: &AppContext, yes: bool) -> Result<()> {
    if !yes {
        if !app.is_interactive() {
            return Err(CliError::user("Refusing to reset without --yes"));
        }
        let proceed = Confirm::new()
            .with_prompt("Reset the local settings to their defaults?")
            .default(false)
            .interact()?;
        if !proceed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    let settings = app.sync_context().settings;
    settings.reset_local()?;
    println!(
        "{} Local settings reset ({}).",
        "OK".green().bold(),
        settings.local_path()
    );
    Ok(())
}

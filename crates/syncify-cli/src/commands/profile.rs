//! Profile command implementations

use colored::Colorize;
use syncify_core::ProfileManager;

use crate::commands::sync::print_report;
use crate::context::AppContext;
use crate::error::Result;

/// List profiles from the shared settings
pub fn run_profile_list(app: &AppContext) -> Result<()> {
    let ctx = app.sync_context();
    let current = ctx.settings.get_local()?.current_profile;
    let profiles = ProfileManager::new(&ctx.settings).list()?;

    println!("{}", "Profiles".bold());
    for profile in profiles {
        let marker = if profile.name == current {
            "*".green().bold()
        } else {
            " ".normal()
        };
        println!(
            "  {} {} {}",
            marker,
            profile.name.cyan(),
            format!("({}, {} extensions)", profile.branch, profile.extensions.len()).dimmed()
        );
    }
    Ok(())
}

/// Switch profile, then download it
pub fn run_profile_switch(app: &AppContext, name: Option<&str>) -> Result<()> {
    let engine = app.engine()?;
    let report = engine.switch_profile(name);
    print_report(&report, "Profile switch", false)
}

/// Create a profile
pub fn run_profile_create(app: &AppContext, name: &str, branch: Option<&str>) -> Result<()> {
    let ctx = app.sync_context();
    let branch = branch.unwrap_or(name);
    let profile = ProfileManager::new(&ctx.settings).create(name, branch)?;
    println!(
        "{} Created profile {} on {}.",
        "OK".green().bold(),
        profile.name.cyan(),
        profile.branch.cyan()
    );
    println!(
        "Run {} to use it.",
        format!("syncify profile switch {}", profile.name).cyan()
    );
    Ok(())
}

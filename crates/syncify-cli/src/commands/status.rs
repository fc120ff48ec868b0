//! Status command implementation

use colored::Colorize;
use serde_json::json;
use syncify_core::{
    LocalSettings, Profile, ProfileManager, SyncPosition, SyncerKind, classify,
};
use syncify_git::{CommitInfo, DEFAULT_REMOTE, GitBackend, VersionControl, branch_to_folder};

use crate::context::AppContext;
use crate::error::Result;

const HISTORY_LENGTH: usize = 5;

/// Branch position and history, as of the last fetch.
struct RepoState {
    position: Option<SyncPosition>,
    commits: Vec<CommitInfo>,
}

fn repo_state(app: &AppContext, profile: &Profile) -> Option<RepoState> {
    let backend = GitBackend::new(app.paths().repo_dir());
    if !backend.check_is_repo() {
        return None;
    }
    let branch = &profile.branch;
    let position = classify(
        &backend,
        &format!("refs/heads/{branch}"),
        &format!("refs/remotes/{DEFAULT_REMOTE}/{branch}"),
    )
    .ok();
    let commits = backend
        .recent_commits(branch, HISTORY_LENGTH)
        .unwrap_or_default();
    Some(RepoState { position, commits })
}

fn target(local: &LocalSettings, profile: Option<&Profile>) -> Option<String> {
    match local.syncer {
        SyncerKind::Repo => local.repo.url.clone(),
        SyncerKind::File => local.file.path.as_ref().map(|path| match profile {
            Some(profile) => format!("{path}/{}", branch_to_folder(&profile.branch)),
            None => path.clone(),
        }),
    }
}

/// Run the status command
pub fn run_status(app: &AppContext, json: bool) -> Result<()> {
    let engine = app.engine()?;
    let ctx = engine.context();
    let local = ctx.settings.get_local()?;
    let profile = ProfileManager::new(&ctx.settings).get_current().ok();
    let configured = engine.is_configured();
    let target = target(&local, profile.as_ref());
    let state = match (&profile, local.syncer) {
        (Some(profile), SyncerKind::Repo) => repo_state(app, profile),
        _ => None,
    };

    if json {
        let commits: Vec<_> = state
            .iter()
            .flat_map(|state| &state.commits)
            .map(|commit| {
                json!({
                    "hash": commit.hash,
                    "message": commit.message,
                    "author": commit.author,
                    "timestamp": commit.timestamp.to_rfc3339(),
                })
            })
            .collect();
        let value = json!({
            "configured": configured,
            "syncer": local.syncer.to_string(),
            "target": target,
            "profile": profile.as_ref().map(|p| &p.name),
            "branch": profile.as_ref().map(|p| &p.branch),
            "position": state.as_ref().and_then(|s| s.position).map(|p| p.to_string()),
            "hostname": local.hostname,
            "local_dir": app.paths().local_dir.as_str(),
            "user_dir": app.paths().user_dir.as_str(),
            "recent_commits": commits,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{}", "Syncify Status".bold());
    println!();
    println!("{}:  {}", "User dir".dimmed(), app.paths().user_dir);
    println!("{}: {}", "Local dir".dimmed(), app.paths().local_dir);
    println!("{}:    {}", "Syncer".dimmed(), local.syncer.to_string().cyan());
    match &target {
        Some(target) => println!("{}:    {}", "Target".dimmed(), target.cyan()),
        None => println!("{}:    {}", "Target".dimmed(), "(not set)".yellow()),
    }
    match &profile {
        Some(profile) => println!(
            "{}:   {} ({})",
            "Profile".dimmed(),
            profile.name.cyan(),
            profile.branch.dimmed()
        ),
        None => println!(
            "{}:   {} ({})",
            "Profile".dimmed(),
            local.current_profile.yellow(),
            "unknown".yellow()
        ),
    }
    let host = if local.hostname.is_empty() {
        "(unset)".dimmed().to_string()
    } else {
        local.hostname.clone()
    };
    println!("{}:      {}", "Host".dimmed(), host);
    println!();

    if !configured {
        println!(
            "{} Run {} to configure.",
            "NOT CONFIGURED".yellow().bold(),
            "syncify config set".cyan()
        );
        return Ok(());
    }

    if let Some(state) = state {
        if let Some(position) = state.position {
            println!("{}: {} (as of last fetch)", "Position".dimmed(), position);
        }
        println!();
        println!("{}:", "Recent Commits".bold());
        if state.commits.is_empty() {
            println!("  {}", "None".dimmed());
        }
        for commit in &state.commits {
            println!(
                "  {} {} {}",
                commit.hash.yellow(),
                commit.message,
                format!("({}, {})", commit.author, commit.timestamp.format("%Y-%m-%d %H:%M")).dimmed()
            );
        }
    }
    Ok(())
}

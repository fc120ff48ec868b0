//! Syncify CLI
//!
//! Keeps editor settings, keybindings, snippets and extensions in step
//! across machines through a git remote or a shared folder.

mod cli;
mod commands;
mod context;
mod error;
mod interactive;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ConfigAction, ProfileAction};
use commands::Operation;
use context::AppContext;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let Some(command) = cli.command.clone() else {
        println!(
            "{} Editor settings sync",
            "syncify".green().bold()
        );
        println!();
        println!("Run {} for available commands.", "syncify --help".cyan());
        return Ok(());
    };

    if let Commands::Completions { shell } = command {
        clap_complete::generate(shell, &mut Cli::command(), "syncify", &mut std::io::stdout());
        return Ok(());
    }

    let app = AppContext::from_cli(&cli)?;
    execute_command(&app, command)
}

fn execute_command(app: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Init { json } => commands::run_operation(app, Operation::Init, json),
        Commands::Sync { json } => commands::run_operation(app, Operation::Sync, json),
        Commands::Upload { json } => commands::run_operation(app, Operation::Upload, json),
        Commands::Download { json } => commands::run_operation(app, Operation::Download, json),
        Commands::Status { json } => commands::run_status(app, json),
        Commands::Profile { action } => match action {
            ProfileAction::List => commands::run_profile_list(app),
            ProfileAction::Switch { name } => commands::run_profile_switch(app, name.as_deref()),
            ProfileAction::Create { name, branch } => {
                commands::run_profile_create(app, &name, branch.as_deref())
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::run_config_show(app),
            ConfigAction::Set { key, value } => commands::run_config_set(app, &key, &value),
            ConfigAction::Path => commands::run_config_path(app),
        },
        Commands::Watch { delay } => commands::run_watch(app, delay),
        Commands::Reset { yes } => commands::run_reset(app, yes),
        Commands::Completions { .. } => Ok(()),
    }
}

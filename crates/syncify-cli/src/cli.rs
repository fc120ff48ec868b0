//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Syncify - Keep editor settings, keybindings and extensions in sync
#[derive(Parser, Debug)]
#[command(name = "syncify")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Per-machine Syncify directory (defaults to <config dir>/syncify)
    #[arg(long, global = true, env = "SYNCIFY_HOME")]
    pub local_dir: Option<PathBuf>,

    /// Editor user directory (defaults to <config dir>/Code/User)
    #[arg(long, global = true, env = "SYNCIFY_USER_DIR")]
    pub user_dir: Option<PathBuf>,

    /// Editor command used to list, install and uninstall extensions
    #[arg(long, global = true, env = "SYNCIFY_EDITOR_CLI", default_value = "code")]
    pub editor_cli: String,

    /// Never prompt. Conflicts stay unresolved and are reported
    #[arg(long, global = true)]
    pub non_interactive: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Prepare the export target (repository clone or profile folder)
    Init {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Upload or download, whichever the current state calls for
    Sync {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export local settings and publish them
    Upload {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fetch the current profile and apply it locally
    Download {
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configuration, profile and recent history
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Manage profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Show or change the local settings
    ///
    /// Examples:
    ///   syncify config set repo.url git@example.com:me/settings.git
    ///   syncify config set syncer file
    ///   syncify config set ignored_items '["History/", "*.log"]'
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Watch the user directory and upload after changes settle
    ///
    /// Press Enter to cancel a pending upload, Ctrl-C to stop watching.
    Watch {
        /// Seconds to wait after a change (defaults to auto_upload_delay)
        #[arg(long)]
        delay: Option<u64>,
    },

    /// Restore the local settings to their defaults
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Profile subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ProfileAction {
    /// List profiles, marking the current one
    List,

    /// Make a profile current and download it
    Switch {
        /// Profile name (prompts when omitted)
        name: Option<String>,
    },

    /// Add a profile
    Create {
        name: String,

        /// Branch (repo syncer) or folder (file syncer); defaults to the name
        #[arg(short, long)]
        branch: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the local settings
    Show,

    /// Change one local setting, addressed with a dotted key
    Set { key: String, value: String },

    /// Print the path of the local settings file
    Path,
}

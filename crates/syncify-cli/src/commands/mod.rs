//! Command implementations for syncify-cli

pub mod config;
pub mod profile;
pub mod reset;
pub mod status;
pub mod sync;
pub mod watch;

pub use config::{run_config_path, run_config_set, run_config_show};
pub use profile::{run_profile_create, run_profile_list, run_profile_switch};
pub use reset::run_reset;
pub use status::run_status;
pub use sync::{Operation, run_operation};
pub use watch::run_watch;

//! Init, sync, upload and download command implementations

use colored::Colorize;
use syncify_core::SyncReport;

use crate::context::AppContext;
use crate::error::{CliError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Init,
    Sync,
    Upload,
    Download,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Self::Init => "Init",
            Self::Sync => "Sync",
            Self::Upload => "Upload",
            Self::Download => "Download",
        }
    }
}

/// Run one transaction and print its report.
pub fn run_operation(app: &AppContext, operation: Operation, json: bool) -> Result<()> {
    if !json {
        println!(
            "{} {} in progress...",
            "=>".blue().bold(),
            operation.label()
        );
    }

    let engine = app.engine()?;
    let report = match operation {
        Operation::Init => engine.init(),
        Operation::Sync => engine.sync(),
        Operation::Upload => engine.upload(),
        Operation::Download => engine.download(),
    };
    print_report(&report, operation.label(), json)
}

/// Print `report` for humans or as JSON.
///
/// A not-configured report is a hint, not a failure. Any other failed
/// report becomes an error so the process exits non-zero.
pub fn print_report(report: &SyncReport, label: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else if report.is_not_configured() {
        print_not_configured(report);
    } else {
        print_human(report, label);
    }

    if report.success || report.is_not_configured() {
        Ok(())
    } else {
        Err(CliError::user(format!("{label} failed")))
    }
}

fn print_not_configured(report: &SyncReport) {
    println!("{} Syncify is not configured.", "NOT CONFIGURED".yellow().bold());
    for warning in &report.warnings {
        println!("   {} {}", "-".yellow(), warning);
    }
    println!();
    println!(
        "Run {} or {}.",
        "syncify config set repo.url <URL>".cyan(),
        "syncify config set file.path <DIR>".cyan()
    );
}

fn print_human(report: &SyncReport, label: &str) {
    for action in &report.actions {
        println!("   {} {}", "+".green(), action);
    }
    for warning in &report.warnings {
        println!("   {} {}", "!".yellow(), warning);
    }
    for error in &report.errors {
        println!("   {} {}", "!".red(), error);
    }

    let outcome = report
        .outcome
        .map(|outcome| format!(" ({outcome})"))
        .unwrap_or_default();
    if report.success {
        println!("{} {label} complete{outcome}.", "OK".green().bold());
    } else {
        println!("{} {label} finished with errors{outcome}.", "ERROR".red().bold());
    }
    if report.reload_required {
        println!("Reload the editor to finish removing extensions.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncify_core::SyncOutcome;

    #[test]
    fn test_not_configured_is_not_an_error() {
        let report = SyncReport::not_configured("Set a repository URL");
        assert!(print_report(&report, "Sync", false).is_ok());
    }

    #[test]
    fn test_failed_report_is_an_error() {
        let report = SyncReport::failure("push rejected");
        let error = print_report(&report, "Upload", false).unwrap_err();
        assert_eq!(error.to_string(), "Upload failed");
    }

    #[test]
    fn test_successful_report_as_json() {
        let report = SyncReport::success().with_outcome(SyncOutcome::Uploaded);
        assert!(print_report(&report, "Upload", true).is_ok());
    }
}

//! Watch command: debounced automatic upload

use std::io::BufRead;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use colored::Colorize;
use syncify_core::{FsWatcher, SyncEngine, UploadScheduler, Watcher};
use syncify_fs::IgnoreSet;

use crate::commands::sync::print_report;
use crate::context::AppContext;
use crate::error::Result;

const TICK: Duration = Duration::from_secs(1);

/// Forward each line typed on stdin as a cancel request.
fn cancel_requests() -> Receiver<()> {
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            if line.is_err() || sender.send(()).is_err() {
                break;
            }
        }
    });
    receiver
}

/// Watch the user directory until interrupted
pub fn run_watch(app: &AppContext, delay: Option<u64>) -> Result<()> {
    let paths = app.paths();
    let local = app.sync_context().settings.get_local()?;
    let delay = Duration::from_secs(delay.unwrap_or(local.auto_upload_delay));

    let ignore = IgnoreSet::new(&paths.user_dir, &local.ignored_items)?;
    let watcher = Arc::new(FsWatcher::new(paths.user_dir.clone(), ignore));
    let engine = SyncEngine::new(app.sync_context_with(watcher.clone()))?;
    if !engine.is_configured() {
        return print_report(
            &syncify_core::SyncReport::not_configured("Nothing to upload to"),
            "Watch",
            false,
        );
    }

    let scheduler = UploadScheduler::new(delay);
    let cancels = cancel_requests();
    watcher.start()?;
    println!(
        "{} Watching {} (uploads {}s after a change; Enter cancels, Ctrl-C quits)",
        "=>".blue().bold(),
        paths.user_dir.as_str().cyan(),
        delay.as_secs()
    );

    loop {
        let changed = watcher.changed(TICK);

        while cancels.try_recv().is_ok() {
            if scheduler.cancel() {
                println!("{} Pending upload cancelled.", "-".yellow());
            }
        }

        if changed && scheduler.request(Instant::now()) {
            println!("{} Change detected; upload scheduled.", "+".green());
        }

        if scheduler.take_due(Instant::now()) {
            let report = engine.upload();
            if let Err(e) = print_report(&report, "Upload", false) {
                tracing::error!(error = %e, "Automatic upload failed");
            }
        }
    }
}

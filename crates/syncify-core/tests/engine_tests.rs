//! Transaction handling around a syncer: errors, watcher and lock.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use common::Machine;
use syncify_core::{
    Error, Result, SyncContext, SyncEngine, SyncOutcome, SyncReport, Syncer, SyncerKind,
    TransactionLock, Watcher,
};
use syncify_fs::LocalFileStore;

#[derive(Default)]
struct FlagWatcher {
    running: AtomicBool,
    starts: AtomicUsize,
}

impl Watcher for FlagWatcher {
    fn start(&self) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct Probe {
    calls: AtomicUsize,
    saw_watcher_running: AtomicBool,
}

/// Syncer whose every operation ends the way `outcome` says, recording
/// whether the watcher was stopped while it ran.
struct StubSyncer {
    outcome: fn() -> Result<SyncReport>,
    watcher: Arc<FlagWatcher>,
    probe: Arc<Probe>,
}

impl StubSyncer {
    fn run(&self) -> Result<SyncReport> {
        self.probe.calls.fetch_add(1, Ordering::SeqCst);
        self.probe
            .saw_watcher_running
            .fetch_or(self.watcher.is_running(), Ordering::SeqCst);
        (self.outcome)()
    }
}

impl Syncer for StubSyncer {
    fn kind(&self) -> SyncerKind {
        SyncerKind::File
    }

    fn is_configured(&self, _ctx: &SyncContext) -> bool {
        true
    }

    fn init(&self, _ctx: &SyncContext) -> Result<()> {
        Ok(())
    }

    fn sync(&self, _ctx: &SyncContext) -> Result<SyncReport> {
        self.run()
    }

    fn upload(&self, _ctx: &SyncContext) -> Result<SyncReport> {
        self.run()
    }

    fn download(&self, _ctx: &SyncContext) -> Result<SyncReport> {
        self.run()
    }
}

struct Harness {
    engine: SyncEngine,
    watcher: Arc<FlagWatcher>,
    probe: Arc<Probe>,
}

fn harness(machine: &Machine, outcome: fn() -> Result<SyncReport>) -> Harness {
    let watcher = Arc::new(FlagWatcher::default());
    watcher.start().unwrap();
    let probe = Arc::new(Probe::default());
    let syncer = StubSyncer {
        outcome,
        watcher: watcher.clone(),
        probe: probe.clone(),
    };
    let context = SyncContext::new(
        machine.paths(),
        Arc::new(LocalFileStore::new()),
        machine.extensions.clone(),
        watcher.clone(),
        machine.surface.clone(),
    );
    Harness {
        engine: SyncEngine::with_syncer(context, Box::new(syncer)),
        watcher,
        probe,
    }
}

#[test]
fn test_backend_failure_becomes_failed_report_and_watcher_restarts() {
    let machine = Machine::new("desktop", &[]);
    let h = harness(&machine, || {
        Err(Error::Io(std::io::Error::other("network unreachable")))
    });

    let report = h.engine.upload();

    assert!(!report.success);
    assert!(report.errors[0].contains("network unreachable"));
    assert!(!h.probe.saw_watcher_running.load(Ordering::SeqCst));
    assert!(h.watcher.is_running());
    assert_eq!(h.watcher.starts.load(Ordering::SeqCst), 2);
}

#[test]
fn test_not_configured_error_is_a_hint() {
    let machine = Machine::new("desktop", &[]);
    let h = harness(&machine, || Err(Error::not_configured("no folder")));

    let report = h.engine.sync();

    assert!(report.is_not_configured());
    assert!(report.errors.is_empty());
}

#[test]
fn test_success_is_announced_on_the_surface() {
    let machine = Machine::new("desktop", &[]);
    let h = harness(&machine, || {
        Ok(SyncReport::success().with_outcome(SyncOutcome::Downloaded))
    });

    let report = h.engine.download();

    assert!(report.success);
    assert_eq!(machine.surface.statuses(), vec!["Syncify: download downloaded"]);
}

#[test]
fn test_second_transaction_is_refused_while_locked() {
    let machine = Machine::new("desktop", &[]);
    let h = harness(&machine, || Ok(SyncReport::success()));
    let _held = TransactionLock::acquire(&machine.local_dir()).unwrap();

    let report = h.engine.sync();

    assert!(!report.success);
    assert_eq!(h.probe.calls.load(Ordering::SeqCst), 0);
    assert!(h.watcher.is_running());
}

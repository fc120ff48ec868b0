//! Repo syncer transactions against a bare git remote.

mod common;

use common::Machine;
use pretty_assertions::assert_eq;
use syncify_core::{ProfileManager, SyncOutcome, TransactionLock};
use syncify_git::{GitBackend, VersionControl};
use syncify_test_utils::git::{bare_remote, read_blob};
use tempfile::TempDir;

const DESKTOP_SETTINGS: &str = "{\n  // @sync host=laptop\n  // \"editor.fontSize\": 14,\n  \"files.autoSave\": \"off\"\n}\n";
const LAPTOP_SETTINGS: &str = "{\n  // @sync host=laptop\n  \"editor.fontSize\": 14,\n  \"files.autoSave\": \"off\"\n}\n";

struct Remote {
    _temp: TempDir,
    path: std::path::PathBuf,
}

impl Remote {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let path = bare_remote(&temp.path().join("remote.git"));
        Self { _temp: temp, path }
    }

    fn read(&self, branch: &str, relative: &str) -> Option<String> {
        read_blob(&self.path, branch, relative)
    }
}

#[test]
fn test_unconfigured_machine_reports_not_configured() {
    let machine = Machine::new("desktop", &[]);
    machine.editor.write("settings.json", "{}\n");

    let report = machine.engine().sync();

    assert!(report.is_not_configured());
    assert!(!machine.paths().repo_dir().exists());
}

#[test]
fn test_upload_then_download_on_second_machine() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &["ms-python.python"]);
    desktop.editor.write("settings.json", DESKTOP_SETTINGS);
    desktop.editor.write("snippets/rust.json", "{}\n");

    let report = desktop.engine().upload();
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Uploaded));
    assert_eq!(
        remote.read("main", "settings.json").as_deref(),
        Some(DESKTOP_SETTINGS)
    );
    assert_eq!(remote.read("main", "snippets/rust.json").as_deref(), Some("{}\n"));
    assert!(
        remote
            .read("main", "extensions.json")
            .unwrap()
            .contains("ms-python.python")
    );
    assert!(remote.read("main", "syncify.json").is_some());

    let laptop = Machine::repo("laptop", &remote.path, &["old.theme"]);
    let report = laptop.engine().download();
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Downloaded));
    assert_eq!(laptop.editor.read("settings.json"), LAPTOP_SETTINGS);
    assert_eq!(laptop.editor.read("snippets/rust.json"), "{}\n");
    assert_eq!(laptop.extensions.installed(), vec!["ms-python.python".to_string()]);
    assert!(report.reload_required);
    assert_eq!(laptop.surface.reloads(), 1);
}

#[test]
fn test_second_upload_without_changes_is_up_to_date() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    desktop.editor.write("settings.json", DESKTOP_SETTINGS);

    assert_eq!(desktop.engine().upload().outcome, Some(SyncOutcome::Uploaded));
    let report = desktop.engine().upload();
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::UpToDate));
}

#[test]
fn test_download_without_remote_branch_reports_no_data() {
    let remote = Remote::new();
    let laptop = Machine::repo("laptop", &remote.path, &[]);

    let report = laptop.engine().download();

    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::NoRemoteData));
}

#[test]
fn test_init_prepares_tree_without_publishing() {
    let remote = Remote::new();
    let laptop = Machine::repo("laptop", &remote.path, &[]);
    laptop.editor.write("settings.json", "{}\n");

    let report = laptop.engine().init();

    assert!(report.success, "{report:?}");
    let backend = GitBackend::new(laptop.paths().repo_dir());
    assert!(backend.check_is_repo());
    let remotes = backend.get_remotes().unwrap();
    assert_eq!(remotes[0].url.as_deref(), Some(remote.path.to_string_lossy().as_ref()));
    assert_eq!(remote.read("main", "settings.json"), None);
}

#[test]
fn test_sync_picks_direction() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    let laptop = Machine::repo("laptop", &remote.path, &[]);

    desktop.editor.write("settings.json", "{\n  \"a\": 1\n}\n");
    assert_eq!(desktop.engine().sync().outcome, Some(SyncOutcome::Uploaded));

    // First sync on a machine with an existing remote profile takes it
    laptop.editor.write("settings.json", "{}\n");
    assert_eq!(laptop.engine().sync().outcome, Some(SyncOutcome::Downloaded));
    assert_eq!(laptop.editor.read("settings.json"), "{\n  \"a\": 1\n}\n");

    assert_eq!(laptop.engine().sync().outcome, Some(SyncOutcome::UpToDate));

    laptop.editor.write("settings.json", "{\n  \"a\": 2\n}\n");
    assert_eq!(laptop.engine().sync().outcome, Some(SyncOutcome::Uploaded));

    let report = desktop.engine().sync();
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Downloaded));
    assert_eq!(desktop.editor.read("settings.json"), "{\n  \"a\": 2\n}\n");
}

#[test]
fn test_upload_merges_remote_changes_and_resolves_conflicts() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    let laptop = Machine::repo("laptop", &remote.path, &[]);

    desktop.editor.write("settings.json", "{\n  \"k\": 1\n}\n");
    assert!(desktop.engine().upload().success);
    assert!(laptop.engine().download().success);

    desktop.editor.write("settings.json", "{\n  \"k\": 2\n}\n");
    assert!(desktop.engine().upload().success);

    let resolved = "{\n  \"k\": 23\n}\n";
    laptop.editor.write("settings.json", "{\n  \"k\": 3\n}\n");
    laptop.surface.resolve_with(resolved);
    let report = laptop.engine().upload();

    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Merged));
    assert_eq!(laptop.editor.read("settings.json"), resolved);
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some(resolved));
    assert!(!laptop.paths().conflicts_dir().join("settings.json").exists());
}

#[test]
fn test_unresolved_conflict_keeps_remote_and_scratch_copy() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    let laptop = Machine::repo("laptop", &remote.path, &[]);

    desktop.editor.write("settings.json", "{\n  \"k\": 1\n}\n");
    assert!(desktop.engine().upload().success);
    assert!(laptop.engine().download().success);

    desktop.editor.write("settings.json", "{\n  \"k\": 2\n}\n");
    assert!(desktop.engine().upload().success);

    laptop.editor.write("settings.json", "{\n  \"k\": 3\n}\n");
    let report = laptop.engine().upload();

    assert!(!report.success);
    assert!(report.errors.iter().any(|e| e.contains("settings.json")));
    assert_eq!(
        remote.read("main", "settings.json").as_deref(),
        Some("{\n  \"k\": 2\n}\n")
    );
    assert_eq!(laptop.editor.read("settings.json"), "{\n  \"k\": 3\n}\n");
    assert!(laptop.paths().conflicts_dir().join("settings.json").exists());
}

#[test]
fn test_force_download_discards_local_edits() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    let laptop = Machine::repo("laptop", &remote.path, &[]);

    desktop.editor.write("settings.json", "{\n  \"k\": 1\n}\n");
    assert!(desktop.engine().upload().success);
    assert!(laptop.engine().download().success);

    desktop.editor.write("settings.json", "{\n  \"k\": 2\n}\n");
    assert!(desktop.engine().upload().success);

    laptop.editor.write("settings.json", "{\n  \"k\": 3\n}\n");
    laptop.update(|local| local.force_download = true);
    let report = laptop.engine().download();

    assert!(report.success, "{report:?}");
    assert_eq!(laptop.editor.read("settings.json"), "{\n  \"k\": 2\n}\n");
}

#[test]
fn test_ignored_items_stay_local() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    desktop.editor.write("settings.json", "{}\n");
    desktop.editor.write("workspaceStorage/abc/state.json", "{}\n");
    desktop.update(|local| local.ignored_items.push("*.log".into()));
    desktop.editor.write("trace.log", "noise");

    assert!(desktop.engine().upload().success);

    assert!(remote.read("main", "settings.json").is_some());
    assert!(remote.read("main", "workspaceStorage/abc/state.json").is_none());
    assert!(remote.read("main", "trace.log").is_none());
}

#[test]
fn test_new_profile_gets_its_own_branch() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    desktop.editor.write("settings.json", "{\n  \"theme\": \"light\"\n}\n");
    assert!(desktop.engine().upload().success);

    let engine = desktop.engine();
    ProfileManager::new(&engine.context().settings)
        .create("work", "work")
        .unwrap();
    let report = engine.switch_profile(Some("work"));
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::NoRemoteData));

    desktop.editor.write("settings.json", "{\n  \"theme\": \"dark\"\n}\n");
    let report = desktop.engine().upload();
    assert!(report.success, "{report:?}");

    assert!(
        remote
            .read("work", "settings.json")
            .unwrap()
            .contains("dark")
    );
    assert!(remote.read("main", "settings.json").unwrap().contains("light"));
    assert!(remote.read("work", "syncify.json").unwrap().contains("\"work\""));
}

#[test]
fn test_unknown_profile_is_not_configured() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    desktop.update(|local| local.current_profile = "missing".into());

    let report = desktop.engine().upload();

    assert!(report.is_not_configured());
}

#[test]
fn test_concurrent_transaction_is_refused() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    desktop.editor.write("settings.json", "{}\n");

    let _held = TransactionLock::acquire(&desktop.local_dir()).unwrap();
    let report = desktop.engine().upload();

    assert!(!report.success);
    assert!(report.errors[0].contains("already running"));
}

#[cfg(target_os = "linux")]
#[test]
fn test_separate_keybindings_export_per_os() {
    let remote = Remote::new();
    let desktop = Machine::repo("desktop", &remote.path, &[]);
    desktop.update(|local| local.separate_keybindings = true);
    desktop.editor.write("keybindings.json", "[]\n");

    assert!(desktop.engine().upload().success);

    assert_eq!(remote.read("main", "keybindings-linux.json").as_deref(), Some("[]\n"));
    assert!(remote.read("main", "keybindings.json").is_none());

    let laptop = Machine::repo("laptop", &remote.path, &[]);
    laptop.update(|local| local.separate_keybindings = true);
    assert!(laptop.engine().download().success);
    assert_eq!(laptop.editor.read("keybindings.json"), "[]\n");
}

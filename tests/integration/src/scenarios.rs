//! End-to-end scenarios: several machines sharing one remote or folder.

mod harness;

use harness::{Machine, Remote};
use pretty_assertions::assert_eq;
use syncify_core::{SyncOutcome, SyncPosition, classify};
use syncify_extensions::{missing, unneeded};
use syncify_git::GitBackend;
use syncify_pragma::{Os, PragmaContext, incoming};
use tempfile::TempDir;

const MARKERS: &str =
    "{\n<<<<<<< HEAD\n  \"k\": 1\n=======\n  \"k\": false\n>>>>>>> origin/main\n}\n";

fn strings(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

// ============================================================================
// Scenario 1: first upload to an empty remote
// ============================================================================

#[test]
fn test_first_upload_creates_remote_branch() {
    let remote = Remote::new();
    let laptop = Machine::repo("laptop", &remote);
    laptop.editor.write("settings.json", "{\"k\":1}");

    let engine = laptop.engine();
    engine.syncer().init(engine.context()).unwrap();
    let backend = GitBackend::new(laptop.paths().repo_dir());
    let position = classify(&backend, "refs/heads/main", "refs/remotes/origin/main").unwrap();
    assert_eq!(position, SyncPosition::Unborn);

    let report = engine.upload();
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Uploaded));
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":1}"));
}

// ============================================================================
// Scenario 2: a stale machine never overwrites the remote
// ============================================================================

/// Laptop uploads `{"k":1}`, then desktop downloads it and publishes
/// `{"k":false}`.
fn laptop_then_desktop(remote: &Remote) -> (Machine, Machine) {
    let laptop = Machine::repo("laptop", remote);
    laptop.editor.write("settings.json", "{\"k\":1}");
    assert!(laptop.engine().upload().success);

    let desktop = Machine::repo("desktop", remote);
    let report = desktop.engine().download();
    assert!(report.success, "{report:?}");
    desktop.editor.write("settings.json", "{\"k\":false}");
    let report = desktop.engine().upload();
    assert_eq!(report.outcome, Some(SyncOutcome::Uploaded), "{report:?}");

    (laptop, desktop)
}

#[test]
fn test_behind_machine_merges_instead_of_pushing() {
    let remote = Remote::new();
    let (laptop, _desktop) = laptop_then_desktop(&remote);

    let report = laptop.engine().upload();

    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Merged));
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":false}"));
    assert_eq!(laptop.editor.read("settings.json"), "{\"k\":false}");
}

#[test]
fn test_diverged_machine_keeps_remote_until_conflict_is_resolved() {
    let remote = Remote::new();
    let (laptop, _desktop) = laptop_then_desktop(&remote);
    laptop.editor.write("settings.json", "{\"k\":2}");

    let report = laptop.engine().upload();

    assert!(!report.success);
    assert!(report.errors.iter().any(|e| e.contains("settings.json")), "{report:?}");
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":false}"));
    assert_eq!(laptop.editor.read("settings.json"), "{\"k\":2}");
    assert_eq!(laptop.user.asked().len(), 1);
}

#[test]
fn test_diverged_machine_pushes_the_resolution() {
    let remote = Remote::new();
    let (laptop, _desktop) = laptop_then_desktop(&remote);
    laptop.editor.write("settings.json", "{\"k\":2}");
    laptop.user.will_resolve_with("{\"k\":3}");

    let report = laptop.engine().upload();

    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Merged));
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":3}"));
    assert_eq!(laptop.editor.read("settings.json"), "{\"k\":3}");
}

#[test]
fn test_sync_with_local_edit_keeps_remote_until_conflict_is_resolved() {
    let remote = Remote::new();
    let (laptop, _desktop) = laptop_then_desktop(&remote);
    laptop.editor.write("settings.json", "{\"k\":2}");

    for attempt in 1..=2 {
        let report = laptop.engine().sync();

        assert!(!report.success, "attempt {attempt}: {report:?}");
        assert!(report.errors.iter().any(|e| e.contains("settings.json")), "{report:?}");
        assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":false}"));
        assert_eq!(laptop.editor.read("settings.json"), "{\"k\":2}");
        assert_eq!(laptop.user.asked().len(), attempt);
    }

    let report = laptop.engine().upload();
    assert!(!report.success, "{report:?}");
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":false}"));
}

#[test]
fn test_sync_with_local_edit_publishes_the_resolution() {
    let remote = Remote::new();
    let (laptop, _desktop) = laptop_then_desktop(&remote);
    laptop.editor.write("settings.json", "{\"k\":2}");
    laptop.user.will_resolve_with("{\"k\":3}");

    let report = laptop.engine().sync();
    assert!(report.success, "{report:?}");
    assert_eq!(report.outcome, Some(SyncOutcome::Downloaded));
    assert_eq!(laptop.editor.read("settings.json"), "{\"k\":3}");
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":false}"));

    let report = laptop.engine().sync();
    assert_eq!(report.outcome, Some(SyncOutcome::Uploaded), "{report:?}");
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some("{\"k\":3}"));
}

// ============================================================================
// Scenario 3: host-conditioned blocks
// ============================================================================

#[test]
fn test_host_block_follows_hostname() {
    let input = "// @sync host=work\n// \"x\":1";

    let work = incoming(input, None, &PragmaContext::new(Some(Os::Linux), "work"));
    assert_eq!(work.text, "// @sync host=work\n\"x\":1");

    let home = incoming(input, None, &PragmaContext::new(Some(Os::Linux), "home"));
    assert_eq!(home.text, input);
}

#[test]
fn test_host_block_travels_between_machines() {
    let folder = TempDir::new().unwrap();
    let home = Machine::folder("home", folder.path());
    home.editor.write(
        "settings.json",
        "{\n  // @sync host=work\n  // \"x\": 1,\n  \"y\": 2\n}\n",
    );
    assert!(home.engine().upload().success);

    let work = Machine::folder("work", folder.path());
    let report = work.engine().download();
    assert!(report.success, "{report:?}");
    assert_eq!(
        work.editor.read("settings.json"),
        "{\n  // @sync host=work\n  \"x\": 1,\n  \"y\": 2\n}\n"
    );

    // The block is hidden again on the way out
    work.editor.write(
        "settings.json",
        "{\n  // @sync host=work\n  \"x\": 1,\n  \"y\": 3\n}\n",
    );
    assert!(work.engine().upload().success);
    let exported = std::fs::read_to_string(folder.path().join("main/settings.json")).unwrap();
    assert!(exported.contains("  // \"x\": 1,"));
    assert!(exported.contains("\"y\": 3"));
}

// ============================================================================
// Scenario 4: extension differences
// ============================================================================

#[test]
fn test_extension_sets() {
    let installed = strings(&["acme.a", "acme.b"]);
    let manifest = strings(&["acme.b", "acme.c"]);

    assert_eq!(missing(&installed, &manifest).into_iter().collect::<Vec<_>>(), ["acme.c"]);
    assert_eq!(unneeded(&installed, &manifest).into_iter().collect::<Vec<_>>(), ["acme.a"]);
}

#[test]
fn test_download_applies_manifest() {
    let folder = TempDir::new().unwrap();
    let laptop = Machine::folder("laptop", folder.path()).with_extensions(&["acme.b", "acme.c"]);
    laptop.editor.write("settings.json", "{}\n");
    assert!(laptop.engine().upload().success);

    let desktop = Machine::folder("desktop", folder.path()).with_extensions(&["acme.a", "acme.b"]);
    let report = desktop.engine().download();

    assert!(report.success, "{report:?}");
    assert_eq!(desktop.extensions.installed(), strings(&["acme.b", "acme.c"]));
    assert!(report.reload_required);
}

// ============================================================================
// Scenario 5: conflict markers never reach the user directory unresolved
// ============================================================================

/// Laptop uploads a clean file, then desktop publishes one with markers.
fn remote_with_markers(remote: &Remote) -> Machine {
    let laptop = Machine::repo("laptop", remote);
    laptop.editor.write("settings.json", "{\"k\":1}");
    assert!(laptop.engine().upload().success);

    let desktop = Machine::repo("desktop", remote);
    assert!(desktop.engine().download().success);
    desktop.editor.write("settings.json", MARKERS);
    desktop.engine().upload();
    assert_eq!(remote.read("main", "settings.json").as_deref(), Some(MARKERS));

    laptop
}

#[test]
fn test_download_routes_markers_through_resolution() {
    let remote = Remote::new();
    let laptop = remote_with_markers(&remote);
    laptop.user.will_resolve_with("{\"k\":false}");

    let report = laptop.engine().download();

    assert!(report.success, "{report:?}");
    assert_eq!(laptop.user.asked().len(), 1);
    assert_eq!(laptop.editor.read("settings.json"), "{\"k\":false}");
}

#[test]
fn test_unresolved_markers_leave_user_file_alone() {
    let remote = Remote::new();
    let laptop = remote_with_markers(&remote);

    let report = laptop.engine().download();

    assert!(!report.success);
    assert_eq!(laptop.editor.read("settings.json"), "{\"k\":1}");
    assert!(laptop.paths().conflicts_dir().join("settings.json").exists());
}

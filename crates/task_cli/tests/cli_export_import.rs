use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskman-{nanos}-{file_name}"))
}

fn seed_store(path: &Path, tasks: &serde_json::Value) {
    std::fs::write(path, serde_json::to_string_pretty(tasks).unwrap()).unwrap();
}

fn two_tasks() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "task-1",
            "title": "Call \"the\" plumber, again",
            "description": "kitchen sink",
            "priority": "high",
            "due_date": "2030-01-01",
            "category": "home",
            "created_at": "2023-01-01T00:00:00Z"
        },
        {
            "id": "task-2",
            "title": "Dishes",
            "completed": true,
            "created_at": "2023-01-02T00:00:00Z",
            "completed_at": "2023-01-03T00:00:00Z"
        }
    ])
}

fn read_store(path: &Path) -> serde_json::Value {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

// Both stores rendered through the same serializer, so sparse seed files and
// saved files compare on equal footing.
fn list_all_json(exe: &str, store_path: &Path) -> serde_json::Value {
    let output = Command::new(exe)
        .args(["--json", "list", "--all", "--sort-by", "created_at"])
        .env("TASKMAN_STORE_PATH", store_path)
        .output()
        .expect("failed to run list command");
    assert!(output.status.success());
    serde_json::from_str(&String::from_utf8_lossy(&output.stdout)).expect("json output")
}

#[test]
fn export_csv_and_reimport_round_trips() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-roundtrip-store.json");
    let csv_path = temp_path("cli-roundtrip.csv");
    seed_store(&store_path, &two_tasks());

    let export = Command::new(exe)
        .arg("export")
        .arg(&csv_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");
    assert!(export.status.success());
    let stdout = String::from_utf8_lossy(&export.stdout);
    assert!(stdout.contains("Exported 2 task(s)"));

    // reimport into a fresh store and compare full fidelity
    let fresh_store = temp_path("cli-roundtrip-fresh.json");
    let import = Command::new(exe)
        .arg("import")
        .arg(&csv_path)
        .env("TASKMAN_STORE_PATH", &fresh_store)
        .output()
        .expect("failed to run import command");
    assert!(import.status.success());

    let original = list_all_json(exe, &store_path);
    let imported = list_all_json(exe, &fresh_store);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&csv_path).ok();
    std::fs::remove_file(&fresh_store).ok();

    assert_eq!(original, imported);
    assert_eq!(original.as_array().unwrap().len(), 2);
}

#[test]
fn export_json_and_reimport_round_trips() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-json-roundtrip-store.json");
    let backup_path = temp_path("cli-json-roundtrip-backup.json");
    seed_store(&store_path, &two_tasks());

    let export = Command::new(exe)
        .arg("export")
        .arg(&backup_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run export command");
    assert!(export.status.success());

    let fresh_store = temp_path("cli-json-roundtrip-fresh.json");
    let import = Command::new(exe)
        .arg("import")
        .arg(&backup_path)
        .env("TASKMAN_STORE_PATH", &fresh_store)
        .output()
        .expect("failed to run import command");
    assert!(import.status.success());

    let original = list_all_json(exe, &store_path);
    let imported = list_all_json(exe, &fresh_store);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&backup_path).ok();
    std::fs::remove_file(&fresh_store).ok();

    assert_eq!(original, imported);
    assert_eq!(original.as_array().unwrap().len(), 2);
}

#[test]
fn import_replaces_existing_tasks() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-import-replace-store.json");
    let input_path = temp_path("cli-import-replace-input.json");
    seed_store(
        &store_path,
        &serde_json::json!([
            {"id": "task-old", "title": "stale", "created_at": "2023-01-01T00:00:00Z"}
        ]),
    );
    seed_store(&input_path, &two_tasks());

    let output = Command::new(exe)
        .arg("import")
        .arg(&input_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported 2 task(s)"));

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&input_path).ok();

    let ids: Vec<&str> = stored
        .as_array()
        .unwrap()
        .iter()
        .map(|task| task["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["task-1", "task-2"]);
}

#[test]
fn import_merge_adds_only_unseen_ids() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-import-merge-store.json");
    let input_path = temp_path("cli-import-merge-input.json");
    seed_store(
        &store_path,
        &serde_json::json!([
            {"id": "task-1", "title": "already here", "created_at": "2023-01-01T00:00:00Z"}
        ]),
    );
    seed_store(&input_path, &two_tasks());

    let output = Command::new(exe)
        .args(["import", "--merge"])
        .arg(&input_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported and merged 1 task(s)"));
    assert!(stdout.contains("Total tasks: 2"));

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&input_path).ok();

    let tasks = stored.as_array().unwrap();
    assert_eq!(tasks[0]["title"], "already here");
    assert_eq!(tasks[1]["id"], "task-2");
}

#[test]
fn import_csv_missing_title_fails_and_leaves_store_unchanged() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-import-bad-store.json");
    let csv_path = temp_path("cli-import-bad.csv");
    let original = serde_json::json!([
        {"id": "task-kept", "title": "kept", "created_at": "2023-01-01T00:00:00Z"}
    ]);
    seed_store(&store_path, &original);

    let csv = "id,title,description,priority,due_date,category,completed,created_at,completed_at\n\
               task-1,,,medium,,,false,2023-01-01T00:00:00Z,\n";
    std::fs::write(&csv_path, csv).unwrap();

    let output = Command::new(exe)
        .arg("import")
        .arg(&csv_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: format"));

    let stored = read_store(&store_path);
    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&csv_path).ok();

    assert_eq!(stored, original);
}

#[test]
fn import_csv_with_wrong_header_fails() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-import-header-store.json");
    let csv_path = temp_path("cli-import-header.csv");

    std::fs::write(&csv_path, "id,name,when\ntask-1,demo,today\n").unwrap();

    let output = Command::new(exe)
        .arg("import")
        .arg(&csv_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run import command");

    std::fs::remove_file(&csv_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: format"));
    assert!(!store_path.exists());
}

#[test]
fn merge_command_reports_added_count() {
    let exe = env!("CARGO_BIN_EXE_taskman");
    let store_path = temp_path("cli-merge-store.json");
    let other_path = temp_path("cli-merge-other.json");
    seed_store(
        &store_path,
        &serde_json::json!([
            {"id": "task-1", "title": "mine", "created_at": "2023-01-01T00:00:00Z"}
        ]),
    );
    seed_store(&other_path, &two_tasks());

    let output = Command::new(exe)
        .arg("merge")
        .arg(&other_path)
        .env("TASKMAN_STORE_PATH", &store_path)
        .output()
        .expect("failed to run merge command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Merged 1 task(s)"));
    assert!(stdout.contains("Total tasks: 2"));

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&other_path).ok();
}

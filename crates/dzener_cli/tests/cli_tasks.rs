use std::path::Path;
use std::process::{Command, Output};

fn run(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dzener"))
        .args(args)
        .env("DZENER_HOME", home)
        .env("DZENER_CONFIG_PATH", home.join("config.json"))
        .output()
        .expect("failed to run dzener")
}

fn add(home: &Path, url: &str) {
    let output = run(home, &["add", url]);
    assert!(output.status.success(), "add {url} failed");
}

#[test]
fn list_command_prints_table() {
    let home = tempfile::tempdir().unwrap();
    add(home.path(), "https://dzen.ru/a/first");
    add(home.path(), "https://dzen.ru/a/second");

    let output = run(home.path(), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("https://dzen.ru/a/first"));
    assert!(stdout.contains("https://dzen.ru/a/second"));
    assert!(stdout.find("first") < stdout.find("second"));
}

#[test]
fn list_command_on_empty_queue() {
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), &["list"]);

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No submitted links yet."));
}

#[test]
fn remove_command_deletes_by_number() {
    let home = tempfile::tempdir().unwrap();
    add(home.path(), "https://dzen.ru/a/first");
    add(home.path(), "https://dzen.ru/a/second");

    let output = run(home.path(), &["remove", "1"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Removed link: https://dzen.ru/a/first"));

    let listed = run(home.path(), &["list", "--json"]);
    let tasks: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&listed.stdout).trim()).unwrap();
    assert_eq!(tasks.as_array().map(Vec::len), Some(1));
    assert_eq!(tasks[0]["url"], "https://dzen.ru/a/second");
}

#[test]
fn remove_command_rejects_unknown_number() {
    let home = tempfile::tempdir().unwrap();
    add(home.path(), "https://dzen.ru/a/first");

    let output = run(home.path(), &["remove", "5"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - task not found"));
}

#[test]
fn export_command_writes_task_array() {
    let home = tempfile::tempdir().unwrap();
    add(home.path(), "https://dzen.ru/a/first");

    let output = run(home.path(), &["export", "--json"]);

    assert!(output.status.success());
    let payload: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&output.stdout).trim()).unwrap();
    let path = payload["path"].as_str().expect("export path");
    assert!(path.ends_with("tasks_export.json"));

    let exported: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(exported.as_array().map(Vec::len), Some(1));
    assert_eq!(exported[0]["url"], "https://dzen.ru/a/first");
}

#[test]
fn nickname_command_changes_owner_of_new_links() {
    let home = tempfile::tempdir().unwrap();

    let renamed = run(home.path(), &["nickname", "neo"]);
    assert!(renamed.status.success());
    add(home.path(), "https://dzen.ru/a/first");

    let status = run(home.path(), &["status", "--json"]);
    let profile: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&status.stdout).trim()).unwrap();
    assert_eq!(profile["nickname"], "neo");
    assert_eq!(profile["submitted_tasks"], 1);

    let listed = run(home.path(), &["list", "--json"]);
    let tasks: serde_json::Value =
        serde_json::from_str(String::from_utf8_lossy(&listed.stdout).trim()).unwrap();
    assert_eq!(tasks[0]["owner"], "neo");
}

#[test]
fn status_command_prints_balance() {
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), &["status"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("User: linux-user"));
    assert!(stdout.contains("Balance: 0 points"));
}

use assert_cmd::Command;
use tempfile::TempDir;

// Binary-level checks with HOME pointed at a sandbox so the real session
// database and config are never touched.

fn kadans(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("kadans").unwrap();
    cmd.env("HOME", home.path());
    cmd.env_remove("XDG_CONFIG_HOME");
    cmd.env_remove("XDG_STATE_HOME");
    cmd
}

#[test]
fn history_on_fresh_home_is_empty() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .arg("history")
        .assert()
        .success()
        .stdout(predicates::str::contains("no sessions recorded yet"));
}

#[test]
fn export_csv_emits_the_header_even_with_no_sessions() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .args(["export", "--format", "csv"])
        .assert()
        .success()
        .stdout(predicates::str::contains(
            "id,date,duration_secs,wpm,accuracy,error_rate,keystrokes,tremor_score,fatigue_score",
        ));
}

#[test]
fn export_json_emits_an_empty_array() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .args(["export", "--format", "json"])
        .assert()
        .success()
        .stdout(predicates::str::contains("[]"));
}

#[test]
fn export_writes_to_a_file() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("history.csv");

    kadans(&home)
        .args(["export", "-o"])
        .arg(&out)
        .assert()
        .success();

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.starts_with("id,date,duration_secs"));
}

#[test]
fn clear_with_yes_reports_zero_on_empty_history() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .args(["clear", "--yes"])
        .assert()
        .success()
        .stdout(predicates::str::contains("deleted 0 sessions"));
}

#[test]
fn show_unknown_session_is_a_usage_error() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .args(["show", "deadbeef"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("no session matching 'deadbeef'"));
}

#[test]
fn delete_unknown_session_is_a_usage_error() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .args(["delete", "deadbeef", "--yes"])
        .assert()
        .failure()
        .stderr(predicates::str::contains("no session matching 'deadbeef'"));
}

#[test]
fn run_refuses_a_non_tty_stdin() {
    let home = TempDir::new().unwrap();

    kadans(&home)
        .arg("run")
        .assert()
        .failure()
        .stderr(predicates::str::contains("stdin must be a tty"));
}

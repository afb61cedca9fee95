//! E2E: init, status, gated commands, timer, check, doctor and uninstall through the binary.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn hostguard(home: &Path, hosts: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hostguard").unwrap();
    cmd.env("HOSTGUARD_HOME", home)
        .env("HOSTGUARD_HOSTS_FILE", hosts)
        .env("HOSTGUARD_SKIP_DNS_FLUSH", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn e2e_happy_path() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("hosts");
    std::fs::write(&hosts_path, "127.0.0.1\tlocalhost\n").unwrap();

    hostguard(&home, &hosts_path)
        .args(["init", "example.com"])
        .assert()
        .success();
    let content = std::fs::read_to_string(&hosts_path).unwrap();
    assert!(content.starts_with("127.0.0.1\tlocalhost\n# hostguard START\n"));
    assert!(content.contains("::1 www.example.com"));
    assert!(home.join("settings.toml").is_file());

    hostguard(&home, &hosts_path)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Blocking: on"))
        .stdout(predicate::str::contains("not started"));

    hostguard(&home, &hosts_path)
        .args(["domains", "list"])
        .assert()
        .success()
        .stdout("example.com\n");

    hostguard(&home, &hosts_path)
        .args(["domains", "list", "--expanded"])
        .assert()
        .success()
        .stdout("example.com\nwww.example.com\n");

    // Gated while locked
    hostguard(&home, &hosts_path)
        .arg("off")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not permitted"));

    hostguard(&home, &hosts_path)
        .args(["domains", "set", "other.example"])
        .assert()
        .code(1);

    // Still gated while running
    hostguard(&home, &hosts_path)
        .args(["timer", "start"])
        .assert()
        .success()
        .stdout(predicate::str::contains("running"));
    hostguard(&home, &hosts_path)
        .arg("off")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("running"));
    hostguard(&home, &hosts_path)
        .args(["timer", "cancel"])
        .assert()
        .success();

    // Onboarding only once
    hostguard(&home, &hosts_path)
        .args(["init", "other.example"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already set up"));

    // Block removed by hand: check restores it
    std::fs::write(&hosts_path, "127.0.0.1\tlocalhost\n").unwrap();
    hostguard(&home, &hosts_path)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("re-applied"));
    let content = std::fs::read_to_string(&hosts_path).unwrap();
    assert!(content.contains("127.0.0.1 example.com"));

    hostguard(&home, &hosts_path)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("already active"));
}

#[test]
fn check_swallows_hosts_errors() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("missing").join("hosts");

    hostguard(&home, &hosts_path)
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("could not restore blocking"));
}

#[test]
fn apply_reports_io_failure() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("missing").join("hosts");

    hostguard(&home, &hosts_path)
        .arg("apply")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("hosts file I/O failed"));
}

#[cfg(unix)]
#[test]
fn permission_denied_exits_with_hint() {
    use std::os::unix::fs::PermissionsExt;

    // root ignores file modes
    if hostguard::platform::is_elevated() == Some(true) {
        return;
    }
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("hosts");
    std::fs::write(&hosts_path, "127.0.0.1 localhost\n").unwrap();
    std::fs::set_permissions(&hosts_path, std::fs::Permissions::from_mode(0o444)).unwrap();

    hostguard(&home, &hosts_path)
        .arg("apply")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("administrator/root"));
}

#[test]
fn uninstall_after_elapsed_timer_cleans_up() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("hosts");
    let original = "127.0.0.1\tlocalhost\n";
    std::fs::write(&hosts_path, original).unwrap();

    hostguard(&home, &hosts_path)
        .args(["init", "example.com"])
        .assert()
        .success();
    let presets = home.join("presets").join("domains.txt");
    std::fs::create_dir_all(presets.parent().unwrap()).unwrap();
    std::fs::write(&presets, "example.com\n").unwrap();

    let state_file = home.join("state.json");
    let mut state: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&state_file).unwrap()).unwrap();
    let started = chrono::Utc::now() - chrono::Duration::minutes(16);
    state["pending_uninstall_started_at"] = serde_json::json!(started.timestamp() as f64);
    std::fs::write(&state_file, serde_json::to_string(&state).unwrap()).unwrap();

    hostguard(&home, &hosts_path)
        .arg("uninstall")
        .assert()
        .success()
        .stdout(predicate::str::contains("Uninstalled"));

    assert_eq!(std::fs::read_to_string(&hosts_path).unwrap(), original);
    assert!(!state_file.exists());
    assert!(!home.join("settings.toml").exists());
    assert!(presets.is_file());
}

#[test]
fn uninstall_denied_without_timer() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("hosts");
    std::fs::write(&hosts_path, "127.0.0.1\tlocalhost\n").unwrap();

    hostguard(&home, &hosts_path)
        .args(["init", "example.com"])
        .assert()
        .success();
    hostguard(&home, &hosts_path)
        .arg("uninstall")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not permitted"));

    assert!(home.join("state.json").is_file());
    assert!(home.join("settings.toml").is_file());
    assert!(std::fs::read_to_string(&hosts_path)
        .unwrap()
        .contains("# hostguard START"));
}

#[test]
fn doctor_reports_missing_block() {
    let dir = common::temp_home();
    let home = dir.path().join("home");
    let hosts_path = dir.path().join("hosts");
    std::fs::write(&hosts_path, "127.0.0.1\tlocalhost\n").unwrap();

    hostguard(&home, &hosts_path)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[!!] Blocking not active"))
        .stdout(predicate::str::contains("[ok] Timer:"));

    hostguard(&home, &hosts_path).arg("apply").assert().success();
    hostguard(&home, &hosts_path)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("[ok] Blocking active"));
}

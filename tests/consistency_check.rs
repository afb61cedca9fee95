//! Startup check re-applies a missing or partial block and never raises.

mod common;

use hostguard::blocker::{Blocker, Consistency};
use hostguard::error::HostsError;
use hostguard::hosts::HostsEditor;
use std::fs;

#[test]
fn reapplies_missing_block() {
    let dir = common::temp_home();
    let blocker = common::blocker_at(dir.path(), common::manual_clock());

    assert!(matches!(blocker.ensure_consistency(), Consistency::Reapplied));
    assert!(blocker.is_active().unwrap());
    assert!(matches!(blocker.ensure_consistency(), Consistency::AlreadyActive));
}

#[test]
fn reapplies_partially_edited_block() {
    let dir = common::temp_home();
    let blocker = common::blocker_at(dir.path(), common::manual_clock());
    blocker.apply().unwrap();

    let hosts_path = dir.path().join("hosts");
    let content = fs::read_to_string(&hosts_path).unwrap();
    let edited: String = content
        .lines()
        .filter(|l| !l.ends_with(" www.exampleadult.com"))
        .map(|l| format!("{l}\n"))
        .collect();
    fs::write(&hosts_path, edited).unwrap();
    assert!(!blocker.is_active().unwrap());

    assert!(matches!(blocker.ensure_consistency(), Consistency::Reapplied));
    assert!(blocker.is_active().unwrap());
}

#[test]
fn hosts_errors_are_returned_not_raised() {
    let dir = common::temp_home();
    let store = common::store_at(dir.path(), common::manual_clock());
    let blocker = Blocker::new(
        HostsEditor::for_file(dir.path().join("missing").join("hosts")),
        store,
    );

    match blocker.ensure_consistency() {
        Consistency::Failed(HostsError::Io { .. }) => {}
        other => panic!("expected I/O failure, got {other:?}"),
    }
}

#[test]
fn check_leaves_timer_untouched() {
    let dir = common::temp_home();
    let clock = common::manual_clock();
    let blocker = common::blocker_at(dir.path(), clock.clone());
    blocker.start_timer().unwrap();

    blocker.ensure_consistency();

    assert!(blocker.store().uninstall_started_at().is_some());
}

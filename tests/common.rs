//! Shared test helpers.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use hostguard::blocker::Blocker;
use hostguard::clock::ManualClock;
use hostguard::config::AppPaths;
use hostguard::hosts::HostsEditor;
use hostguard::store::StateStore;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a temp directory for use as HOSTGUARD_HOME.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_home() -> TempDir {
    tempfile::Builder::new()
        .prefix("hostguard_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| std::path::Path::new(".").into()))
        .expect("temp dir")
}

/// Fixed start instant with a sub-second part, so precision loss would show.
pub fn t0() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(1_700_000_000_123).expect("valid timestamp")
}

pub fn manual_clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(t0()))
}

/// Store under `home` reading time from `clock`.
pub fn store_at(home: &Path, clock: Arc<ManualClock>) -> StateStore {
    let paths = AppPaths::for_test(home);
    StateStore::open(&paths, &paths.starter_list, clock).expect("open store")
}

/// Blocker over a temp hosts file (created with a localhost line) and a manual clock.
pub fn blocker_at(home: &Path, clock: Arc<ManualClock>) -> Blocker {
    let hosts_path = home.join("hosts");
    if !hosts_path.exists() {
        std::fs::write(&hosts_path, "127.0.0.1\tlocalhost\n").expect("write hosts");
    }
    Blocker::new(HostsEditor::for_file(&hosts_path), store_at(home, clock))
}

//! Doctor command: health checks for blocking state.

use crate::blocker::Blocker;

/// Result of a single check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub ok: bool,
    pub message: String,
}

impl CheckResult {
    fn pass(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Run all doctor checks.
pub fn run_checks(blocker: &Blocker) -> Vec<CheckResult> {
    let mut results = Vec::new();
    let store = blocker.store();

    // 1. State file parses
    let outcome = store.load();
    if outcome.was_recovered() {
        results.push(CheckResult::fail(format!(
            "State file {} was unreadable and has been reset to defaults.",
            store.state_file().display()
        )));
    } else {
        results.push(CheckResult::pass(format!(
            "State file {} OK ({} domain(s)).",
            store.state_file().display(),
            outcome.state().blocked_domains.len()
        )));
    }

    // 2. Hosts block present for the stored domains
    let hosts_path = blocker.hosts().path().display().to_string();
    match blocker.is_active() {
        Ok(true) => results.push(CheckResult::pass(format!("Blocking active in {hosts_path}."))),
        Ok(false) => results.push(CheckResult::fail(format!(
            "Blocking not active in {hosts_path}. Run 'hostguard apply'."
        ))),
        Err(e) => results.push(CheckResult::fail(format!("Cannot read hosts file: {}", e.detail()))),
    }

    // 3. Privileges for writing
    match crate::platform::is_elevated() {
        Some(true) => results.push(CheckResult::pass("Running with root privileges.")),
        Some(false) => results.push(CheckResult::fail(
            "Not running as root; 'apply', 'off' and 'uninstall' will need sudo.",
        )),
        None => {}
    }

    // 4. Timer
    results.push(CheckResult::pass(format!("Timer: {}.", blocker.timer_state())));

    results
}

//! Unix (macOS, Linux) platform implementations.

use std::process::{Command, Stdio};

use tracing::debug;

use super::DnsCache;

pub struct UnixDnsCache;

impl DnsCache for UnixDnsCache {
    fn flush(&self) {
        #[cfg(target_os = "macos")]
        {
            run_quiet("/usr/bin/dscacheutil", &["-flushcache"]);
            run_quiet("/usr/bin/killall", &["-HUP", "mDNSResponder"]);
        }

        #[cfg(not(target_os = "macos"))]
        {
            // Whichever resolver cache is present; the rest fail harmlessly.
            run_quiet("resolvectl", &["flush-caches"]);
            run_quiet("systemd-resolve", &["--flush-caches"]);
            run_quiet("nscd", &["-i", "hosts"]);
        }
    }
}

fn run_quiet(program: &str, args: &[&str]) {
    let result = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match result {
        Ok(status) => debug!(program, %status, "dns flush command finished"),
        Err(e) => debug!(program, error = %e, "dns flush command unavailable"),
    }
}

/// Effective uid 0.
pub fn is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

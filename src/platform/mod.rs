//! Platform abstraction for the hosts file location, DNS cache flushing and privilege checks.

use std::path::PathBuf;

#[cfg(unix)]
pub mod unix;

#[cfg(windows)]
pub mod windows;

/// Hosts file location on this platform.
#[cfg(windows)]
pub const SYSTEM_HOSTS_PATH: &str = r"C:\Windows\System32\drivers\etc\hosts";

/// Hosts file location on this platform.
#[cfg(not(windows))]
pub const SYSTEM_HOSTS_PATH: &str = "/etc/hosts";

/// Trait for flushing the OS name-resolution cache after a hosts edit.
///
/// Flushing is advisory: implementations swallow every failure.
pub trait DnsCache: Send + Sync {
    fn flush(&self);
}

/// DnsCache that does nothing (tests, or `flush_dns = false`).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopDnsCache;

impl DnsCache for NoopDnsCache {
    fn flush(&self) {}
}

/// Resolve the hosts file path.
/// If HOSTGUARD_HOSTS_FILE is set (e.g. in tests), that path wins over the system one.
pub fn default_hosts_path() -> PathBuf {
    if let Ok(path) = std::env::var("HOSTGUARD_HOSTS_FILE") {
        return PathBuf::from(path);
    }
    PathBuf::from(SYSTEM_HOSTS_PATH)
}

/// Get platform DnsCache implementation.
/// HOSTGUARD_SKIP_DNS_FLUSH disables it so tests never spawn system tools.
pub fn default_dns_cache() -> Box<dyn DnsCache> {
    if std::env::var_os("HOSTGUARD_SKIP_DNS_FLUSH").is_some() {
        return Box::new(NoopDnsCache);
    }
    #[cfg(unix)]
    return Box::new(unix::UnixDnsCache);

    #[cfg(windows)]
    return Box::new(windows::WindowsDnsCache);
}

/// Whether the process runs with the privileges needed to write the hosts file.
/// `None` when the platform gives no cheap answer.
pub fn is_elevated() -> Option<bool> {
    #[cfg(unix)]
    return Some(unix::is_root());

    #[cfg(windows)]
    return None;
}

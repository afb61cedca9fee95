//! Windows platform implementations.

use std::process::{Command, Stdio};

use tracing::debug;

use super::DnsCache;

pub struct WindowsDnsCache;

impl DnsCache for WindowsDnsCache {
    fn flush(&self) {
        let result = Command::new("ipconfig")
            .arg("/flushdns")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();
        match result {
            Ok(status) => debug!(%status, "ipconfig /flushdns finished"),
            Err(e) => debug!(error = %e, "ipconfig /flushdns failed"),
        }
    }
}

//! Error types for hosts-file editing and timer-gated operations.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::timer::TimerState;

/// Errors from reading or writing the hosts file.
#[derive(Debug, Error)]
pub enum HostsError {
    /// Expected when not running elevated; callers show elevation instructions.
    #[error("permission denied for {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("hosts file I/O failed for {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: start marker has no matching end marker; fix the file by hand", path.display())]
    MalformedBlock { path: PathBuf },
}

impl HostsError {
    /// Classify an I/O error for `path`, splitting out permission failures.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            HostsError::PermissionDenied {
                path: path.to_path_buf(),
            }
        } else {
            HostsError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        matches!(self, HostsError::PermissionDenied { .. })
    }

    /// One-line message including the underlying OS error.
    pub fn detail(&self) -> String {
        match self {
            HostsError::Io { source, .. } => format!("{self}: {source}"),
            _ => self.to_string(),
        }
    }
}

/// Errors from operations that require a completed turn-off timer.
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("not permitted yet: {0}")]
    NotPermitted(TimerState),

    #[error(transparent)]
    Hosts(#[from] HostsError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Message shown when hosts edits fail for lack of privileges.
pub const ELEVATION_HINT: &str = "Editing the hosts file needs administrator/root access.\n\
Re-run this command with elevated permissions (e.g. sudo, or an administrator terminal).";

/// Whether `err` was caused by a hosts-file permission failure anywhere in its chain.
pub fn is_permission_denied(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(h) = cause.downcast_ref::<HostsError>() {
            return h.is_permission_denied();
        }
        matches!(cause.downcast_ref::<GuardError>(), Some(GuardError::Hosts(h)) if h.is_permission_denied())
    })
}

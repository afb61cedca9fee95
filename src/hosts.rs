//! Hosts file block editing.
//!
//! Everything this crate writes lives between [`BLOCK_START`] and [`BLOCK_END`].
//! The region is rebuilt from scratch on every apply; content outside it is
//! handled as opaque bytes and never parsed or changed, whatever its encoding.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Settings;
use crate::domain;
use crate::error::HostsError;
use crate::platform::{self, DnsCache, NoopDnsCache};

pub const BLOCK_START: &str = "# hostguard START";
pub const BLOCK_END: &str = "# hostguard END";

const BLOCK_COMMENTS: [&str; 2] = [
    "# The following entries were added by hostguard to intentionally block domains.",
    "# Remove this section to unblock (requires admin/root).",
];

/// Where the managed region sits in a hosts file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockSpan {
    Absent,
    /// Byte range from the start marker through the end marker and its line break.
    Present(Range<usize>),
    /// Start marker without an end marker after it.
    Unterminated,
}

/// Byte offsets of a located region.
struct Region {
    outer: Range<usize>,
    /// Lines between the marker lines.
    body: Range<usize>,
}

/// First line at or after `from` (a line start) equal to `marker`, ignoring the
/// line break. Returns the line's start and the offset just past its break.
fn find_marker_line(content: &[u8], from: usize, marker: &str) -> Option<(usize, usize)> {
    let mut start = from;
    while start < content.len() {
        let next = content[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(content.len(), |i| start + i + 1);
        let line = &content[start..next];
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line == marker.as_bytes() {
            return Some((start, next));
        }
        start = next;
    }
    None
}

fn locate(content: &[u8]) -> Result<Option<Region>, ()> {
    let Some((start, body_start)) = find_marker_line(content, 0, BLOCK_START) else {
        return Ok(None);
    };
    let (body_end, end) = find_marker_line(content, body_start, BLOCK_END).ok_or(())?;
    Ok(Some(Region {
        outer: start..end,
        body: body_start..body_end,
    }))
}

/// Locate the managed region. Markers only count as whole lines; only the first start marker counts.
pub fn find_block(content: &[u8]) -> BlockSpan {
    match locate(content) {
        Ok(Some(region)) => BlockSpan::Present(region.outer),
        Ok(None) => BlockSpan::Absent,
        Err(()) => BlockSpan::Unterminated,
    }
}

/// Render the full region for an already expanded domain set, ending in a newline.
pub fn render_block(expanded: &[String]) -> String {
    let mut lines: Vec<String> = Vec::with_capacity(expanded.len() * 2 + 4);
    lines.push(BLOCK_START.to_string());
    lines.extend(BLOCK_COMMENTS.iter().map(|c| c.to_string()));
    for d in expanded {
        lines.push(format!("127.0.0.1 {d}"));
        lines.push(format!("::1 {d}"));
    }
    lines.push(BLOCK_END.to_string());
    let mut block = lines.join("\n");
    block.push('\n');
    block
}

/// Content with the managed region spliced out. `None` if the start marker is unterminated.
pub fn strip_block(content: &[u8]) -> Option<Vec<u8>> {
    match find_block(content) {
        BlockSpan::Absent => Some(content.to_vec()),
        BlockSpan::Present(range) => {
            let mut out = Vec::with_capacity(content.len() - range.len());
            out.extend_from_slice(&content[..range.start]);
            out.extend_from_slice(&content[range.end..]);
            Some(out)
        }
        BlockSpan::Unterminated => None,
    }
}

/// Content with any old region removed and a fresh one appended for `raw`.
pub fn with_block<S: AsRef<str>>(content: &[u8], raw: &[S]) -> Option<Vec<u8>> {
    let mut out = strip_block(content)?;
    if !out.is_empty() && !out.ends_with(b"\n") {
        out.push(b'\n');
    }
    out.extend_from_slice(render_block(&domain::expand(raw)).as_bytes());
    Some(out)
}

/// True when every expanded domain has a line in the region ending in `" <domain>"`.
pub fn block_covers<S: AsRef<str>>(content: &[u8], raw: &[S]) -> bool {
    let Ok(Some(region)) = locate(content) else {
        return false;
    };
    let body = String::from_utf8_lossy(&content[region.body]);
    let lines: Vec<&str> = body.lines().map(str::trim).collect();
    domain::expand(raw).iter().all(|d| {
        let suffix = format!(" {d}");
        lines.iter().any(|l| l.ends_with(&suffix))
    })
}

/// Reads and writes the managed region of one hosts file.
pub struct HostsEditor {
    path: PathBuf,
    dns: Box<dyn DnsCache>,
}

impl HostsEditor {
    pub fn new(path: impl Into<PathBuf>, dns: Box<dyn DnsCache>) -> Self {
        Self {
            path: path.into(),
            dns,
        }
    }

    /// Editor for a file path with DNS flushing disabled (for tests).
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self::new(path, Box::new(NoopDnsCache))
    }

    /// Editor for the system hosts file: settings override, then env override, then platform default.
    pub fn from_settings(settings: &Settings) -> Self {
        let path = settings
            .hosts_file
            .clone()
            .unwrap_or_else(platform::default_hosts_path);
        let dns: Box<dyn DnsCache> = if settings.flush_dns {
            platform::default_dns_cache()
        } else {
            Box::new(NoopDnsCache)
        };
        Self::new(path, dns)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<u8>, HostsError> {
        fs::read(&self.path).map_err(|e| HostsError::from_io(&self.path, e))
    }

    fn write(&self, content: &[u8]) -> Result<(), HostsError> {
        fs::write(&self.path, content).map_err(|e| HostsError::from_io(&self.path, e))
    }

    fn malformed(&self) -> HostsError {
        HostsError::MalformedBlock {
            path: self.path.clone(),
        }
    }

    /// Check whether the region exists and covers every expanded domain.
    pub fn is_block_active<S: AsRef<str>>(&self, raw: &[S]) -> Result<bool, HostsError> {
        let content = self.read()?;
        Ok(block_covers(&content, raw))
    }

    /// Replace the region (or create it) with entries for `raw`, then flush DNS.
    pub fn apply_block<S: AsRef<str>>(&self, raw: &[S]) -> Result<(), HostsError> {
        let content = self.read()?;
        let new_content = with_block(&content, raw).ok_or_else(|| self.malformed())?;
        self.write(&new_content)?;
        info!(path = %self.path.display(), "hosts block applied");
        self.dns.flush();
        Ok(())
    }

    /// Remove the region if present. Returns whether anything was removed.
    pub fn remove_block(&self) -> Result<bool, HostsError> {
        let content = self.read()?;
        match find_block(&content) {
            BlockSpan::Absent => {
                debug!(path = %self.path.display(), "no hosts block to remove");
                Ok(false)
            }
            BlockSpan::Unterminated => Err(self.malformed()),
            BlockSpan::Present(_) => {
                let stripped = strip_block(&content).ok_or_else(|| self.malformed())?;
                self.write(&stripped)?;
                info!(path = %self.path.display(), "hosts block removed");
                self.dns.flush();
                Ok(true)
            }
        }
    }
}

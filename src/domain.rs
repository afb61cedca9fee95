//! Domain list normalisation and starter list parsing.

use std::collections::BTreeSet;

/// Expand a raw domain list into the canonical blocking set.
///
/// Entries are trimmed and empty ones dropped. Every domain without a `www.`
/// prefix also gets its `www.` variant. The result is deduplicated and sorted
/// in byte order, which fixes the line order written to the hosts file.
pub fn expand<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut set = BTreeSet::new();
    for d in raw {
        let d = d.as_ref().trim();
        if d.is_empty() {
            continue;
        }
        if !d.starts_with("www.") {
            set.insert(format!("www.{d}"));
        }
        set.insert(d.to_string());
    }
    set.into_iter().collect()
}

/// Trim entries and drop empty ones, keeping order. This is the raw form that gets persisted.
pub fn clean<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|d| d.as_ref().trim())
        .filter(|d| !d.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a newline-delimited domain list; blank lines and `#` comments are ignored.
pub fn parse_domain_list(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(String::from)
        .collect()
}

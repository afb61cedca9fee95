//! Persisted application state (`state.json`).
//!
//! Every read loads the whole file and every write replaces it atomically
//! (temp file in the same directory, then rename). A missing or unreadable
//! file is reset to defaults instead of failing, so startup never blocks on
//! a corrupt state file.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::AppPaths;
use crate::domain;
use crate::timer::TimerState;

/// Built-in list used when no starter list is available.
pub const DEFAULT_DOMAINS: &[&str] = &["exampleadult.com", "www.exampleadult.com"];

fn default_domains() -> Vec<String> {
    DEFAULT_DOMAINS.iter().map(|d| d.to_string()).collect()
}

/// Contents of state.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Raw, unexpanded list as entered by the user.
    #[serde(default = "default_domains")]
    pub blocked_domains: Vec<String>,
    #[serde(default, with = "epoch_seconds")]
    pub pending_uninstall_started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            blocked_domains: default_domains(),
            pending_uninstall_started_at: None,
            onboarding_completed: false,
        }
    }
}

/// Timestamps as fractional seconds since the Unix epoch, millisecond precision.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(v: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(t) => s.serialize_some(&(t.timestamp_millis() as f64 / 1000.0)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<f64>::deserialize(d)? {
            None => Ok(None),
            Some(secs) if secs.is_finite() => {
                DateTime::from_timestamp_millis((secs * 1000.0).round() as i64)
                    .map(Some)
                    .ok_or_else(|| D::Error::custom("timestamp out of range"))
            }
            Some(_) => Err(D::Error::custom("timestamp is not a finite number")),
        }
    }
}

/// Result of [`StateStore::load`]. Both variants carry a usable state.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Clean(PersistedState),
    /// The file was missing or malformed and has been reset to defaults.
    Recovered(PersistedState),
}

impl LoadOutcome {
    pub fn state(&self) -> &PersistedState {
        match self {
            LoadOutcome::Clean(s) | LoadOutcome::Recovered(s) => s,
        }
    }

    pub fn into_state(self) -> PersistedState {
        match self {
            LoadOutcome::Clean(s) | LoadOutcome::Recovered(s) => s,
        }
    }

    pub fn was_recovered(&self) -> bool {
        matches!(self, LoadOutcome::Recovered(_))
    }
}

/// Read a starter list file. `None` if it is missing, unreadable or has no domains.
pub fn load_starter_list(path: &Path) -> Option<Vec<String>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no starter list");
            return None;
        }
    };
    let domains = domain::parse_domain_list(&String::from_utf8_lossy(&raw));
    if domains.is_empty() {
        None
    } else {
        Some(domains)
    }
}

/// Owner of state.json. Not internally locked; one writer at a time.
pub struct StateStore {
    state_file: PathBuf,
    clock: Arc<dyn Clock>,
}

impl StateStore {
    /// Open the store, creating state.json on first run from the starter list or the built-in defaults.
    pub fn open(paths: &AppPaths, starter_list: &Path, clock: Arc<dyn Clock>) -> Result<Self> {
        fs::create_dir_all(&paths.data_dir)
            .with_context(|| format!("create {}", paths.data_dir.display()))?;
        let store = Self {
            state_file: paths.state_file.clone(),
            clock,
        };
        if !store.state_file.exists() {
            let mut state = PersistedState::default();
            if let Some(starter) = load_starter_list(starter_list) {
                info!(count = starter.len(), "initialising state from starter list");
                state.blocked_domains = starter;
            }
            store.save(&state)?;
        }
        Ok(store)
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    fn read(&self) -> Result<PersistedState> {
        let s = fs::read_to_string(&self.state_file).context("read state file")?;
        let state: PersistedState = serde_json::from_str(&s).context("parse state file")?;
        Ok(state)
    }

    /// Load the full state, resetting the file to defaults if it cannot be read or parsed.
    pub fn load(&self) -> LoadOutcome {
        match self.read() {
            Ok(mut state) => {
                if state.blocked_domains.is_empty() {
                    state.blocked_domains = default_domains();
                }
                LoadOutcome::Clean(state)
            }
            Err(e) => {
                warn!(path = %self.state_file.display(), error = %format!("{e:#}"), "state file unusable, resetting to defaults");
                let state = PersistedState::default();
                if let Err(e) = self.save(&state) {
                    warn!(error = %format!("{e:#}"), "could not rewrite state file");
                }
                LoadOutcome::Recovered(state)
            }
        }
    }

    /// Write the full state atomically: temp file in the same directory, fsync, rename.
    pub fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(p) = self.state_file.parent() {
            fs::create_dir_all(p)?;
        }
        let s = serde_json::to_string_pretty(state)?;
        let temp_path = self.state_file.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("create {}", temp_path.display()))?;
        file.write_all(s.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &self.state_file)
            .with_context(|| format!("replace {}", self.state_file.display()))?;
        Ok(())
    }

    fn update(&self, f: impl FnOnce(&mut PersistedState)) -> Result<PersistedState> {
        let mut state = self.load().into_state();
        f(&mut state);
        self.save(&state)?;
        Ok(state)
    }

    pub fn domains(&self) -> Vec<String> {
        self.load().into_state().blocked_domains
    }

    /// Store the raw list (trimmed, empties dropped). An empty result is rejected.
    pub fn set_domains<S: AsRef<str>>(&self, raw: &[S]) -> Result<()> {
        let cleaned = domain::clean(raw);
        if cleaned.is_empty() {
            anyhow::bail!("domain list is empty; keep at least one domain");
        }
        self.update(|s| s.blocked_domains = cleaned)?;
        Ok(())
    }

    /// Set the timer start to now, truncated to the stored millisecond precision.
    pub fn start_uninstall_timer(&self) -> Result<DateTime<Utc>> {
        let now = self.clock.now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        self.update(|s| s.pending_uninstall_started_at = Some(now))?;
        Ok(now)
    }

    pub fn cancel_uninstall_timer(&self) -> Result<()> {
        self.update(|s| s.pending_uninstall_started_at = None)?;
        Ok(())
    }

    pub fn uninstall_started_at(&self) -> Option<DateTime<Utc>> {
        self.load().into_state().pending_uninstall_started_at
    }

    pub fn timer_state(&self, delay: Duration) -> TimerState {
        TimerState::evaluate(self.uninstall_started_at(), self.clock.now(), delay)
    }

    /// True iff a timer was started and at least `delay` has elapsed.
    pub fn uninstall_ready(&self, delay: Duration) -> bool {
        self.timer_state(delay).is_ready()
    }

    pub fn is_onboarding_completed(&self) -> bool {
        self.load().into_state().onboarding_completed
    }

    pub fn set_onboarding_completed(&self, completed: bool) -> Result<()> {
        self.update(|s| s.onboarding_completed = completed)?;
        Ok(())
    }
}

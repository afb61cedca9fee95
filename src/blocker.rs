//! Blocking facade: hosts editor + state store behind the turn-off timer.
//!
//! Applying blocks is never gated since it only tightens restrictions.
//! Editing the domain list, turning blocking off and uninstalling need a
//! completed timer, and each of them consumes it.

use anyhow::{Context, Result};
use chrono::Duration;
use std::fs;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{AppPaths, Settings};
use crate::domain;
use crate::error::{GuardError, HostsError};
use crate::hosts::HostsEditor;
use crate::store::StateStore;
use crate::timer::{self, TimerState};

/// What the startup consistency check found.
#[derive(Debug)]
pub enum Consistency {
    AlreadyActive,
    Reapplied,
    /// The block is missing and could not be re-applied.
    Failed(HostsError),
}

pub struct Blocker {
    hosts: HostsEditor,
    store: StateStore,
    delay: Duration,
}

impl Blocker {
    pub fn new(hosts: HostsEditor, store: StateStore) -> Self {
        Self {
            hosts,
            store,
            delay: timer::uninstall_delay(),
        }
    }

    /// Wire up the system hosts file and the state store under `paths`.
    pub fn open(paths: &AppPaths, settings: &Settings) -> Result<Self> {
        Self::open_with_clock(paths, settings, Arc::new(SystemClock))
    }

    pub fn open_with_clock(paths: &AppPaths, settings: &Settings, clock: Arc<dyn Clock>) -> Result<Self> {
        let store = StateStore::open(paths, &settings.starter_list_path(paths), clock)?;
        Ok(Self::new(HostsEditor::from_settings(settings), store))
    }

    pub fn hosts(&self) -> &HostsEditor {
        &self.hosts
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Write the block for the stored domains. Always allowed.
    pub fn apply(&self) -> Result<(), HostsError> {
        let domains = self.store.domains();
        self.hosts.apply_block(&domains)
    }

    pub fn is_active(&self) -> Result<bool, HostsError> {
        let domains = self.store.domains();
        self.hosts.is_block_active(&domains)
    }

    pub fn domains(&self) -> Vec<String> {
        self.store.domains()
    }

    pub fn expanded_domains(&self) -> Vec<String> {
        domain::expand(&self.store.domains())
    }

    pub fn timer_state(&self) -> TimerState {
        self.store.timer_state(self.delay)
    }

    pub fn is_ready(&self) -> bool {
        self.timer_state().is_ready()
    }

    pub fn time_remaining(&self) -> Duration {
        self.timer_state().remaining(self.delay)
    }

    /// Start the timer if it is not already running; an existing start time is kept.
    pub fn start_timer(&self) -> Result<TimerState> {
        let state = self.timer_state();
        if state == TimerState::Locked {
            let at = self.store.start_uninstall_timer()?;
            info!(started_at = %at, "turn-off timer started");
            return Ok(self.timer_state());
        }
        Ok(state)
    }

    pub fn cancel_timer(&self) -> Result<()> {
        self.store.cancel_uninstall_timer()?;
        info!("turn-off timer cancelled");
        Ok(())
    }

    pub fn is_onboarded(&self) -> bool {
        self.store.is_onboarding_completed()
    }

    pub fn complete_onboarding(&self) -> Result<()> {
        self.store.set_onboarding_completed(true)
    }

    /// First-run setup: store `raw` without the timer gate and apply it.
    ///
    /// Onboarding is marked complete even when the apply is refused for lack
    /// of privileges; the user can apply later. Other hosts errors leave
    /// onboarding open so it can be retried.
    pub fn onboard<S: AsRef<str>>(&self, raw: &[S]) -> Result<()> {
        if self.is_onboarded() {
            anyhow::bail!("already set up; changing the domain list needs a completed timer");
        }
        if !raw.is_empty() {
            self.store.set_domains(raw)?;
        }
        match self.apply() {
            Ok(()) => {
                self.complete_onboarding()?;
                Ok(())
            }
            Err(e) if e.is_permission_denied() => {
                self.complete_onboarding()?;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Run `op` only when the timer is Ready, then return to Locked whatever the outcome.
    fn guarded<T>(&self, op: impl FnOnce() -> Result<T, GuardError>) -> Result<T, GuardError> {
        let state = self.timer_state();
        if !state.is_ready() {
            return Err(GuardError::NotPermitted(state));
        }
        let result = op();
        if let Err(e) = self.store.cancel_uninstall_timer() {
            warn!(error = %format!("{e:#}"), "could not reset turn-off timer");
            if result.is_ok() {
                return Err(GuardError::Store(e));
            }
        }
        result
    }

    /// Replace the stored domain list (gated). The hosts block is not touched; call [`Blocker::apply`].
    pub fn set_domains<S: AsRef<str>>(&self, raw: &[S]) -> Result<(), GuardError> {
        if domain::clean(raw).is_empty() {
            return Err(GuardError::Store(anyhow::anyhow!(
                "domain list is empty; keep at least one domain"
            )));
        }
        self.guarded(|| {
            self.store.set_domains(raw)?;
            info!("domain list updated");
            Ok(())
        })
    }

    /// Remove the hosts block (gated). Returns whether a block was present.
    pub fn turn_off(&self) -> Result<bool, GuardError> {
        self.guarded(|| Ok(self.hosts.remove_block()?))
    }

    /// Remove the hosts block and delete the state file (gated).
    ///
    /// On failure the timer is still reset, as for every gated operation.
    pub fn uninstall(&self) -> Result<(), GuardError> {
        let state = self.timer_state();
        if !state.is_ready() {
            return Err(GuardError::NotPermitted(state));
        }
        let state_file = self.store.state_file();
        let result = self.hosts.remove_block().map_err(GuardError::from).and_then(|_| {
            fs::remove_file(state_file)
                .with_context(|| format!("remove {}", state_file.display()))
                .map_err(GuardError::from)
        });
        if let Err(e) = result {
            if let Err(ce) = self.store.cancel_uninstall_timer() {
                warn!(error = %format!("{ce:#}"), "could not reset turn-off timer");
            }
            return Err(e);
        }
        info!("uninstalled: hosts block and state removed");
        Ok(())
    }

    /// Re-apply the block if it is not fully present. Hosts errors are returned, never raised.
    pub fn ensure_consistency(&self) -> Consistency {
        let domains = self.store.domains();
        let result = self
            .hosts
            .is_block_active(&domains)
            .and_then(|active| {
                if active {
                    Ok(Consistency::AlreadyActive)
                } else {
                    self.hosts.apply_block(&domains).map(|()| Consistency::Reapplied)
                }
            });
        match result {
            Ok(c) => {
                info!(outcome = ?c, "consistency check done");
                c
            }
            Err(e) => {
                warn!(error = %e.detail(), "consistency check could not restore the hosts block");
                Consistency::Failed(e)
            }
        }
    }
}

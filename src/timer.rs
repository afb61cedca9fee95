//! Turn-off timer state, derived from the stored start timestamp and the clock.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

/// Fixed wait between asking to turn blocking off and being allowed to.
pub const UNINSTALL_DELAY_SECS: i64 = 15 * 60;

pub fn uninstall_delay() -> Duration {
    Duration::seconds(UNINSTALL_DELAY_SECS)
}

/// Where the turn-off timer stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No timer started; sensitive operations are denied.
    Locked,
    /// Timer started, still waiting.
    Running { remaining: Duration },
    /// Wait is over; one sensitive operation may proceed.
    Ready,
}

impl TimerState {
    /// Derive state from `(started_at, now, delay)`. A start time in the future counts as zero elapsed.
    pub fn evaluate(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>, delay: Duration) -> Self {
        let Some(started) = started_at else {
            return TimerState::Locked;
        };
        let elapsed = (now - started).max(Duration::zero());
        if elapsed >= delay {
            TimerState::Ready
        } else {
            TimerState::Running {
                remaining: delay - elapsed,
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TimerState::Ready)
    }

    /// Time left before Ready; zero when Ready, the full delay when Locked.
    pub fn remaining(&self, delay: Duration) -> Duration {
        match self {
            TimerState::Locked => delay,
            TimerState::Running { remaining } => *remaining,
            TimerState::Ready => Duration::zero(),
        }
    }
}

/// Format as `MM:SS`, rounding partial seconds down.
pub fn format_remaining(d: Duration) -> String {
    let secs = d.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

impl fmt::Display for TimerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerState::Locked => write!(f, "turn-off timer not started (run 'hostguard timer start')"),
            TimerState::Running { remaining } => {
                write!(f, "turn-off timer running, {} left", format_remaining(*remaining))
            }
            TimerState::Ready => write!(f, "turn-off timer done"),
        }
    }
}

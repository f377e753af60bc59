//! Entry / exit delay timers.
//!
//! Each [`DelayTimer`] is a cancellable one-shot measured against the
//! caller's monotonic clock.  Starting a timer bumps a generation token;
//! an elapse is only honoured if it carries the token of the *current*
//! arming, so an expiry that raced a cancel (or a cancel-then-restart)
//! resolves to a no-op.
//!
//! [`DelayTimers`] owns the pair and keeps them mutually exclusive:
//! starting one cancels the other.

use super::AlarmEvent;

/// Which delay window a timer measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DelayKind {
    /// Triggering → Triggered.
    Entry,
    /// Arming → Armed.
    Exit,
}

impl DelayKind {
    /// The event delivered to the state machine when this delay elapses.
    pub const fn elapsed_event(self) -> AlarmEvent {
        match self {
            Self::Entry => AlarmEvent::EntryDelayElapsed,
            Self::Exit => AlarmEvent::ExitDelayElapsed,
        }
    }
}

/// A single cancellable delay.
#[derive(Debug, Clone)]
pub struct DelayTimer {
    kind: DelayKind,
    period_ms: u32,
    armed: bool,
    started_ms: u64,
    /// Generation counter, bumped on every start.
    token: u8,
}

impl DelayTimer {
    pub const fn new(kind: DelayKind, period_ms: u32) -> Self {
        Self {
            kind,
            period_ms,
            armed: false,
            started_ms: 0,
            token: 0,
        }
    }

    /// Arm the timer at `now_ms`.  Restarting an armed timer re-arms it
    /// with a fresh token.  Returns the new token.
    pub fn start(&mut self, now_ms: u64) -> u8 {
        self.token = self.token.wrapping_add(1);
        self.armed = true;
        self.started_ms = now_ms;
        self.token
    }

    /// Disarm.  Idempotent; returns whether the timer was armed.
    pub fn cancel(&mut self) -> bool {
        core::mem::replace(&mut self.armed, false)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Milliseconds left before expiry, `None` when disarmed.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.armed.then(|| {
            u64::from(self.period_ms).saturating_sub(now_ms.saturating_sub(self.started_ms))
        })
    }

    /// Token of the current arming if its period has elapsed.
    pub fn due(&self, now_ms: u64) -> Option<u8> {
        (self.remaining_ms(now_ms) == Some(0)).then_some(self.token)
    }

    /// True when `token` names the current, still-armed arming.
    pub fn matches(&self, token: u8) -> bool {
        self.armed && self.token == token
    }
}

/// The entry and exit timers.  At most one is armed at any time.
#[derive(Debug, Clone)]
pub struct DelayTimers {
    entry: DelayTimer,
    exit: DelayTimer,
}

impl DelayTimers {
    pub const fn new(entry_delay_ms: u32, exit_delay_ms: u32) -> Self {
        Self {
            entry: DelayTimer::new(DelayKind::Entry, entry_delay_ms),
            exit: DelayTimer::new(DelayKind::Exit, exit_delay_ms),
        }
    }

    pub fn get(&self, kind: DelayKind) -> &DelayTimer {
        match kind {
            DelayKind::Entry => &self.entry,
            DelayKind::Exit => &self.exit,
        }
    }

    fn get_mut(&mut self, kind: DelayKind) -> &mut DelayTimer {
        match kind {
            DelayKind::Entry => &mut self.entry,
            DelayKind::Exit => &mut self.exit,
        }
    }

    /// Start `kind`, cancelling the other timer first.
    pub fn start(&mut self, kind: DelayKind, now_ms: u64) -> u8 {
        let other = match kind {
            DelayKind::Entry => DelayKind::Exit,
            DelayKind::Exit => DelayKind::Entry,
        };
        self.get_mut(other).cancel();
        self.get_mut(kind).start(now_ms)
    }

    /// Cancel one timer.  Idempotent.
    pub fn cancel(&mut self, kind: DelayKind) -> bool {
        self.get_mut(kind).cancel()
    }

    /// Cancel whichever timer is armed.  Idempotent.
    pub fn cancel_all(&mut self) -> bool {
        let entry = self.entry.cancel();
        let exit = self.exit.cancel();
        entry || exit
    }

    /// First timer whose period has elapsed, with its token.
    pub fn due(&self, now_ms: u64) -> Option<(DelayKind, u8)> {
        [&self.exit, &self.entry]
            .into_iter()
            .find_map(|t| t.due(now_ms).map(|token| (t.kind, token)))
    }

    /// Consume an elapse: disarm the timer if `token` is current.
    /// Returns `false` for a stale or cancelled arming.
    pub fn consume(&mut self, kind: DelayKind, token: u8) -> bool {
        let timer = self.get_mut(kind);
        if timer.matches(token) {
            timer.cancel();
            true
        } else {
            false
        }
    }

    pub fn armed_count(&self) -> usize {
        usize::from(self.entry.armed) + usize::from(self.exit.armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent() {
        let mut t = DelayTimer::new(DelayKind::Exit, 100);
        assert!(!t.cancel());
        t.start(0);
        assert!(t.cancel());
        assert!(!t.cancel());
        assert!(!t.is_armed());
    }

    #[test]
    fn due_after_period() {
        let mut t = DelayTimer::new(DelayKind::Entry, 100);
        let token = t.start(1_000);
        assert_eq!(t.due(1_099), None);
        assert_eq!(t.due(1_100), Some(token));
        assert_eq!(t.remaining_ms(1_040), Some(60));
    }

    #[test]
    fn restart_changes_token() {
        let mut t = DelayTimer::new(DelayKind::Exit, 100);
        let first = t.start(0);
        t.cancel();
        let second = t.start(10);
        assert_ne!(first, second);
        assert!(!t.matches(first));
        assert!(t.matches(second));
    }

    #[test]
    fn starting_one_cancels_the_other() {
        let mut timers = DelayTimers::new(100, 200);
        timers.start(DelayKind::Exit, 0);
        assert!(timers.get(DelayKind::Exit).is_armed());
        timers.start(DelayKind::Entry, 10);
        assert!(timers.get(DelayKind::Entry).is_armed());
        assert!(!timers.get(DelayKind::Exit).is_armed());
        assert_eq!(timers.armed_count(), 1);
    }

    #[test]
    fn consume_rejects_stale_token() {
        let mut timers = DelayTimers::new(100, 200);
        let stale = timers.start(DelayKind::Exit, 0);
        timers.cancel(DelayKind::Exit);
        assert!(!timers.consume(DelayKind::Exit, stale));

        let live = timers.start(DelayKind::Exit, 0);
        assert!(timers.consume(DelayKind::Exit, live));
        assert!(!timers.consume(DelayKind::Exit, live), "second delivery is a no-op");
    }

    #[test]
    fn cancel_all_reports_whether_anything_was_armed() {
        let mut timers = DelayTimers::new(100, 200);
        assert!(!timers.cancel_all());
        timers.start(DelayKind::Entry, 0);
        assert!(timers.cancel_all());
        assert_eq!(timers.armed_count(), 0);
    }
}

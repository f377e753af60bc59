//! Alarm transition table.
//!
//! A pure lookup keyed by `(state, event)`.  Each row yields the next
//! state plus the side effects the machine must run.  Pairs without a
//! row are no-ops.
//!
//! ```text
//!              Arm        Disarm     Trigger     Timeout  Reset   EntryDone   ExitDone
//! Disarmed     Arming     .          .           .        .       .           Disarmed*
//! Arming       .          Disarmed   .           .        .       .           Armed
//! Armed        .          Disarmed   Triggering  .        .       .           .
//! Triggering   .          Disarmed   Triggered   .        Armed   Triggered   .
//! Triggered    .          Disarmed   .           Armed    Armed   .           .
//!
//! * stray exit elapse: cancel timers, no state change
//! ```

use super::{AlarmEvent, AlarmState};

/// Side effect attached to a table row, run in order by the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    StartExitTimer,
    StartEntryTimer,
    CancelEntryTimer,
    /// Cancel whichever delay timer is armed.
    CancelTimers,
    /// Record the triggering sensor and the trigger time.
    RecordTrigger,
    /// Forget the triggering sensor.
    ClearTrigger,
}

/// One row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: AlarmState,
    pub effects: &'static [Effect],
}

const fn row(next: AlarmState, effects: &'static [Effect]) -> Option<Transition> {
    Some(Transition { next, effects })
}

/// Look up the row for `(state, event)`.  `None` means the pair is a
/// no-op.
pub const fn transition(state: AlarmState, event: AlarmEvent) -> Option<Transition> {
    use AlarmEvent as E;
    use AlarmState as S;
    use Effect::*;

    match (state, event) {
        (S::Disarmed, E::Arm) => row(S::Arming, &[StartExitTimer]),
        (S::Disarmed, E::ExitDelayElapsed) => row(S::Disarmed, &[CancelTimers]),

        (S::Arming, E::Disarm) => row(S::Disarmed, &[CancelTimers]),
        (S::Arming, E::ExitDelayElapsed) => row(S::Armed, &[CancelTimers]),

        (S::Armed, E::Disarm) => row(S::Disarmed, &[CancelTimers]),
        (S::Armed, E::Trigger) => row(S::Triggering, &[StartEntryTimer, RecordTrigger]),

        (S::Triggering, E::Disarm) => row(S::Disarmed, &[CancelTimers, ClearTrigger]),
        (S::Triggering, E::Trigger) => row(S::Triggered, &[CancelEntryTimer, RecordTrigger]),
        (S::Triggering, E::Reset) => row(S::Armed, &[CancelEntryTimer, ClearTrigger]),
        (S::Triggering, E::EntryDelayElapsed) => row(S::Triggered, &[CancelEntryTimer]),

        (S::Triggered, E::Disarm) => row(S::Disarmed, &[CancelTimers, ClearTrigger]),
        (S::Triggered, E::Timeout) => row(S::Armed, &[ClearTrigger]),
        (S::Triggered, E::Reset) => row(S::Armed, &[ClearTrigger]),

        _ => None,
    }
}

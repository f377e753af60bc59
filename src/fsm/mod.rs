//! Alarm state machine.
//!
//! ```text
//!                 Arm                 exit delay
//!   ┌──────────┐ ────► ┌────────┐ ───────────────► ┌───────┐
//!   │ DISARMED │       │ ARMING │                  │ ARMED │◄─────────┐
//!   └──────────┘ ◄──── └────────┘                  └───────┘          │
//!        ▲      Disarm                   Trigger │    ▲ Reset         │
//!        │                                       ▼    │               │ Reset /
//!        │  Disarm (any state)           ┌────────────┐  entry delay  │ Timeout
//!        └────────────────────────────── │ TRIGGERING │ ─────────────►┌───────────┐
//!                                        └────────────┘   / Trigger   │ TRIGGERED │
//!                                                                     └───────────┘
//! ```
//!
//! [`AlarmMachine`] owns the current state, both delay timers, and the
//! trigger bookkeeping.  Every event goes through the pure table in
//! [`states`]; the machine only runs the row's effects.  Timers are
//! polled from the main loop and each elapse carries the token of the
//! arming it belongs to, so an elapse that lost a race with a cancel is a
//! no-op.

pub mod states;
pub mod timers;

use core::fmt;

use log::{debug, info};
use serde::Serialize;

use crate::config::HubConfig;
use crate::sensors::SensorId;
use states::Effect;
use timers::{DelayKind, DelayTimers};

// ---------------------------------------------------------------------------
// State and event vocabulary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlarmState {
    Disarmed,
    Arming,
    Armed,
    Triggering,
    Triggered,
}

impl AlarmState {
    pub const ALL: [Self; 5] = [
        Self::Disarmed,
        Self::Arming,
        Self::Armed,
        Self::Triggering,
        Self::Triggered,
    ];

    /// Upper-case name used in every outbound payload.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Disarmed => "DISARMED",
            Self::Arming => "ARMING",
            Self::Armed => "ARMED",
            Self::Triggering => "TRIGGERING",
            Self::Triggered => "TRIGGERED",
        }
    }

    /// Triggering or Triggered.
    pub const fn is_alarm(self) -> bool {
        matches!(self, Self::Triggering | Self::Triggered)
    }
}

impl fmt::Display for AlarmState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything that can drive the machine, from sensors, commands, or timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlarmEvent {
    Arm,
    Disarm,
    Trigger,
    Timeout,
    Reset,
    EntryDelayElapsed,
    ExitDelayElapsed,
}

impl AlarmEvent {
    pub const ALL: [Self; 7] = [
        Self::Arm,
        Self::Disarm,
        Self::Trigger,
        Self::Timeout,
        Self::Reset,
        Self::EntryDelayElapsed,
        Self::ExitDelayElapsed,
    ];
}

/// Outcome of one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub previous: AlarmState,
    pub state: AlarmState,
    /// `state != previous`.  Only changed outcomes are notified.
    pub changed: bool,
}

impl Applied {
    const fn unchanged(state: AlarmState) -> Self {
        Self {
            previous: state,
            state,
            changed: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AlarmMachine {
    state: AlarmState,
    timers: DelayTimers,
    /// Sensor behind the latest Trigger.  Only set while in an alarm state.
    triggered_by: Option<SensorId>,
    triggered_at_ms: Option<u64>,
    /// When the current state was entered.
    state_since_ms: u64,
    trigger_count: u32,
    door_open_count: u32,
    /// Triggered → Armed after this long.  0 disables the siren timeout.
    alarm_timeout_ms: u32,
}

impl AlarmMachine {
    /// Cold boot: Disarmed, both timers cancelled.
    pub const fn new(exit_delay_ms: u32, entry_delay_ms: u32, alarm_timeout_ms: u32) -> Self {
        Self {
            state: AlarmState::Disarmed,
            timers: DelayTimers::new(entry_delay_ms, exit_delay_ms),
            triggered_by: None,
            triggered_at_ms: None,
            state_since_ms: 0,
            trigger_count: 0,
            door_open_count: 0,
            alarm_timeout_ms,
        }
    }

    pub fn from_config(config: &HubConfig) -> Self {
        Self::new(
            config.exit_delay_ms,
            config.entry_delay_ms,
            config.alarm_timeout_ms,
        )
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Apply an event with no originating sensor.
    pub fn apply(&mut self, event: AlarmEvent, now_ms: u64) -> Applied {
        self.apply_from(event, None, now_ms)
    }

    /// Apply an event, recording `source` if the row records a trigger.
    /// Total: pairs without a row leave everything untouched.
    pub fn apply_from(
        &mut self,
        event: AlarmEvent,
        source: Option<SensorId>,
        now_ms: u64,
    ) -> Applied {
        let previous = self.state;
        let Some(row) = states::transition(previous, event) else {
            debug!("Alarm: {event:?} ignored in {previous}");
            return Applied::unchanged(previous);
        };

        for effect in row.effects {
            self.run_effect(*effect, source, now_ms);
        }

        self.state = row.next;
        let changed = row.next != previous;
        if changed {
            self.state_since_ms = now_ms;
            info!("Alarm: {previous} -> {} on {event:?}", row.next);
        }

        Applied {
            previous,
            state: row.next,
            changed,
        }
    }

    /// Deliver a timer elapse.  Applied only if the timer is still armed
    /// with the same token; the table then re-validates the state.
    pub fn on_delay_elapsed(&mut self, kind: DelayKind, token: u8, now_ms: u64) -> Applied {
        if !self.timers.consume(kind, token) {
            debug!("Alarm: stale {kind:?} delay elapse (token {token}) ignored");
            return Applied::unchanged(self.state);
        }
        self.apply(kind.elapsed_event(), now_ms)
    }

    /// Run deferred timer work: at most one elapse or siren timeout per
    /// call.  `None` when nothing was due.
    pub fn poll(&mut self, now_ms: u64) -> Option<Applied> {
        if let Some((kind, token)) = self.timers.due(now_ms) {
            return Some(self.on_delay_elapsed(kind, token, now_ms));
        }

        if self.state == AlarmState::Triggered
            && self.alarm_timeout_ms > 0
            && now_ms.saturating_sub(self.state_since_ms) >= u64::from(self.alarm_timeout_ms)
        {
            info!("Alarm: siren timeout after {} ms", self.alarm_timeout_ms);
            return Some(self.apply(AlarmEvent::Timeout, now_ms));
        }

        None
    }

    /// Count an accepted door/window opening.
    pub fn note_door_open(&mut self) {
        self.door_open_count = self.door_open_count.saturating_add(1);
    }

    pub fn timers(&self) -> &DelayTimers {
        &self.timers
    }

    pub fn exit_delay_active(&self) -> bool {
        self.timers.get(DelayKind::Exit).is_armed()
    }

    pub fn entry_delay_active(&self) -> bool {
        self.timers.get(DelayKind::Entry).is_armed()
    }

    pub fn triggered_by(&self) -> Option<SensorId> {
        self.triggered_by
    }

    pub fn triggered_at_ms(&self) -> Option<u64> {
        self.triggered_at_ms
    }

    pub fn trigger_count(&self) -> u32 {
        self.trigger_count
    }

    pub fn door_open_count(&self) -> u32 {
        self.door_open_count
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn run_effect(&mut self, effect: Effect, source: Option<SensorId>, now_ms: u64) {
        match effect {
            Effect::StartExitTimer => {
                self.timers.start(DelayKind::Exit, now_ms);
            }
            Effect::StartEntryTimer => {
                self.timers.start(DelayKind::Entry, now_ms);
            }
            Effect::CancelEntryTimer => {
                self.timers.cancel(DelayKind::Entry);
            }
            Effect::CancelTimers => {
                self.timers.cancel_all();
            }
            Effect::RecordTrigger => {
                self.trigger_count = self.trigger_count.saturating_add(1);
                self.triggered_at_ms = Some(now_ms);
                if source.is_some() {
                    self.triggered_by = source;
                }
            }
            Effect::ClearTrigger => {
                self.triggered_by = None;
                self.triggered_at_ms = None;
            }
        }
    }
}

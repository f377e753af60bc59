//! Application service: the single alarm context.
//!
//! [`HubService`] owns the state machine, the debounce gate (and with it
//! the sensor table), the notification flags, and the heartbeat.  Nothing
//! lives in a global: the firmware loop holds one `HubService` and passes
//! it by `&mut` into every entry point, which makes each call a critical
//! section against the others.  Bus and transport I/O go through the port
//! traits, injected at call sites.
//!
//! ```text
//!  ExpanderPort ──▶ on_interrupt ──▶ DebounceGate ──▶ dispatch ─┐
//!                                                               ▼
//!  command text ──▶ handle_command ──▶ interpreter ──▶ AlarmMachine ──▶ NotificationFlags ──▶ Publisher
//!                                                               ▲
//!  clock ─────────▶ poll ──────────────────────── delay timers ─┘
//! ```

use log::{info, warn};

use crate::config::HubConfig;
use crate::error::{ConfigError, IoError, Result};
use crate::fsm::{AlarmEvent, AlarmMachine, AlarmState, Applied};
use crate::sensors::SensorTable;
use crate::sensors::debounce::DebounceGate;
use crate::sensors::dispatch::{self, Action};

use super::events::{Notification, StatusReport, Version};
use super::interpreter::{self, CommandResult};
use super::notify::{Drained, Heartbeat, NotificationFlags};
use super::ports::{ExpanderPort, Publisher};

// ───────────────────────────────────────────────────────────────
// HubService
// ───────────────────────────────────────────────────────────────

pub struct HubService {
    config: HubConfig,
    machine: AlarmMachine,
    gate: DebounceGate,
    flags: NotificationFlags,
    heartbeat: Heartbeat,
    version: Version,
}

impl HubService {
    /// Validate `config` and build the service.  Cold boot: Disarmed,
    /// both timers cancelled, no pending notifications.
    pub fn new(config: HubConfig) -> Result<Self> {
        config.validate()?;
        let table = SensorTable::from_configs(&config.sensors)?;
        let version = Version::try_from(config.firmware_version.as_str())
            .map_err(|()| ConfigError::ValidationFailed("firmware_version too long"))?;

        info!(
            "Hub: {} sensor(s), exit {} ms, entry {} ms",
            table.len(),
            config.exit_delay_ms,
            config.entry_delay_ms
        );

        Ok(Self {
            machine: AlarmMachine::from_config(&config),
            gate: DebounceGate::new(table),
            flags: NotificationFlags::new(),
            heartbeat: Heartbeat::new(config.heartbeat_interval_ms),
            version,
            config,
        })
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn current_state(&self) -> AlarmState {
        self.machine.state()
    }

    pub fn machine(&self) -> &AlarmMachine {
        &self.machine
    }

    pub fn sensors(&self) -> &SensorTable {
        self.gate.table()
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Pending notifications, without clearing them.
    pub fn pending_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.flags.pending()
    }

    pub fn status_report(&self, now_ms: u64) -> StatusReport {
        StatusReport {
            alarm_state: self.machine.state(),
            uptime_ms: now_ms,
            exit_delay_active: self.machine.exit_delay_active(),
            entry_delay_active: self.machine.entry_delay_active(),
            triggered_by: self
                .machine
                .triggered_by()
                .and_then(|id| self.gate.table().get(id))
                .map(|s| s.name.clone()),
            trigger_count: self.machine.trigger_count(),
            door_open_count: self.machine.door_open_count(),
            timestamp: now_ms,
            version: self.version.clone(),
        }
    }

    // ── Event sources ─────────────────────────────────────────

    /// Inject an event directly, as a physical input would.
    pub fn apply_event(&mut self, event: AlarmEvent, now_ms: u64) -> Applied {
        let applied = self.machine.apply(event, now_ms);
        self.note_applied(applied, now_ms);
        applied
    }

    /// Interpret one command envelope and queue its response.  `status`
    /// answers on `status/response`; everything else on `cmd/response`.
    pub fn handle_command(&mut self, text: &str, now_ms: u64) -> CommandResult {
        let outcome = interpreter::interpret(text, &mut self.machine, now_ms);
        if let Some(applied) = outcome.applied {
            self.note_applied(applied, now_ms);
        }

        let mut result = outcome.result;
        if outcome.status_requested {
            let report = self.status_report(now_ms);
            self.flags.mark(Notification::Status(report.clone()));
            result.report = Some(report);
        } else {
            self.flags.mark(Notification::CommandResponse {
                result: result.clone(),
                at_ms: now_ms,
            });
        }
        result
    }

    /// Feed one INTF/INTCAP pair through debounce and dispatch.  Returns
    /// the number of accepted transitions.
    pub fn on_interrupt(&mut self, flag_byte: u8, capture_byte: u8, now_ms: u64) -> usize {
        let transitions = self.gate.on_interrupt(flag_byte, capture_byte, now_ms);

        for transition in &transitions {
            let Some(sensor) = self.gate.table().get(transition.sensor) else {
                continue;
            };
            // Dispatch against the state left by the previous transition.
            let actions = dispatch::dispatch(transition, sensor, self.machine.state());

            for action in actions {
                match action {
                    Action::Notify(notification) => {
                        if matches!(notification, Notification::Door { open: true, .. }) {
                            self.machine.note_door_open();
                        }
                        self.flags.mark(notification);
                    }
                    Action::Alarm { event, source } => {
                        let applied = self.machine.apply_from(event, Some(source), now_ms);
                        self.note_applied(applied, now_ms);
                    }
                }
            }
        }

        transitions.len()
    }

    /// Read the expander and process the result.  A failed read is
    /// logged and means "no transition this tick".
    pub fn service_expander<E: ExpanderPort>(
        &mut self,
        expander: &mut E,
        now_ms: u64,
    ) -> core::result::Result<usize, IoError> {
        match expander.read_interrupt_registers() {
            Ok((flags, capture)) => Ok(self.on_interrupt(flags, capture, now_ms)),
            Err(e) => {
                warn!("Expander: interrupt register read failed ({e})");
                Err(e)
            }
        }
    }

    /// Deferred work: delay-timer elapses, siren timeout, heartbeat.
    pub fn poll(&mut self, now_ms: u64) {
        while let Some(applied) = self.machine.poll(now_ms) {
            self.note_applied(applied, now_ms);
        }

        if self.heartbeat.poll(now_ms) {
            self.flags.mark(Notification::Heartbeat {
                uptime_ms: now_ms,
                state: self.machine.state(),
            });
        }
    }

    // ── Outbound ──────────────────────────────────────────────

    /// Take and clear every pending notification.
    pub fn drain(&mut self) -> Drained {
        self.flags.drain()
    }

    /// Drain and publish.  A payload that does not fit its buffer, or a
    /// failed publish, is logged and dropped; the slot is not re-marked.
    /// Returns the number published.
    pub fn publish_pending<P: Publisher>(&mut self, publisher: &mut P) -> usize {
        let mut published = 0;
        for notification in self.flags.drain() {
            let topic = notification.topic();
            let payload = match notification.to_json() {
                Ok(payload) => payload,
                Err(e) => {
                    warn!("Publish: cannot render {topic} ({e:?}), dropped");
                    continue;
                }
            };
            match publisher.publish(&topic, &payload) {
                Ok(()) => published += 1,
                Err(e) => warn!("Publish: {topic} failed ({e}), dropped"),
            }
        }
        published
    }

    // ── Internal ──────────────────────────────────────────────

    fn note_applied(&mut self, applied: Applied, now_ms: u64) {
        if !applied.changed {
            return;
        }
        let sensor = if applied.state.is_alarm() {
            self.machine
                .triggered_by()
                .and_then(|id| self.gate.table().get(id))
                .map(|s| s.name.clone())
        } else {
            None
        };
        self.flags.mark(Notification::AlarmState {
            state: applied.state,
            previous: applied.previous,
            sensor,
            at_ms: now_ms,
        });
    }
}

//! Debounce gate: expander interrupt bytes → per-sensor transitions.
//!
//! ## Algorithm
//!
//! For every active sensor whose pin bit is set in the interrupt-flag byte,
//! in ascending pin order:
//!
//! 1. Raw level = pin bit of the capture byte.
//! 2. Apply `invert_logic`.
//! 3. Reject if `now_ms - last_event_ms < debounce_ms`.
//! 4. Otherwise accept, record `now_ms`, emit one [`SensorTransition`].
//!
//! Sensors whose bit is clear in the flag byte are not touched.  The
//! recorded timestamp never decreases, even if the caller's clock does.

use log::debug;

use super::{MAX_SENSORS, SensorTable, SensorTransition};

/// Transitions produced by a single interrupt (at most one per sensor).
pub type Transitions = heapless::Vec<SensorTransition, MAX_SENSORS>;

/// Owns the sensor table and filters raw edges through each sensor's
/// debounce window.
#[derive(Debug, Default)]
pub struct DebounceGate {
    table: SensorTable,
}

impl DebounceGate {
    pub fn new(table: SensorTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SensorTable {
        &self.table
    }

    /// Process one INTF/INTCAP pair captured at `now_ms`.
    pub fn on_interrupt(&mut self, flag_byte: u8, capture_byte: u8, now_ms: u64) -> Transitions {
        let mut out = Transitions::new();

        for sensor in self.table.iter_mut() {
            if !sensor.active || flag_byte & sensor.pin_mask == 0 {
                continue;
            }

            let raw = capture_byte & sensor.pin_mask != 0;
            let level = raw != sensor.invert_logic;

            if let Some(last) = sensor.last_event_ms {
                if now_ms.saturating_sub(last) < u64::from(sensor.debounce_ms) {
                    debug!(
                        "Sensor '{}': debounced ({} ms since last edge)",
                        sensor.name,
                        now_ms.saturating_sub(last)
                    );
                    continue;
                }
            }

            sensor.last_event_ms = Some(sensor.last_event_ms.map_or(now_ms, |l| l.max(now_ms)));

            // At most one entry per table slot, so this cannot overflow.
            let _ = out.push(SensorTransition {
                sensor: sensor.id,
                kind: sensor.kind,
                active: level,
                at_ms: now_ms,
            });
        }

        out
    }
}

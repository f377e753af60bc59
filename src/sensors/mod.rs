//! Sensor subsystem: descriptors, the bounded [`SensorTable`], and the
//! interrupt-to-event path ([`debounce`] then [`dispatch`]).
//!
//! Every physical input sits on one pin of the MCP23018 port A.  The
//! expander latches which pins changed (INTF) and their level at the moment
//! of the interrupt (INTCAP); the main loop hands that byte pair to the
//! debounce gate, which produces [`SensorTransition`]s.

pub mod debounce;
pub mod dispatch;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SensorConfig;
use crate::error::SensorError;

/// Capacity of the sensor table: one expander port.
pub const MAX_SENSORS: usize = 8;

/// Byte capacity of sensor names.
pub const NAME_CAP: usize = 16;

/// Sensor identifier, unique within the table.
pub type SensorId = u8;

/// Fixed-capacity sensor name.
pub type SensorName = heapless::String<NAME_CAP>;

/// What a sensor is wired to.  Decides how the dispatcher routes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Door,
    Window,
    Motion,
    Smoke,
    ArmButton,
    DisarmButton,
    ResetButton,
}

/// Static description of one sensor plus its debounce bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorDescriptor {
    pub id: SensorId,
    pub kind: SensorType,
    /// Expander pin mask, exactly one bit set.
    pub pin_mask: u8,
    pub name: SensorName,
    pub topic_name: SensorName,
    pub invert_logic: bool,
    pub debounce_ms: u16,
    pub active: bool,
    /// Time of the last accepted transition.  `None` until the first one.
    pub last_event_ms: Option<u64>,
}

impl SensorDescriptor {
    /// Build a descriptor from configuration.  The pin index is
    /// range-checked here; uniqueness is the table's job.
    pub fn from_config(cfg: &SensorConfig) -> Result<Self, SensorError> {
        if cfg.pin > 7 {
            return Err(SensorError::InvalidPinMask);
        }
        Ok(Self {
            id: cfg.id,
            kind: cfg.kind,
            pin_mask: 1 << cfg.pin,
            name: name_from(&cfg.name)?,
            topic_name: name_from(&cfg.topic_name)?,
            invert_logic: cfg.invert_logic,
            debounce_ms: cfg.debounce_ms,
            active: cfg.active,
            last_event_ms: None,
        })
    }

    /// Index of the single set bit in `pin_mask`.
    pub fn pin_index(&self) -> u32 {
        self.pin_mask.trailing_zeros()
    }
}

fn name_from(s: &str) -> Result<SensorName, SensorError> {
    SensorName::try_from(s).map_err(|()| SensorError::NameTooLong)
}

/// A debounced, logic-corrected edge on one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorTransition {
    pub sensor: SensorId,
    pub kind: SensorType,
    /// Logical level after invert-logic: `true` = open / detected / pressed.
    pub active: bool,
    pub at_ms: u64,
}

/// Bounded table of sensors, kept sorted by pin index so iteration order is
/// ascending pin order.
#[derive(Debug, Default)]
pub struct SensorTable {
    sensors: heapless::Vec<SensorDescriptor, MAX_SENSORS>,
}

impl SensorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from configuration, rejecting the first bad entry.
    pub fn from_configs(configs: &[SensorConfig]) -> Result<Self, SensorError> {
        let mut table = Self::new();
        for cfg in configs {
            table.register(SensorDescriptor::from_config(cfg)?)?;
        }
        Ok(table)
    }

    /// Add a sensor.  Rejects a full table, a mask without exactly one bit,
    /// a pin already in use, or a duplicate id.
    pub fn register(&mut self, descriptor: SensorDescriptor) -> Result<(), SensorError> {
        if descriptor.pin_mask.count_ones() != 1 {
            return Err(SensorError::InvalidPinMask);
        }
        if self.sensors.iter().any(|s| s.pin_mask == descriptor.pin_mask) {
            return Err(SensorError::DuplicatePin);
        }
        if self.sensors.iter().any(|s| s.id == descriptor.id) {
            return Err(SensorError::DuplicateId);
        }

        let pos = self
            .sensors
            .iter()
            .position(|s| s.pin_mask > descriptor.pin_mask)
            .unwrap_or(self.sensors.len());
        info!(
            "Sensors: registered '{}' ({:?}) on pin {}",
            descriptor.name,
            descriptor.kind,
            descriptor.pin_index()
        );
        self.sensors
            .insert(pos, descriptor)
            .map_err(|_| SensorError::TableFull)
    }

    pub fn get(&self, id: SensorId) -> Option<&SensorDescriptor> {
        self.sensors.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SensorDescriptor> {
        self.sensors.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SensorDescriptor> {
        self.sensors.iter_mut()
    }

    /// OR of every active sensor's pin mask (expander interrupt-enable value).
    pub fn interrupt_mask(&self) -> u8 {
        self.sensors
            .iter()
            .filter(|s| s.active)
            .fold(0, |mask, s| mask | s.pin_mask)
    }

    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }
}

#[cfg(test)]
pub(crate) fn test_descriptor(id: SensorId, kind: SensorType, pin: u8) -> SensorDescriptor {
    SensorDescriptor {
        id,
        kind,
        pin_mask: 1 << pin,
        name: name_from("Test").unwrap(),
        topic_name: name_from("test").unwrap(),
        invert_logic: false,
        debounce_ms: 50,
        active: true,
        last_event_ms: None,
    }
}

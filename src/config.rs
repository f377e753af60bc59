//! System configuration parameters
//!
//! All tunable parameters for the SensorHub alarm controller.  Nothing is
//! persisted: a cold boot always starts from the compiled-in defaults (or a
//! config deserialised by the caller).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sensors::{MAX_SENSORS, NAME_CAP, SensorType};

/// One expander-attached sensor as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Unique sensor id.
    pub id: u8,
    /// What the sensor is wired to.
    pub kind: SensorType,
    /// Expander port-A pin index (0-7).
    pub pin: u8,
    /// Human-readable name (e.g. "Front Door").
    pub name: String,
    /// Machine-readable name used in topics (e.g. "front_door").
    pub topic_name: String,
    /// Invert the raw pin level.
    pub invert_logic: bool,
    /// Minimum time between two accepted transitions.
    pub debounce_ms: u16,
    /// Inactive sensors are ignored by the debounce gate.
    pub active: bool,
}

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    // --- Identity ---
    /// Device name, second topic level.
    pub device_name: String,
    /// Root topic level.
    pub topic_root: String,
    /// Reported in status responses.
    pub firmware_version: String,

    // --- Delays ---
    /// Exit delay: Arming -> Armed (milliseconds)
    pub exit_delay_ms: u32,
    /// Entry delay: Triggering -> Triggered (milliseconds)
    pub entry_delay_ms: u32,
    /// Siren timeout: Triggered -> Armed via `Timeout` (0 = never)
    pub alarm_timeout_ms: u32,

    // --- Timing ---
    /// Heartbeat publish period (milliseconds)
    pub heartbeat_interval_ms: u32,
    /// Main loop sleep between iterations (milliseconds)
    pub loop_interval_ms: u32,

    // --- Hardware ---
    /// 7-bit I2C address of the MCP23018.
    pub expander_address: u8,
    /// Sensor table contents.
    pub sensors: Vec<SensorConfig>,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            // Identity
            device_name: "pico_w_1".into(),
            topic_root: "sensor_hub".into(),
            firmware_version: "1.0.0".into(),

            // Delays
            exit_delay_ms: 30_000,
            entry_delay_ms: 30_000,
            alarm_timeout_ms: 0,

            // Timing
            heartbeat_interval_ms: 60_000, // 1/min
            loop_interval_ms: 10,

            // Hardware
            expander_address: 0x20,
            sensors: vec![SensorConfig {
                id: 1,
                kind: SensorType::Door,
                pin: 7, // GPA7
                name: "Front Door".into(),
                topic_name: "front_door".into(),
                invert_logic: false,
                debounce_ms: 50,
                active: true,
            }],
        }
    }
}

impl HubConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exit_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("exit_delay_ms must be > 0"));
        }
        if self.entry_delay_ms == 0 {
            return Err(ConfigError::ValidationFailed("entry_delay_ms must be > 0"));
        }
        if self.heartbeat_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "heartbeat_interval_ms must be > 0",
            ));
        }
        if !is_topic_level(&self.device_name) || !is_topic_level(&self.topic_root) {
            return Err(ConfigError::ValidationFailed(
                "device_name/topic_root must be single topic levels",
            ));
        }
        if self.firmware_version.is_empty() || self.firmware_version.len() > 16 {
            return Err(ConfigError::ValidationFailed(
                "firmware_version must be 1-16 bytes",
            ));
        }
        if self.expander_address > 0x7f {
            return Err(ConfigError::ValidationFailed(
                "expander_address must be a 7-bit address",
            ));
        }
        if self.sensors.len() > MAX_SENSORS {
            return Err(ConfigError::ValidationFailed("too many sensors"));
        }
        for s in &self.sensors {
            if s.pin > 7 {
                return Err(ConfigError::ValidationFailed("sensor pin must be 0-7"));
            }
            if s.name.is_empty() || s.name.len() > NAME_CAP {
                return Err(ConfigError::ValidationFailed(
                    "sensor name must be 1-16 bytes",
                ));
            }
            if !is_topic_level(&s.topic_name) || s.topic_name.len() > NAME_CAP {
                return Err(ConfigError::ValidationFailed(
                    "sensor topic_name must be a 1-16 byte topic level",
                ));
            }
        }
        Ok(())
    }
}

/// Non-empty, at most 32 bytes, and free of MQTT separators, wildcards,
/// and spaces.
fn is_topic_level(s: &str) -> bool {
    !s.is_empty() && s.len() <= 32 && !s.contains(['/', '+', '#', ' '])
}

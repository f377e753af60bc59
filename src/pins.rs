//! GPIO pin assignments for the SensorHub controller board.
//!
//! Only the host-side wiring lives here.  Sensor pins are on the MCP23018's
//! port A and are described by [`crate::config::SensorConfig::pin`].
//!
//! ```text
//!            ┌──────────────┐ SDA/SCL ┌──────────┐ GPA7
//!            │    ESP32     │◀──────▶│ MCP23018 │◀──── Front Door reed
//!            │              │  INTA   │   0x20   │
//!            │   GPIO 4  ◀──┼─────────┤          │
//!            └──────────────┘         └──────────┘
//! ```

// ---------------------------------------------------------------------------
// I²C bus to the expander
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 16;
pub const I2C_SCL_GPIO: i32 = 17;

/// The MCP23018 is run conservatively; long sensor runs add capacitance.
pub const I2C_BAUD_HZ: u32 = 50_000;

/// Upper bound on one I²C transaction, in FreeRTOS ticks.
pub const I2C_TIMEOUT_TICKS: u32 = 100;

// ---------------------------------------------------------------------------
// Expander interrupt (active-low, open-drain INTA)
// ---------------------------------------------------------------------------

pub const EXPANDER_INT_GPIO: i32 = 4;

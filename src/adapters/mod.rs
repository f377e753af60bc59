//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements     | Connects to                     |
//! |------------|----------------|---------------------------------|
//! | `expander` | ExpanderPort   | MCP23018 over embedded-hal I2C  |
//! | `log_sink` | Publisher      | Serial log output               |
//! | `time`     | Clock          | ESP32 system timer / `Instant`  |

pub mod expander;
pub mod log_sink;
pub mod time;

//! Port traits: the hexagonal boundary between the alarm core and the
//! outside world.
//!
//! ```text
//!   MCP23018 ──▶ ExpanderPort ──▶ HubService ──▶ Publisher ──▶ MQTT / log
//! ```
//!
//! The [`HubService`](super::service::HubService) takes these as generic
//! arguments at call sites, so the core never touches the bus or the
//! network directly and every path is testable with mocks.

use crate::error::IoError;

// ───────────────────────────────────────────────────────────────
// Expander port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read side of the I/O expander.
pub trait ExpanderPort {
    /// Read the interrupt-flag byte, then the interrupt-capture byte.
    /// Reading the capture register clears the expander's interrupt.
    /// Implementations bound the bus time; a stuck bus yields
    /// [`IoError::Timeout`], never a hang.
    fn read_interrupt_registers(&mut self) -> Result<(u8, u8), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Publisher port (driven adapter: domain → transport)
// ───────────────────────────────────────────────────────────────

/// Outbound message transport.
pub trait Publisher {
    /// Publish `payload` (JSON) on `topic_suffix`, which the
    /// implementation prefixes with `<topic_root>/<device_name>/`.
    fn publish(&mut self, topic_suffix: &str, payload: &str) -> Result<(), IoError>;
}

// ───────────────────────────────────────────────────────────────
// Time port
// ───────────────────────────────────────────────────────────────

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

//! Interrupt-side signalling.
//!
//! The expander's INTA line fires a GPIO interrupt on every sensor edge.
//! The ISR does exactly one thing: raise a pending flag.  No bus I/O, no
//! state-machine call, no allocation.  The main loop takes the flag and
//! does the register read and all processing.
//!
//! ```text
//! ┌──────────┐  INTA   ┌────────────┐  store(true)  ┌─────────────┐
//! │ MCP23018 │───────▶│ GPIO ISR   │──────────────▶│ PendingFlag │
//! └──────────┘         └────────────┘               └──────┬──────┘
//!                                                          │ take()
//!                                                   ┌──────▼──────┐
//!                                                   │  Main Loop  │
//!                                                   └─────────────┘
//! ```
//!
//! Several edges before the loop runs collapse into one pending flag; the
//! expander's INTF/INTCAP registers still hold the first captured edge,
//! and reading INTCAP re-arms the chip.

use core::sync::atomic::{AtomicBool, Ordering};

/// Level-triggered "work pending" bit shared between an ISR and the loop.
#[derive(Debug)]
pub struct PendingFlag(AtomicBool);

impl PendingFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Raise the flag.  ISR-safe.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was raised.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for PendingFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Raised by the expander interrupt, taken by the main loop.
pub static EXPANDER_IRQ: PendingFlag = PendingFlag::new();

/// GPIO interrupt handler for the expander's INTA line.
pub fn expander_isr() {
    EXPANDER_IRQ.raise();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears() {
        let flag = PendingFlag::new();
        assert!(!flag.take());
        flag.raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn repeated_raises_collapse() {
        let flag = PendingFlag::new();
        flag.raise();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.is_raised());
    }
}

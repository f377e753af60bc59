//! MCP23018 I/O expander adapter.
//!
//! Implements [`ExpanderPort`] over any `embedded-hal` 1.0 [`I2c`] bus.
//! The chip is switched to BANK=1 addressing at configure time, so port A
//! registers sit at `0x00..=0x0A`.
//!
//! | Reg      | BANK1 | Use                                          |
//! |----------|-------|----------------------------------------------|
//! | IODIRA   | 0x00  | all inputs                                   |
//! | GPINTENA | 0x02  | interrupt-on-change for the sensor mask      |
//! | INTCONA  | 0x04  | 0 = compare against previous value (edges)   |
//! | IOCON    | 0x05  | BANK, SEQOP, INTCC                           |
//! | GPPUA    | 0x06  | pull-ups on sensor pins                      |
//! | INTFA    | 0x07  | which pins caused the interrupt              |
//! | INTCAPA  | 0x08  | pin levels at interrupt time; read clears    |
//!
//! The bus timeout belongs to the `I2c` implementation; the firmware
//! wraps the ESP-IDF driver with a bounded tick count.

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use log::{debug, info};

use crate::app::ports::ExpanderPort;
use crate::error::IoError;

/// IOCON's address before the switch to BANK=1.
pub const IOCON_BANK0: u8 = 0x0A;

pub const IODIRA: u8 = 0x00;
pub const GPINTENA: u8 = 0x02;
pub const INTCONA: u8 = 0x04;
pub const IOCON: u8 = 0x05;
pub const GPPUA: u8 = 0x06;
pub const INTFA: u8 = 0x07;
pub const INTCAPA: u8 = 0x08;

/// IOCON bits.
pub const IOCON_BANK: u8 = 1 << 7;
pub const IOCON_SEQOP: u8 = 1 << 5;
pub const IOCON_INTCC: u8 = 1 << 0;

/// Default 7-bit address (ADDR pin grounded).
pub const DEFAULT_ADDRESS: u8 = 0x20;

fn io_error(kind: ErrorKind) -> IoError {
    match kind {
        // ESP-IDF reports a bus timeout as `Other`.
        ErrorKind::Other => IoError::Timeout,
        _ => IoError::Bus,
    }
}

pub struct Mcp23018<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> Mcp23018<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Put the chip into BANK=1 / byte mode, make port A all inputs with
    /// pull-ups on `interrupt_mask`, and enable edge interrupts on those
    /// pins.  Any interrupt latched before configuration is cleared.
    pub fn configure(&mut self, interrupt_mask: u8) -> Result<(), IoError> {
        self.write_register(IOCON_BANK0, IOCON_BANK | IOCON_SEQOP | IOCON_INTCC)?;
        self.write_register(IODIRA, 0xFF)?;
        self.write_register(GPPUA, interrupt_mask)?;
        self.write_register(INTCONA, 0x00)?;
        self.write_register(GPINTENA, interrupt_mask)?;
        let stale = self.read_register(INTCAPA)?;
        debug!("MCP23018: cleared stale capture 0x{stale:02x}");

        let iocon = self.read_register(IOCON)?;
        info!(
            "MCP23018 @0x{:02x}: IOCON=0x{:02x}, interrupts on 0b{:08b}",
            self.address, iocon, interrupt_mask
        );
        Ok(())
    }

    pub fn read_register(&mut self, register: u8) -> Result<u8, IoError> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| io_error(e.kind()))?;
        Ok(buf[0])
    }

    pub fn write_register(&mut self, register: u8, value: u8) -> Result<(), IoError> {
        self.i2c
            .write(self.address, &[register, value])
            .map_err(|e| io_error(e.kind()))
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> ExpanderPort for Mcp23018<I2C> {
    fn read_interrupt_registers(&mut self) -> Result<(u8, u8), IoError> {
        // SEQOP is set, so the two registers are separate transactions.
        let flags = self.read_register(INTFA)?;
        let capture = self.read_register(INTCAPA)?;
        Ok((flags, capture))
    }
}

//! Mock hardware adapters for integration tests.
//!
//! `MockExpander` replays queued INTF/INTCAP pairs, `MockI2c` models the
//! MCP23018 register file for the real adapter, and `RecordingPublisher`
//! keeps every published message so tests can assert on topics and
//! payloads without a broker.

use std::collections::VecDeque;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use sensorhub::adapters::expander::{DEFAULT_ADDRESS, INTCAPA, INTFA, IOCON, IOCON_BANK0};
use sensorhub::app::ports::{ExpanderPort, Publisher};
use sensorhub::error::IoError;

// ── MockExpander ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockExpander {
    pub pending: VecDeque<Result<(u8, u8), IoError>>,
    pub reads: usize,
}

#[allow(dead_code)]
impl MockExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one interrupt: `flags` = INTFA, `capture` = INTCAPA.
    pub fn queue(&mut self, flags: u8, capture: u8) {
        self.pending.push_back(Ok((flags, capture)));
    }

    pub fn queue_error(&mut self, error: IoError) {
        self.pending.push_back(Err(error));
    }
}

impl ExpanderPort for MockExpander {
    fn read_interrupt_registers(&mut self) -> Result<(u8, u8), IoError> {
        self.reads += 1;
        // An idle chip reports no flags.
        self.pending.pop_front().unwrap_or(Ok((0, 0)))
    }
}

// ── MockI2c ───────────────────────────────────────────────────

/// BANK1 register file.  IOCON is mirrored at its BANK0 address so the
/// configure write lands where the BANK1 read expects it.
#[derive(Default)]
pub struct MockI2c {
    regs: [u8; 0x16],
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if address != DEFAULT_ADDRESS {
            return Err(ErrorKind::NoAcknowledge(
                NoAcknowledgeSource::Address,
            ));
        }
        let mut pointer = 0usize;
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    pointer = usize::from(bytes[0]);
                    if let Some(&value) = bytes.get(1) {
                        let target = if bytes[0] == IOCON_BANK0 {
                            usize::from(IOCON)
                        } else {
                            pointer
                        };
                        self.regs[target] = value;
                    }
                }
                Operation::Read(buf) => {
                    for b in buf.iter_mut() {
                        *b = self.regs[pointer];
                    }
                    // Reading INTCAP clears the interrupt.
                    if pointer == usize::from(INTCAPA) {
                        self.regs[usize::from(INTFA)] = 0;
                    }
                }
            }
        }
        Ok(())
    }
}

// ── RecordingPublisher ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub messages: Vec<Published>,
    pub fail: bool,
}

#[allow(dead_code)]
impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn topics(&self) -> Vec<&str> {
        self.messages.iter().map(|m| m.topic.as_str()).collect()
    }

    pub fn find(&self, topic: &str) -> Option<&Published> {
        self.messages.iter().find(|m| m.topic == topic)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl Publisher for RecordingPublisher {
    fn publish(&mut self, topic_suffix: &str, payload: &str) -> Result<(), IoError> {
        if self.fail {
            return Err(IoError::NotConnected);
        }
        self.messages.push(Published {
            topic: topic_suffix.to_owned(),
            payload: payload.to_owned(),
        });
        Ok(())
    }
}

//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the SensorHub alarm
//! controller: command parsing and interpretation, interrupt servicing,
//! notification coalescing, and the JSON payloads that leave the device.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod interpreter;
pub mod notify;
pub mod ports;
pub mod service;

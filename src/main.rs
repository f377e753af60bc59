//! SensorHub Firmware: Main Entry Point
//!
//! Interrupt-driven alarm controller on an MCP23018 I/O expander.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Mcp23018          LogPublisher      MonotonicClock            │
//! │  (ExpanderPort)    (Publisher)       (Clock)                   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              HubService (pure logic)                   │    │
//! │  │  Debounce · Dispatch · AlarmMachine · Notifications    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  INTA ISR ─▶ EXPANDER_IRQ ─▶ main loop     console ─▶ commands │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use std::sync::mpsc;

use anyhow::Result;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use esp_idf_svc::sys::{EspError, ESP_ERR_TIMEOUT};
use log::{debug, info, warn};

use sensorhub::adapters::expander::Mcp23018;
use sensorhub::adapters::log_sink::LogPublisher;
use sensorhub::adapters::time::MonotonicClock;
use sensorhub::app::ports::Clock;
use sensorhub::app::service::HubService;
use sensorhub::config::HubConfig;
use sensorhub::drivers::hw_init;
use sensorhub::events::EXPANDER_IRQ;
use sensorhub::pins;

// ── Bounded I²C ───────────────────────────────────────────────
//
// The stock embedded-hal impl on `I2cDriver` blocks forever.  Every
// transaction here gives up after `pins::I2C_TIMEOUT_TICKS`.

#[derive(Debug)]
struct BusError(EspError);

impl embedded_hal::i2c::Error for BusError {
    fn kind(&self) -> ErrorKind {
        if self.0.code() == ESP_ERR_TIMEOUT as i32 {
            ErrorKind::Other
        } else {
            ErrorKind::Bus
        }
    }
}

struct BoundedI2c<'d>(I2cDriver<'d>);

impl ErrorType for BoundedI2c<'_> {
    type Error = BusError;
}

impl I2c for BoundedI2c<'_> {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.0
            .transaction(address, operations, pins::I2C_TIMEOUT_TICKS)
            .map_err(BusError)
    }
}

// ── Console ───────────────────────────────────────────────────

/// Forward stdin lines to the main loop.  Commands are JSON envelopes,
/// e.g. `{"command":"arm","source":"console"}`.
fn spawn_console(tx: mpsc::Sender<String>) -> Result<()> {
    std::thread::Builder::new()
        .name("console".into())
        .stack_size(4096)
        .spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { continue };
                if line.trim().is_empty() {
                    continue;
                }
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SensorHub v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Config + service ───────────────────────────────────
    let config = HubConfig::default();
    let address = config.expander_address;
    let loop_interval_ms = config.loop_interval_ms;
    let mut publisher = LogPublisher::new(&config.topic_root, &config.device_name);
    let mut hub = HubService::new(config)?;
    let clock = MonotonicClock::new();

    // ── 3. I²C + expander ─────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(pins::I2C_BAUD_HZ.Hz());
    let driver = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio16,
        peripherals.pins.gpio17,
        &i2c_config,
    )?;
    info!(
        "I2C0: SDA={} SCL={} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_BAUD_HZ
    );

    let mut expander = Mcp23018::new(BoundedI2c(driver), address);
    if let Err(e) = expander.configure(hub.sensors().interrupt_mask()) {
        // Without the expander every sensor is blind; keep running so
        // remote commands and heartbeats still work.
        warn!("MCP23018 configure failed ({e}), sensors unavailable");
    }

    // ── 4. Interrupts + console ───────────────────────────────
    if let Err(e) = hw_init::init_expander_interrupt() {
        log::error!("Expander interrupt init failed: {e}, falling back to INTA polling");
    }
    let (tx, rx) = mpsc::channel();
    spawn_console(tx)?;

    info!("Hub ready: {}", hub.current_state());

    // ── 5. Event loop ─────────────────────────────────────────
    loop {
        let now = clock.now_ms();

        if EXPANDER_IRQ.take() || hw_init::expander_int_asserted() {
            if let Ok(accepted) = hub.service_expander(&mut expander, now) {
                debug!("Expander: {accepted} transition(s)");
            }
            hw_init::reenable_expander_interrupt();
        }

        while let Ok(line) = rx.try_recv() {
            let result = hub.handle_command(line.trim(), now);
            info!("CMD | {} | {:?}: {}", result.command, result.status, result.message);
        }

        hub.poll(now);
        hub.publish_pending(&mut publisher);

        FreeRtos::delay_ms(loop_interval_ms);
    }
}

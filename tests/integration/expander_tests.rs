//! Expander adapter against a register-file model of the MCP23018,
//! driven through `HubService`.

use sensorhub::adapters::expander::{
    DEFAULT_ADDRESS, GPINTENA, GPPUA, INTCAPA, INTFA, IOCON, Mcp23018,
};
use sensorhub::app::service::HubService;
use sensorhub::config::HubConfig;
use sensorhub::fsm::AlarmState;

use crate::mock_hw::MockI2c;

#[test]
fn configure_enables_sensor_pins_only() {
    let hub = HubService::new(HubConfig::default()).unwrap();
    let mut chip = Mcp23018::new(MockI2c::default(), DEFAULT_ADDRESS);
    chip.configure(hub.sensors().interrupt_mask()).unwrap();

    assert_eq!(chip.read_register(GPINTENA), Ok(0x80));
    assert_eq!(chip.read_register(GPPUA), Ok(0x80));
    assert_eq!(chip.read_register(IOCON), Ok(0xA1));
}

#[test]
fn latched_interrupt_drives_the_alarm() {
    let mut hub = HubService::new(HubConfig {
        exit_delay_ms: 10,
        ..HubConfig::default()
    })
    .unwrap();
    hub.handle_command(r#"{"command":"arm"}"#, 0);
    hub.poll(10);
    assert_eq!(hub.current_state(), AlarmState::Armed);

    let mut chip = Mcp23018::new(MockI2c::default(), DEFAULT_ADDRESS);
    chip.configure(0x80).unwrap();
    chip.write_register(INTFA, 0x80).unwrap();
    chip.write_register(INTCAPA, 0x80).unwrap();

    assert_eq!(hub.service_expander(&mut chip, 500), Ok(1));
    assert_eq!(hub.current_state(), AlarmState::Triggering);

    // INTF was cleared by the capture read.
    assert_eq!(hub.service_expander(&mut chip, 600), Ok(0));
}

#[test]
fn wrong_address_is_a_bus_error() {
    let mut chip = Mcp23018::new(MockI2c::default(), 0x21);
    assert_eq!(chip.configure(0x80), Err(sensorhub::IoError::Bus));
}

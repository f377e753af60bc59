//! Fuzz target: command envelope parser and interpreter
//!
//! Feeds arbitrary bytes through `commands::parse` and then through a
//! full `HubService::handle_command`, verifying:
//! - No panics under arbitrary input
//! - Every result carries a non-empty message
//! - A parse failure never changes the alarm state
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorhub::app::commands;
use sensorhub::app::interpreter::CommandStatus;
use sensorhub::app::service::HubService;
use sensorhub::config::HubConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };

    let parsed = commands::parse(text);

    let Ok(mut hub) = HubService::new(HubConfig::default()) else {
        return;
    };
    let before = hub.current_state();
    let result = hub.handle_command(text, 0);

    assert!(!result.message.is_empty());
    if parsed.is_err() {
        assert_eq!(result.status, CommandStatus::Error);
        assert_eq!(hub.current_state(), before);
    }
});

//! Fuzz target: interrupt bytes through debounce, dispatch, and the FSM
//!
//! Each 3-byte chunk is one `[flags, capture, dt]` interrupt; a chunk
//! whose `dt` has the top bit set is a poll instead.  Verifies:
//! - No panics under arbitrary sequences
//! - At most one delay timer is ever armed
//! - Pending notifications never exceed the slot count
//!
//! cargo fuzz run fuzz_interrupt_bytes

#![no_main]

use libfuzzer_sys::fuzz_target;
use sensorhub::app::notify::SLOTS;
use sensorhub::app::service::HubService;
use sensorhub::config::HubConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(mut hub) = HubService::new(HubConfig {
        exit_delay_ms: 50,
        entry_delay_ms: 50,
        alarm_timeout_ms: 100,
        ..HubConfig::default()
    }) else {
        return;
    };
    hub.handle_command(r#"{"command":"arm"}"#, 0);

    let mut now = 0u64;
    for chunk in data.chunks_exact(3) {
        now += u64::from(chunk[2] & 0x7f);
        if chunk[2] & 0x80 != 0 {
            hub.poll(now);
        } else {
            hub.on_interrupt(chunk[0], chunk[1], now);
        }

        assert!(hub.machine().timers().armed_count() <= 1);
        assert!(hub.pending_notifications().count() <= SLOTS);
        if chunk[0] == 0xff {
            let _ = hub.drain();
        }
    }
});

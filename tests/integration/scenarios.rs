//! End-to-end scenarios: expander interrupt or remote command in,
//! state change and published JSON out.

use sensorhub::app::interpreter::CommandStatus;
use sensorhub::app::service::HubService;
use sensorhub::config::HubConfig;
use sensorhub::error::IoError;
use sensorhub::fsm::AlarmState;

use crate::mock_hw::{MockExpander, RecordingPublisher};

const EXIT_MS: u32 = 1_000;
const ENTRY_MS: u32 = 2_000;
const DOOR: u8 = 0x80; // GPA7

fn make_hub() -> (HubService, MockExpander, RecordingPublisher) {
    let config = HubConfig {
        exit_delay_ms: EXIT_MS,
        entry_delay_ms: ENTRY_MS,
        ..HubConfig::default()
    };
    let hub = HubService::new(config).expect("default config is valid");
    (hub, MockExpander::new(), RecordingPublisher::new())
}

fn armed_hub() -> (HubService, MockExpander, RecordingPublisher) {
    let (mut hub, expander, mut publisher) = make_hub();
    hub.handle_command(r#"{"command":"arm"}"#, 0);
    hub.poll(u64::from(EXIT_MS));
    assert_eq!(hub.current_state(), AlarmState::Armed);
    hub.publish_pending(&mut publisher);
    publisher.clear();
    (hub, expander, publisher)
}

fn json(payload: &str) -> serde_json::Value {
    serde_json::from_str(payload).expect("payload is JSON")
}

// ── A: door opens while Armed ─────────────────────────────────

#[test]
fn door_open_while_armed_escalates_after_entry_delay() {
    let (mut hub, mut expander, mut publisher) = armed_hub();

    expander.queue(DOOR, DOOR);
    let accepted = hub.service_expander(&mut expander, 5_000).unwrap();
    assert_eq!(accepted, 1);
    assert_eq!(hub.current_state(), AlarmState::Triggering);
    assert!(hub.machine().entry_delay_active());
    assert_eq!(hub.machine().triggered_by(), Some(1));

    hub.publish_pending(&mut publisher);
    assert!(publisher.find("door/front_door/open").is_some());
    let alarm = publisher.find("alarm/triggered").expect("triggering published");
    let body = json(&alarm.payload);
    assert_eq!(body["state"], "TRIGGERING");
    assert_eq!(body["sensor"], "Front Door");

    // Just short of the entry delay: nothing yet.
    hub.poll(5_000 + u64::from(ENTRY_MS) - 1);
    assert_eq!(hub.current_state(), AlarmState::Triggering);

    hub.poll(5_000 + u64::from(ENTRY_MS));
    assert_eq!(hub.current_state(), AlarmState::Triggered);
    assert!(!hub.machine().entry_delay_active());
    assert_eq!(hub.machine().triggered_by(), Some(1));
    assert_eq!(hub.status_report(7_000).triggered_by.as_deref(), Some("Front Door"));
}

#[test]
fn door_open_while_disarmed_only_notifies() {
    let (mut hub, mut expander, mut publisher) = make_hub();
    expander.queue(DOOR, DOOR);
    hub.service_expander(&mut expander, 100).unwrap();

    assert_eq!(hub.current_state(), AlarmState::Disarmed);
    hub.publish_pending(&mut publisher);
    assert_eq!(publisher.topics(), vec!["door/front_door/open"]);
    assert_eq!(hub.machine().door_open_count(), 1);
}

// ── B: remote arm ─────────────────────────────────────────────

#[test]
fn arm_command_runs_exit_delay() {
    let (mut hub, _, mut publisher) = make_hub();

    let result = hub.handle_command(r#"{"command":"arm","source":"app"}"#, 0);
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(result.message, "Arming initiated with exit delay");
    assert_eq!(hub.current_state(), AlarmState::Arming);
    assert!(hub.machine().exit_delay_active());

    hub.publish_pending(&mut publisher);
    let response = json(&publisher.find("cmd/response").unwrap().payload);
    assert_eq!(response["status"], "success");
    assert_eq!(response["command"], "arm");

    hub.poll(u64::from(EXIT_MS));
    assert_eq!(hub.current_state(), AlarmState::Armed);
    assert!(!hub.machine().exit_delay_active());
}

// ── C: disarm during exit delay ───────────────────────────────

#[test]
fn disarm_during_exit_delay_cancels_timer() {
    let (mut hub, _, _) = make_hub();
    hub.handle_command(r#"{"command":"arm"}"#, 0);

    let result = hub.handle_command(r#"{"command":"disarm"}"#, 400);
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(hub.current_state(), AlarmState::Disarmed);
    assert_eq!(hub.machine().timers().armed_count(), 0);

    // The cancelled exit delay never fires.
    hub.poll(u64::from(EXIT_MS) * 5);
    assert_eq!(hub.current_state(), AlarmState::Disarmed);
}

// ── D: status while Triggered ─────────────────────────────────

#[test]
fn status_while_triggered_reports_without_changing_state() {
    let (mut hub, mut expander, mut publisher) = armed_hub();
    expander.queue(DOOR, DOOR);
    hub.service_expander(&mut expander, 5_000).unwrap();
    hub.poll(5_000 + u64::from(ENTRY_MS));
    assert_eq!(hub.current_state(), AlarmState::Triggered);
    hub.publish_pending(&mut publisher);
    publisher.clear();

    let result = hub.handle_command(r#"{"command":"status"}"#, 8_000);
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(hub.current_state(), AlarmState::Triggered);

    hub.publish_pending(&mut publisher);
    let status = json(&publisher.find("status/response").unwrap().payload);
    assert_eq!(status["alarm_state"], "TRIGGERED");
    assert_eq!(status["triggered_by"], "Front Door");
    assert!(publisher.find("cmd/response").is_none());
}

// ── E: envelope without `command` ─────────────────────────────

#[test]
fn missing_command_key_is_rejected() {
    let (mut hub, _, mut publisher) = armed_hub();

    let result = hub.handle_command(r#"{"foo":"bar"}"#, 2_000);
    assert_eq!(result.status, CommandStatus::Error);
    assert_eq!(result.message, "Invalid command format");
    assert_eq!(hub.current_state(), AlarmState::Armed);

    hub.publish_pending(&mut publisher);
    let response = json(&publisher.find("cmd/response").unwrap().payload);
    assert_eq!(response["status"], "error");
}

#[test]
fn arm_with_long_source_or_extra_fields_still_arms() {
    for text in [
        r#"{"command":"arm","source":"home-assistant-automation-frontdoor"}"#,
        r#"{"command":"arm","request_id":"6f1c2a8e-93b4-4d2f-8a61-0c5e7d9b3f24"}"#,
    ] {
        let (mut hub, _, _) = make_hub();
        let result = hub.handle_command(text, 0);
        assert_eq!(result.status, CommandStatus::Success, "{text}");
        assert_eq!(hub.current_state(), AlarmState::Arming, "{text}");
    }
}

// ── F: bounce inside the debounce window ──────────────────────

#[test]
fn bounce_within_window_yields_one_transition() {
    let (mut hub, mut expander, _) = make_hub();
    expander.queue(DOOR, DOOR);
    expander.queue(DOOR, DOOR);

    assert_eq!(hub.service_expander(&mut expander, 1_000).unwrap(), 1);
    assert_eq!(hub.service_expander(&mut expander, 1_010).unwrap(), 0);
    assert_eq!(hub.machine().door_open_count(), 1);
}

// ── Failure paths ─────────────────────────────────────────────

#[test]
fn bus_error_means_no_transition() {
    let (mut hub, mut expander, _) = armed_hub();
    expander.queue_error(IoError::Timeout);

    assert_eq!(hub.service_expander(&mut expander, 3_000), Err(IoError::Timeout));
    assert_eq!(hub.current_state(), AlarmState::Armed);

    // The next interrupt is processed normally.
    expander.queue(DOOR, DOOR);
    assert_eq!(hub.service_expander(&mut expander, 3_100), Ok(1));
    assert_eq!(hub.current_state(), AlarmState::Triggering);
}

#[test]
fn failed_publish_drops_notifications() {
    let (mut hub, _, mut publisher) = make_hub();
    hub.handle_command(r#"{"command":"arm"}"#, 0);

    publisher.fail = true;
    assert_eq!(hub.publish_pending(&mut publisher), 0);
    assert_eq!(hub.pending_notifications().count(), 0);

    publisher.fail = false;
    assert_eq!(hub.publish_pending(&mut publisher), 0);
}

#[test]
fn disarm_during_entry_delay_clears_alarm() {
    let (mut hub, mut expander, mut publisher) = armed_hub();
    expander.queue(DOOR, DOOR);
    hub.service_expander(&mut expander, 5_000).unwrap();

    let result = hub.handle_command(r#"{"command":"disarm"}"#, 5_500);
    assert_eq!(result.status, CommandStatus::Success);
    assert_eq!(hub.current_state(), AlarmState::Disarmed);
    assert_eq!(hub.machine().triggered_by(), None);

    hub.poll(5_000 + u64::from(ENTRY_MS) * 2);
    assert_eq!(hub.current_state(), AlarmState::Disarmed);

    hub.publish_pending(&mut publisher);
    assert!(publisher.find("alarm/disarmed").is_some());
}

#[test]
fn door_close_publishes_closed() {
    let (mut hub, mut expander, mut publisher) = make_hub();
    expander.queue(DOOR, DOOR);
    expander.queue(DOOR, 0x00);
    hub.service_expander(&mut expander, 1_000).unwrap();
    hub.publish_pending(&mut publisher);
    hub.service_expander(&mut expander, 2_000).unwrap();
    hub.publish_pending(&mut publisher);

    assert_eq!(
        publisher.topics(),
        vec!["door/front_door/open", "door/front_door/closed"]
    );
    let closed = json(&publisher.messages[1].payload);
    assert_eq!(closed["state"], "closed");
}

#[test]
fn heartbeat_publishes_on_interval() {
    let (mut hub, _, mut publisher) = make_hub();
    let interval = u64::from(hub.config().heartbeat_interval_ms);

    hub.poll(interval - 1);
    hub.publish_pending(&mut publisher);
    assert!(publisher.messages.is_empty());

    hub.poll(interval);
    hub.publish_pending(&mut publisher);
    let beat = json(&publisher.find("heartbeat").unwrap().payload);
    assert_eq!(beat["alarm_state"], "DISARMED");
    assert_eq!(beat["uptime_ms"], interval);
}

//! Outbound notifications.
//!
//! The [`HubService`](super::service::HubService) marks these in the
//! [`NotificationFlags`](super::notify::NotificationFlags) aggregator and a
//! [`Publisher`](super::ports::Publisher) drains them.  Payloads stay typed
//! until publish time; [`Notification::topic`] and [`Notification::to_json`]
//! render the wire form into fixed buffers, so publishing never allocates.
//!
//! ```text
//!   alarm/<armed|disarmed|triggered>     {"state","previous","sensor","timestamp"}
//!   door/<topic_name>/<open|closed>      {"state","sensor","timestamp"}
//!   heartbeat                            {"uptime_ms","alarm_state"}
//!   status/response                      StatusReport
//!   cmd/response                         {"status","message","command","timestamp"}
//! ```

use core::fmt::Write;

use serde::Serialize;

use super::interpreter::{CommandResult, CommandStatus};
use crate::fsm::AlarmState;
use crate::sensors::{SensorId, SensorName};

/// Topic suffix buffer.  `door/` + 16-byte name + `/closed` fits with room
/// to spare.
pub type TopicSuffix = heapless::String<40>;

/// Rendered JSON payload.  Sized for the largest message (a status
/// report or a response echoing a fully escaped command field).
pub const PAYLOAD_CAP: usize = 384;
pub type Payload = heapless::String<PAYLOAD_CAP>;

/// Version string carried in status reports.
pub type Version = heapless::String<16>;

/// Slot identity in the aggregator.  Marking a kind that is already dirty
/// overwrites its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    AlarmState,
    /// One slot per sensor.
    Door(SensorId),
    Heartbeat,
    Status,
    CommandResponse,
}

/// Snapshot answered to a `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub alarm_state: AlarmState,
    pub uptime_ms: u64,
    pub exit_delay_active: bool,
    pub entry_delay_active: bool,
    pub triggered_by: Option<SensorName>,
    pub trigger_count: u32,
    pub door_open_count: u32,
    pub timestamp: u64,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// The alarm state changed.
    AlarmState {
        state: AlarmState,
        previous: AlarmState,
        /// Name of the triggering sensor, while in an alarm state.
        sensor: Option<SensorName>,
        at_ms: u64,
    },
    /// A door or window sensor changed level.
    Door {
        sensor: SensorId,
        name: SensorName,
        topic_name: SensorName,
        open: bool,
        at_ms: u64,
    },
    Heartbeat { uptime_ms: u64, state: AlarmState },
    Status(StatusReport),
    CommandResponse { result: CommandResult, at_ms: u64 },
}

#[derive(Serialize)]
struct AlarmPayload<'a> {
    state: AlarmState,
    previous: AlarmState,
    sensor: Option<&'a str>,
    timestamp: u64,
}

#[derive(Serialize)]
struct DoorPayload<'a> {
    state: &'static str,
    sensor: &'a str,
    timestamp: u64,
}

#[derive(Serialize)]
struct HeartbeatPayload {
    uptime_ms: u64,
    alarm_state: AlarmState,
}

#[derive(Serialize)]
struct ResponsePayload<'a> {
    status: CommandStatus,
    message: &'static str,
    command: &'a str,
    timestamp: u64,
}

const fn door_level(open: bool) -> &'static str {
    if open { "open" } else { "closed" }
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Self::AlarmState { .. } => NotificationKind::AlarmState,
            Self::Door { sensor, .. } => NotificationKind::Door(*sensor),
            Self::Heartbeat { .. } => NotificationKind::Heartbeat,
            Self::Status(_) => NotificationKind::Status,
            Self::CommandResponse { .. } => NotificationKind::CommandResponse,
        }
    }

    /// Topic below `<topic_root>/<device_name>/`.
    pub fn topic(&self) -> TopicSuffix {
        let mut topic = TopicSuffix::new();
        // Every suffix fits the buffer; a sensor topic name is at most 16 bytes.
        let _ = match self {
            Self::AlarmState { state, .. } => topic.push_str(match state {
                AlarmState::Disarmed => "alarm/disarmed",
                AlarmState::Arming | AlarmState::Armed => "alarm/armed",
                AlarmState::Triggering | AlarmState::Triggered => "alarm/triggered",
            }),
            Self::Door {
                topic_name, open, ..
            } => write!(topic, "door/{topic_name}/{}", door_level(*open)).map_err(|_| ()),
            Self::Heartbeat { .. } => topic.push_str("heartbeat"),
            Self::Status(_) => topic.push_str("status/response"),
            Self::CommandResponse { .. } => topic.push_str("cmd/response"),
        };
        topic
    }

    /// Render the JSON payload into a fixed buffer.
    pub fn to_json(&self) -> serde_json_core::ser::Result<Payload> {
        match self {
            Self::AlarmState {
                state,
                previous,
                sensor,
                at_ms,
            } => serde_json_core::to_string(&AlarmPayload {
                state: *state,
                previous: *previous,
                sensor: sensor.as_deref(),
                timestamp: *at_ms,
            }),
            Self::Door {
                name, open, at_ms, ..
            } => serde_json_core::to_string(&DoorPayload {
                state: door_level(*open),
                sensor: name,
                timestamp: *at_ms,
            }),
            Self::Heartbeat { uptime_ms, state } => serde_json_core::to_string(&HeartbeatPayload {
                uptime_ms: *uptime_ms,
                alarm_state: *state,
            }),
            Self::Status(report) => serde_json_core::to_string(report),
            Self::CommandResponse { result, at_ms } => serde_json_core::to_string(&ResponsePayload {
                status: result.status,
                message: result.message,
                command: &result.command,
                timestamp: *at_ms,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn name(s: &str) -> SensorName {
        SensorName::try_from(s).unwrap()
    }

    #[test]
    fn alarm_topics_group_by_state() {
        let n = |state| Notification::AlarmState {
            state,
            previous: AlarmState::Disarmed,
            sensor: None,
            at_ms: 0,
        };
        assert_eq!(n(AlarmState::Arming).topic().as_str(), "alarm/armed");
        assert_eq!(n(AlarmState::Armed).topic().as_str(), "alarm/armed");
        assert_eq!(n(AlarmState::Disarmed).topic().as_str(), "alarm/disarmed");
        assert_eq!(n(AlarmState::Triggering).topic().as_str(), "alarm/triggered");
        assert_eq!(n(AlarmState::Triggered).topic().as_str(), "alarm/triggered");
    }

    #[test]
    fn door_topic_and_payload() {
        let n = Notification::Door {
            sensor: 1,
            name: name("Front Door"),
            topic_name: name("front_door"),
            open: true,
            at_ms: 1234,
        };
        assert_eq!(n.topic().as_str(), "door/front_door/open");
        let v: Value = serde_json::from_str(&n.to_json().unwrap()).unwrap();
        assert_eq!(v["state"], "open");
        assert_eq!(v["sensor"], "Front Door");
        assert_eq!(v["timestamp"], 1234);
    }

    #[test]
    fn longest_door_topic_fits() {
        let n = Notification::Door {
            sensor: 1,
            name: name("x"),
            topic_name: name("sixteen_bytes_ab"),
            open: false,
            at_ms: 0,
        };
        assert_eq!(n.topic().as_str(), "door/sixteen_bytes_ab/closed");
    }

    #[test]
    fn alarm_payload_names_sensor() {
        let n = Notification::AlarmState {
            state: AlarmState::Triggering,
            previous: AlarmState::Armed,
            sensor: Some(name("Front Door")),
            at_ms: 99,
        };
        let v: Value = serde_json::from_str(&n.to_json().unwrap()).unwrap();
        assert_eq!(v["state"], "TRIGGERING");
        assert_eq!(v["previous"], "ARMED");
        assert_eq!(v["sensor"], "Front Door");
    }

    #[test]
    fn heartbeat_payload() {
        let n = Notification::Heartbeat {
            uptime_ms: 60_000,
            state: AlarmState::Armed,
        };
        assert_eq!(n.topic().as_str(), "heartbeat");
        let v: Value = serde_json::from_str(&n.to_json().unwrap()).unwrap();
        assert_eq!(v["uptime_ms"], 60_000);
        assert_eq!(v["alarm_state"], "ARMED");
    }

    #[test]
    fn command_response_is_flat() {
        let n = Notification::CommandResponse {
            result: CommandResult::new(CommandStatus::Error, "Unknown command", "dance"),
            at_ms: 7,
        };
        assert_eq!(n.topic().as_str(), "cmd/response");
        let v: Value = serde_json::from_str(&n.to_json().unwrap()).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["message"], "Unknown command");
        assert_eq!(v["command"], "dance");
        assert_eq!(v["timestamp"], 7);
    }

    #[test]
    fn worst_case_payloads_fit() {
        let report = StatusReport {
            alarm_state: AlarmState::Triggering,
            uptime_ms: u64::MAX,
            exit_delay_active: false,
            entry_delay_active: false,
            triggered_by: Some(name(&"\"".repeat(16))),
            trigger_count: u32::MAX,
            door_open_count: u32::MAX,
            timestamp: u64::MAX,
            version: Version::try_from("1234567890123456").unwrap(),
        };
        let v: Value =
            serde_json::from_str(&Notification::Status(report).to_json().unwrap()).unwrap();
        assert_eq!(v["alarm_state"], "TRIGGERING");
        assert_eq!(v["uptime_ms"], u64::MAX);

        let control = "\u{1}".repeat(32);
        let n = Notification::CommandResponse {
            result: CommandResult::new(
                CommandStatus::Warning,
                "Cannot arm - system in invalid state",
                &control,
            ),
            at_ms: u64::MAX,
        };
        let v: Value = serde_json::from_str(&n.to_json().unwrap()).unwrap();
        assert_eq!(v["command"], control.as_str());
    }
}

//! Sensor dispatcher: debounced transition → alarm event and/or
//! notification, by sensor type.
//!
//! | Type          | Notification       | Event                                  |
//! |---------------|--------------------|----------------------------------------|
//! | Door / Window | always (door slot) | `Trigger` if opened while Armed        |
//! | ArmButton     | -                  | `Arm` on press if Disarmed             |
//! | DisarmButton  | -                  | `Disarm` on press                      |
//! | ResetButton   | -                  | `Reset` on press if not Disarmed       |
//! | Motion / Smoke| -                  | (logged only)                          |
//!
//! Motion and smoke have no outbound topic yet; their placeholder
//! notification is the `info!` line.

use log::info;

use super::{SensorDescriptor, SensorId, SensorTransition, SensorType};
use crate::app::events::Notification;
use crate::fsm::{AlarmEvent, AlarmState};

/// One consequence of a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Alarm { event: AlarmEvent, source: SensorId },
    Notify(Notification),
}

/// At most a notification plus an event.
pub type Actions = heapless::Vec<Action, 2>;

/// Route `transition` of `sensor` given the current alarm `state`.
pub fn dispatch(
    transition: &SensorTransition,
    sensor: &SensorDescriptor,
    state: AlarmState,
) -> Actions {
    let mut out = Actions::new();
    let pressed = transition.active;
    let alarm = |event| Action::Alarm {
        event,
        source: sensor.id,
    };

    // Capacity is two and no arm pushes more than two.
    match sensor.kind {
        SensorType::Door | SensorType::Window => {
            let _ = out.push(Action::Notify(Notification::Door {
                sensor: sensor.id,
                name: sensor.name.clone(),
                topic_name: sensor.topic_name.clone(),
                open: transition.active,
                at_ms: transition.at_ms,
            }));
            if transition.active && state == AlarmState::Armed {
                let _ = out.push(alarm(AlarmEvent::Trigger));
            }
        }
        SensorType::ArmButton if pressed && state == AlarmState::Disarmed => {
            let _ = out.push(alarm(AlarmEvent::Arm));
        }
        SensorType::DisarmButton if pressed => {
            let _ = out.push(alarm(AlarmEvent::Disarm));
        }
        SensorType::ResetButton if pressed && state != AlarmState::Disarmed => {
            let _ = out.push(alarm(AlarmEvent::Reset));
        }
        SensorType::Motion | SensorType::Smoke => {
            info!(
                "Sensor '{}': {:?} {}",
                sensor.name,
                sensor.kind,
                if transition.active { "detected" } else { "clear" }
            );
        }
        SensorType::ArmButton | SensorType::DisarmButton | SensorType::ResetButton => {}
    }

    out
}

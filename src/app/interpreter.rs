//! Command interpreter.
//!
//! Turns envelope text into alarm events, checking each command's state
//! precondition first, and produces the synchronous acknowledgment.
//!
//! | Command  | Allowed from       | Otherwise                                  |
//! |----------|--------------------|--------------------------------------------|
//! | `arm`    | Disarmed           | warning if Armed, error from anything else |
//! | `disarm` | any but Disarmed   | warning                                    |
//! | `reset`  | any but Disarmed   | warning                                    |
//! | `status` | any                | never changes state                        |

use log::{info, warn};
use serde::Serialize;

use super::commands::{self, CommandAction, FIELD_CAP, Field};
use super::events::StatusReport;
use crate::fsm::{AlarmEvent, AlarmMachine, AlarmState, Applied};

pub const MSG_INVALID_FORMAT: &str = "Invalid command format";
pub const MSG_UNKNOWN: &str = "Unknown command";
pub const MSG_ARMING: &str = "Arming initiated with exit delay";
pub const MSG_ALREADY_ARMED: &str = "System already armed";
pub const MSG_CANNOT_ARM: &str = "Cannot arm - system in invalid state";
pub const MSG_DISARMED: &str = "System disarmed";
pub const MSG_ALREADY_DISARMED: &str = "System already disarmed";
pub const MSG_RESET: &str = "System reset to armed state";
pub const MSG_STATUS: &str = "Status reported";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    /// Valid command that had nothing to do.
    Warning,
    Error,
}

/// Synchronous acknowledgment of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub message: &'static str,
    /// Echo of the command name; empty when the envelope did not parse.
    pub command: Field,
    /// Filled in by the service for `status`.
    pub report: Option<StatusReport>,
}

impl CommandResult {
    pub fn new(status: CommandStatus, message: &'static str, command: &str) -> Self {
        let mut echo = Field::new();
        for c in command.chars().take(FIELD_CAP) {
            if echo.push(c).is_err() {
                break;
            }
        }
        Self {
            status,
            message,
            command: echo,
            report: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

/// What interpreting one envelope did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreted {
    pub result: CommandResult,
    /// Set when an event reached the machine.
    pub applied: Option<Applied>,
    /// The caller should publish a status report instead of a response.
    pub status_requested: bool,
}

impl Interpreted {
    fn reply(result: CommandResult) -> Self {
        Self {
            result,
            applied: None,
            status_requested: false,
        }
    }

    fn applied(result: CommandResult, applied: Applied) -> Self {
        Self {
            result,
            applied: Some(applied),
            status_requested: false,
        }
    }
}

/// Parse `text` and run it against `machine`.
pub fn interpret(text: &str, machine: &mut AlarmMachine, now_ms: u64) -> Interpreted {
    use CommandStatus::*;

    let command = match commands::parse(text) {
        Ok(command) => command,
        Err(e) => {
            warn!("Command: rejected envelope ({e})");
            return Interpreted::reply(CommandResult::new(Error, MSG_INVALID_FORMAT, ""));
        }
    };

    let name = command.action.name();
    let state = machine.state();
    info!(
        "Command: '{name}' from '{}' in {state}",
        command.source.as_deref().unwrap_or("unknown")
    );

    match command.action {
        CommandAction::Arm => match state {
            AlarmState::Disarmed => {
                let applied = machine.apply(AlarmEvent::Arm, now_ms);
                Interpreted::applied(CommandResult::new(Success, MSG_ARMING, name), applied)
            }
            AlarmState::Armed => {
                Interpreted::reply(CommandResult::new(Warning, MSG_ALREADY_ARMED, name))
            }
            _ => {
                warn!("Command: cannot arm from {state}");
                Interpreted::reply(CommandResult::new(Error, MSG_CANNOT_ARM, name))
            }
        },
        CommandAction::Disarm => {
            if state == AlarmState::Disarmed {
                Interpreted::reply(CommandResult::new(Warning, MSG_ALREADY_DISARMED, name))
            } else {
                let applied = machine.apply(AlarmEvent::Disarm, now_ms);
                Interpreted::applied(CommandResult::new(Success, MSG_DISARMED, name), applied)
            }
        }
        CommandAction::Reset => {
            if state == AlarmState::Disarmed {
                Interpreted::reply(CommandResult::new(Warning, MSG_ALREADY_DISARMED, name))
            } else {
                let applied = machine.apply(AlarmEvent::Reset, now_ms);
                Interpreted::applied(CommandResult::new(Success, MSG_RESET, name), applied)
            }
        }
        CommandAction::Status => Interpreted {
            result: CommandResult::new(Success, MSG_STATUS, name),
            applied: None,
            status_requested: true,
        },
        CommandAction::Unknown(_) => {
            warn!("Command: unknown '{name}'");
            Interpreted::reply(CommandResult::new(Error, MSG_UNKNOWN, name))
        }
    }
}

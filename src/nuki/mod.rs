pub mod envelope;
pub mod event;
pub mod field;
pub mod lock;
pub mod router;
pub mod topics;

use serde::Serialize;

pub use envelope::Envelope;
pub use field::{Field, FieldUpdate, LockStatus};
pub use lock::{Host, NukiLock};
pub use topics::{DeviceIdentity, DeviceTopics};

/// Motor state reported on `lockState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockState {
    Uncalibrated,
    Locked,
    Unlocking,
    Unlocked,
    Locking,
    Unlatched,
    UnlockedLockNGo,
    Unlatching,
    MotorBlocked,
    Undefined,
}

impl LockState {
    pub fn from_code(code: i64) -> Option<Self> {
        let state = match code {
            0 => Self::Uncalibrated,
            1 => Self::Locked,
            2 => Self::Unlocking,
            3 => Self::Unlocked,
            4 => Self::Locking,
            5 => Self::Unlatched,
            6 => Self::UnlockedLockNGo,
            7 => Self::Unlatching,
            254 => Self::MotorBlocked,
            255 => Self::Undefined,
            _ => return None,
        };
        Some(state)
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Uncalibrated => 0,
            Self::Locked => 1,
            Self::Unlocking => 2,
            Self::Unlocked => 3,
            Self::Locking => 4,
            Self::Unlatched => 5,
            Self::UnlockedLockNGo => 6,
            Self::Unlatching => 7,
            Self::MotorBlocked => 254,
            Self::Undefined => 255,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Uncalibrated => "Uncalibrated",
            Self::Locked => "Locked",
            Self::Unlocking => "Unlocking",
            Self::Unlocked => "Unlocked",
            Self::Locking => "Locking",
            Self::Unlatched => "Unlatched",
            Self::UnlockedLockNGo => "Unlocked (Lock 'n' Go)",
            Self::Unlatching => "Unlatching",
            Self::MotorBlocked => "Motor Blocked",
            Self::Undefined => "Undefined",
        }
    }
}

/// Door sensor state reported on `doorsensorState`. `Calibrating` is only
/// sent by some firmware variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DoorSensorState {
    Deactivated,
    Closed,
    Open,
    Unknown,
    Calibrating,
}

impl DoorSensorState {
    pub fn from_code(code: i64) -> Option<Self> {
        let state = match code {
            1 => Self::Deactivated,
            2 => Self::Closed,
            3 => Self::Open,
            4 => Self::Unknown,
            5 => Self::Calibrating,
            _ => return None,
        };
        Some(state)
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Deactivated => 1,
            Self::Closed => 2,
            Self::Open => 3,
            Self::Unknown => 4,
            Self::Calibrating => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Deactivated => "Deactivated",
            Self::Closed => "Closed",
            Self::Open => "Open",
            Self::Unknown => "Unknown",
            Self::Calibrating => "Calibrating",
        }
    }
}

/// A command accepted on the `lockAction` topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockAction {
    Unlock,
    Lock,
    Unlatch,
}

impl LockAction {
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Unlock),
            2 => Some(Self::Lock),
            3 => Some(Self::Unlatch),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Unlock => 1,
            Self::Lock => 2,
            Self::Unlatch => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Unlock => "Unlock",
            Self::Lock => "Lock",
            Self::Unlatch => "Unlatch (Open)",
        }
    }

    /// Build the command publish for this action.
    pub fn encode(self, topics: &DeviceTopics) -> OutboundMessage {
        OutboundMessage::new(topics.command(), self.code().to_string())
    }
}

/// A message handed to the transport. Serializes to the host data packet
/// layout (`Topic`, `Payload`, `QualityOfService`, `Retain`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: String,
    #[serde(rename = "QualityOfService")]
    pub qos: u8,
    pub retain: bool,
}

impl OutboundMessage {
    /// Fire-and-forget message: QoS 0, not retained.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            qos: 0,
            retain: false,
        }
    }
}

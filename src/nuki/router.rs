//! Maps status topics of one lock onto field updates.

use tracing::debug;

use super::event::decode_event;
use super::field::{Field, FieldUpdate};
use super::topics::DeviceTopics;

/// Status channels published by the lock, keyed by their exact topic suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTopic {
    LockState,
    Connected,
    BatteryChargeState,
    BatteryCritical,
    BatteryCharging,
    KeypadBatteryCritical,
    DoorSensorState,
    Firmware,
    LockActionEvent,
}

impl StatusTopic {
    pub const ALL: [StatusTopic; 9] = [
        StatusTopic::LockState,
        StatusTopic::Connected,
        StatusTopic::BatteryChargeState,
        StatusTopic::BatteryCritical,
        StatusTopic::BatteryCharging,
        StatusTopic::KeypadBatteryCritical,
        StatusTopic::DoorSensorState,
        StatusTopic::Firmware,
        StatusTopic::LockActionEvent,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            StatusTopic::LockState => "lockState",
            StatusTopic::Connected => "connected",
            StatusTopic::BatteryChargeState => "batteryChargeState",
            StatusTopic::BatteryCritical => "batteryCritical",
            StatusTopic::BatteryCharging => "batteryCharging",
            StatusTopic::KeypadBatteryCritical => "keypadBatteryCritical",
            StatusTopic::DoorSensorState => "doorsensorState",
            StatusTopic::Firmware => "firmware",
            StatusTopic::LockActionEvent => "lockActionEvent",
        }
    }

    /// Case-sensitive exact match.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.suffix() == suffix)
    }

    pub fn field(self) -> Field {
        match self {
            StatusTopic::LockState => Field::LockState,
            StatusTopic::Connected => Field::Connected,
            StatusTopic::BatteryChargeState => Field::BatteryCharge,
            StatusTopic::BatteryCritical => Field::BatteryCritical,
            StatusTopic::BatteryCharging => Field::BatteryCharging,
            StatusTopic::KeypadBatteryCritical => Field::KeypadBatteryCritical,
            StatusTopic::DoorSensorState => Field::DoorSensorState,
            StatusTopic::Firmware => Field::Firmware,
            StatusTopic::LockActionEvent => Field::LastAction,
        }
    }

    /// Decode a payload for this channel. Only `lockActionEvent` can yield
    /// `None` (fewer than two fields).
    pub fn decode(self, payload: &str) -> Option<FieldUpdate> {
        let update = match self {
            StatusTopic::LockState => FieldUpdate::LockState(parse_int(payload)),
            StatusTopic::Connected => FieldUpdate::Connected(is_true(payload)),
            StatusTopic::BatteryChargeState => FieldUpdate::BatteryCharge(parse_int(payload)),
            StatusTopic::BatteryCritical => FieldUpdate::BatteryCritical(is_true(payload)),
            StatusTopic::BatteryCharging => FieldUpdate::BatteryCharging(is_true(payload)),
            StatusTopic::KeypadBatteryCritical => {
                FieldUpdate::KeypadBatteryCritical(is_true(payload))
            }
            StatusTopic::DoorSensorState => FieldUpdate::DoorSensorState(parse_int(payload)),
            StatusTopic::Firmware => FieldUpdate::Firmware(payload.to_string()),
            StatusTopic::LockActionEvent => FieldUpdate::LastAction(decode_event(payload)?),
        };
        Some(update)
    }
}

/// Routes inbound messages of a single lock.
#[derive(Debug, Clone)]
pub struct Router {
    topics: DeviceTopics,
}

impl Router {
    pub fn new(topics: DeviceTopics) -> Self {
        Self { topics }
    }

    pub fn topics(&self) -> &DeviceTopics {
        &self.topics
    }

    /// Decide which field `topic` updates and decode `payload` for it.
    ///
    /// Topics outside this lock's root, unknown suffixes and undecodable event
    /// lines all yield `None`.
    pub fn route(&self, topic: &str, payload: &[u8]) -> Option<FieldUpdate> {
        let Some(suffix) = self.topics.suffix(topic) else {
            debug!("Ignoring topic outside {}: {}", self.topics.root(), topic);
            return None;
        };
        let Some(channel) = StatusTopic::from_suffix(suffix) else {
            debug!("Ignoring unhandled suffix: {}", suffix);
            return None;
        };

        let payload = String::from_utf8_lossy(payload);
        let update = channel.decode(&payload);
        if update.is_none() {
            debug!("Could not decode {} payload: {:?}", suffix, payload);
        }
        update
    }
}

fn is_true(payload: &str) -> bool {
    payload == "true"
}

/// Permissive integer parse: optional leading whitespace and sign, then the
/// longest run of digits. No digits gives 0; overflow saturates.
pub fn parse_int(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut value: i64 = 0;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        let digit = i64::from(digit - b'0');
        value = if negative {
            value.saturating_mul(10).saturating_sub(digit)
        } else {
            value.saturating_mul(10).saturating_add(digit)
        };
    }
    value
}

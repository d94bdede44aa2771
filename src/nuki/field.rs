use std::fmt;
use std::str::FromStr;

use crate::error::Error;

use super::{DoorSensorState, LockAction, LockState};

/// A state variable exposed to the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    LockState,
    LockAction,
    Connected,
    BatteryCharge,
    BatteryCritical,
    BatteryCharging,
    KeypadBatteryCritical,
    DoorSensorState,
    Firmware,
    LastAction,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::LockState,
        Field::LockAction,
        Field::Connected,
        Field::BatteryCharge,
        Field::BatteryCritical,
        Field::BatteryCharging,
        Field::KeypadBatteryCritical,
        Field::DoorSensorState,
        Field::Firmware,
        Field::LastAction,
    ];

    /// Stable identifier used by the host to address the field.
    pub fn ident(self) -> &'static str {
        match self {
            Field::LockState => "LockState",
            Field::LockAction => "LockAction",
            Field::Connected => "Connected",
            Field::BatteryCharge => "BatteryCharge",
            Field::BatteryCritical => "BatteryCritical",
            Field::BatteryCharging => "BatteryCharging",
            Field::KeypadBatteryCritical => "KeypadBatteryCritical",
            Field::DoorSensorState => "DoorSensorState",
            Field::Firmware => "Firmware",
            Field::LastAction => "LastAction",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Field::LockState => "Current Status",
            Field::LockAction => "Control",
            Field::Connected => "Connected",
            Field::BatteryCharge => "Battery Charge",
            Field::BatteryCritical => "Battery Low",
            Field::BatteryCharging => "Battery Charging",
            Field::KeypadBatteryCritical => "Keypad Battery Low",
            Field::DoorSensorState => "Door Sensor",
            Field::Firmware => "Firmware",
            Field::LastAction => "Last Action",
        }
    }

    /// Sort order in the host UI.
    pub fn position(self) -> u16 {
        match self {
            Field::LockState => 10,
            Field::LockAction => 20,
            Field::Connected => 30,
            Field::BatteryCharge => 40,
            Field::BatteryCritical => 41,
            Field::BatteryCharging => 42,
            Field::KeypadBatteryCritical => 43,
            Field::DoorSensorState => 50,
            Field::Firmware => 80,
            Field::LastAction => 90,
        }
    }

    /// Only the control field accepts actions from the host.
    pub fn accepts_action(self) -> bool {
        self == Field::LockAction
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ident())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.ident() == s)
            .ok_or_else(|| Error::UnsupportedField(s.to_string()))
    }
}

/// A new value for exactly one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    LockState(i64),
    LockAction(LockAction),
    Connected(bool),
    BatteryCharge(i64),
    BatteryCritical(bool),
    BatteryCharging(bool),
    KeypadBatteryCritical(bool),
    DoorSensorState(i64),
    Firmware(String),
    LastAction(String),
}

impl FieldUpdate {
    pub fn field(&self) -> Field {
        match self {
            FieldUpdate::LockState(_) => Field::LockState,
            FieldUpdate::LockAction(_) => Field::LockAction,
            FieldUpdate::Connected(_) => Field::Connected,
            FieldUpdate::BatteryCharge(_) => Field::BatteryCharge,
            FieldUpdate::BatteryCritical(_) => Field::BatteryCritical,
            FieldUpdate::BatteryCharging(_) => Field::BatteryCharging,
            FieldUpdate::KeypadBatteryCritical(_) => Field::KeypadBatteryCritical,
            FieldUpdate::DoorSensorState(_) => Field::DoorSensorState,
            FieldUpdate::Firmware(_) => Field::Firmware,
            FieldUpdate::LastAction(_) => Field::LastAction,
        }
    }
}

impl fmt::Display for FieldUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldUpdate::LockState(code) => match LockState::from_code(*code) {
                Some(state) => write!(f, "{code} ({})", state.label()),
                None => write!(f, "{code}"),
            },
            FieldUpdate::DoorSensorState(code) => match DoorSensorState::from_code(*code) {
                Some(state) => write!(f, "{code} ({})", state.label()),
                None => write!(f, "{code}"),
            },
            FieldUpdate::LockAction(action) => write!(f, "{} ({})", action.code(), action.label()),
            FieldUpdate::BatteryCharge(n) => write!(f, "{n}"),
            FieldUpdate::Connected(b)
            | FieldUpdate::BatteryCritical(b)
            | FieldUpdate::BatteryCharging(b)
            | FieldUpdate::KeypadBatteryCritical(b) => write!(f, "{b}"),
            FieldUpdate::Firmware(s) | FieldUpdate::LastAction(s) => f.write_str(s),
        }
    }
}

/// Current value of every field. `None` means nothing has been received yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockStatus {
    lock_state: Option<i64>,
    lock_action: Option<LockAction>,
    connected: Option<bool>,
    battery_charge: Option<i64>,
    battery_critical: Option<bool>,
    battery_charging: Option<bool>,
    keypad_battery_critical: Option<bool>,
    door_sensor_state: Option<i64>,
    firmware: Option<String>,
    last_action: Option<String>,
}

impl LockStatus {
    /// Store the update. Returns `true` if the field changed.
    pub fn apply(&mut self, update: &FieldUpdate) -> bool {
        match update {
            FieldUpdate::LockState(v) => replace(&mut self.lock_state, *v),
            FieldUpdate::LockAction(v) => replace(&mut self.lock_action, *v),
            FieldUpdate::Connected(v) => replace(&mut self.connected, *v),
            FieldUpdate::BatteryCharge(v) => replace(&mut self.battery_charge, *v),
            FieldUpdate::BatteryCritical(v) => replace(&mut self.battery_critical, *v),
            FieldUpdate::BatteryCharging(v) => replace(&mut self.battery_charging, *v),
            FieldUpdate::KeypadBatteryCritical(v) => {
                replace(&mut self.keypad_battery_critical, *v)
            }
            FieldUpdate::DoorSensorState(v) => replace(&mut self.door_sensor_state, *v),
            FieldUpdate::Firmware(v) => replace(&mut self.firmware, v.clone()),
            FieldUpdate::LastAction(v) => replace(&mut self.last_action, v.clone()),
        }
    }

    /// Current value of `field`, as the update that would produce it.
    pub fn get(&self, field: Field) -> Option<FieldUpdate> {
        match field {
            Field::LockState => self.lock_state.map(FieldUpdate::LockState),
            Field::LockAction => self.lock_action.map(FieldUpdate::LockAction),
            Field::Connected => self.connected.map(FieldUpdate::Connected),
            Field::BatteryCharge => self.battery_charge.map(FieldUpdate::BatteryCharge),
            Field::BatteryCritical => self.battery_critical.map(FieldUpdate::BatteryCritical),
            Field::BatteryCharging => self.battery_charging.map(FieldUpdate::BatteryCharging),
            Field::KeypadBatteryCritical => self
                .keypad_battery_critical
                .map(FieldUpdate::KeypadBatteryCritical),
            Field::DoorSensorState => self.door_sensor_state.map(FieldUpdate::DoorSensorState),
            Field::Firmware => self.firmware.clone().map(FieldUpdate::Firmware),
            Field::LastAction => self.last_action.clone().map(FieldUpdate::LastAction),
        }
    }

    pub fn lock_state_code(&self) -> Option<i64> {
        self.lock_state
    }

    /// `None` if no state was received or the code is not in the table.
    pub fn lock_state(&self) -> Option<LockState> {
        self.lock_state.and_then(LockState::from_code)
    }

    pub fn lock_action(&self) -> Option<LockAction> {
        self.lock_action
    }

    pub fn connected(&self) -> Option<bool> {
        self.connected
    }

    pub fn battery_charge(&self) -> Option<i64> {
        self.battery_charge
    }

    pub fn battery_critical(&self) -> Option<bool> {
        self.battery_critical
    }

    pub fn battery_charging(&self) -> Option<bool> {
        self.battery_charging
    }

    pub fn keypad_battery_critical(&self) -> Option<bool> {
        self.keypad_battery_critical
    }

    pub fn door_sensor_state_code(&self) -> Option<i64> {
        self.door_sensor_state
    }

    pub fn door_sensor_state(&self) -> Option<DoorSensorState> {
        self.door_sensor_state.and_then(DoorSensorState::from_code)
    }

    pub fn firmware(&self) -> Option<&str> {
        self.firmware.as_deref()
    }

    pub fn last_action(&self) -> Option<&str> {
        self.last_action.as_deref()
    }
}

fn replace<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
    if slot.as_ref() == Some(&value) {
        return false;
    }
    *slot = Some(value);
    true
}
